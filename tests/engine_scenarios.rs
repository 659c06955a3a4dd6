//! End-to-end mutation runs over raw request text

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;

use jwt_probe::jwt::{self, VariantKind};
use jwt_probe::reporting::{MutationReport, OutputFormat, ReportMetadata};
use jwt_probe::{
    extract, run, Config, MutationEngine, NoneAlgorithmStrategy, ProbeError, StrategyKind,
};

const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0In0.sig123";
const CALLBACK: &str = "http://oob.example.net/cb";

fn bearer_request() -> String {
    format!(
        "POST /api/orders HTTP/1.1\nHost: shop.local\nAuthorization: Bearer {}\nContent-Type: application/json\n\n{{\"qty\":1}}",
        TOKEN
    )
}

#[test]
fn bearer_token_is_extracted_and_decoded() {
    let tokens = extract(&bearer_request());
    assert_eq!(tokens.len(), 1);

    let decoded = jwt::decode(&tokens[0].token).unwrap();
    assert_eq!(decoded.alg(), Some("HS256"));
    assert_eq!(serde_json::Value::Object(decoded.payload), json!({"sub": "1234"}));
}

#[test]
fn null_alg_candidate_replaces_token_and_nothing_else() {
    let request = bearer_request();
    let results = MutationEngine::new(vec![Box::new(NoneAlgorithmStrategy)])
        .run(&request)
        .unwrap();

    let null = results
        .iter()
        .find(|r| r.mutated_property == "null" && r.variant == VariantKind::Original)
        .unwrap();

    let header_segment = null.token.split('.').next().unwrap();
    let header_json = URL_SAFE_NO_PAD.decode(header_segment).unwrap();
    assert_eq!(header_json, br#"{"alg":null}"#);

    let (before, after) = request.split_once(TOKEN).unwrap();
    assert_eq!(null.request, format!("{}{}{}", before, null.token, after));
}

#[test]
fn full_run_counts_and_ordering() {
    // one numeric claim gives one payload mutation
    let token = jwt::encode(
        json!({"alg": "RS256", "typ": "JWT"}).as_object().unwrap(),
        json!({"sub": "u1", "uid": 7}).as_object().unwrap(),
        "c2ln",
        true,
    )
    .unwrap();
    let request = format!("GET / HTTP/1.1\nX-Auth: {}\n\n", token);

    let results = run(&request, StrategyKind::all(), CALLBACK).unwrap();
    assert_eq!(results.len(), (6 + 3 + 1) * 4);

    let strategies: Vec<&str> = results
        .chunks(4)
        .map(|chunk| chunk[0].strategy.as_str())
        .collect();
    assert_eq!(&strategies[..6], ["none_algorithm"; 6]);
    assert_eq!(&strategies[6..9], ["ssrf_header"; 3]);
    assert_eq!(strategies[9], "payload_claim");

    for chunk in results.chunks(4) {
        let kinds: Vec<VariantKind> = chunk.iter().map(|r| r.variant).collect();
        assert_eq!(kinds, VariantKind::all());
        assert_eq!(chunk[1].token, format!("{}.", chunk[2].token));
        assert_eq!(chunk[3].token, format!("{}a", chunk[0].token));
    }

    let uid = &results[36];
    assert_eq!(uid.mutated_property, "uid");
    let decoded = jwt::decode(&uid.token).unwrap();
    assert_eq!(decoded.payload["uid"], json!(8));
    assert_eq!(decoded.signature, "c2ln");
}

#[test]
fn payload_claim_contributes_for_string_only_payload() {
    let results = run(&bearer_request(), &[StrategyKind::PayloadClaim], CALLBACK).unwrap();
    assert_eq!(results.len(), 4);

    let original = &results[0];
    assert_eq!(original.strategy, "payload_claim");
    assert_eq!(original.mutated_property, "sub");
    let decoded = jwt::decode(&original.token).unwrap();
    assert_eq!(decoded.payload["sub"], json!("12341"));
    assert_eq!(decoded.signature, "sig123");
}

#[test]
fn ssrf_candidates_carry_callback_url() {
    let results = run(&bearer_request(), &[StrategyKind::Ssrf], CALLBACK).unwrap();
    assert_eq!(results.len(), 12);

    for (chunk, prop) in results.chunks(4).zip(["jku", "x5u", "kid"]) {
        let decoded = jwt::decode(&chunk[0].token).unwrap();
        assert_eq!(
            decoded.header[prop],
            json!(format!("{}?type=jwtssrftest&key={}", CALLBACK, prop))
        );
    }
}

#[test]
fn request_without_headers_has_no_token() {
    let request = format!("GET / HTTP/1.1\n\nAuthorization: Bearer {}\n", TOKEN);
    assert!(extract(&request).is_empty());

    let err = run(&request, StrategyKind::all(), CALLBACK).unwrap_err();
    assert!(matches!(err, ProbeError::NoTokenFound));
    assert!(!err.is_fatal());
}

#[test]
fn runs_are_byte_identical() {
    let engine = MutationEngine::from_config(&Config::default().engine);
    let first = engine.run(&bearer_request()).unwrap();
    let second = engine.run(&bearer_request()).unwrap();

    let render = |results| {
        MutationReport::new(results, ReportMetadata::new(CALLBACK, &engine.strategy_names()))
            .render(OutputFormat::Json, false)
            .unwrap()
    };
    assert_eq!(render(first), render(second));
}
