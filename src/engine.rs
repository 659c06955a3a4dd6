//! Mutation engine
//!
//! Scan → decode → strategies → variants → substitution. Every step is a pure
//! function of the request text and configuration; tracing is the only side effect.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{ProbeError, Result};
use crate::jwt::{self, VariantKind};
use crate::scanner::{self, ExtractedToken};
use crate::strategies::{self, MutationStrategy, NonNumericClaims, StrategyKind};

/// Which extracted tokens a run mutates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSelection {
    /// Only the first token found in the headers
    #[default]
    First,
    /// Every distinct token, in scan order
    All,
}

/// One candidate request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    /// Strategy that produced the mutation
    pub strategy: String,
    /// Mutated property or candidate value
    pub mutated_property: String,
    /// Syntactic variant of the encoded token
    pub variant: VariantKind,
    /// Header the original token was found in
    pub header_name: String,
    /// Token that was replaced
    pub original_token: String,
    /// Token substituted into the request
    pub token: String,
    /// Full request text with every occurrence of the original token replaced
    pub request: String,
}

/// Token mutation engine
pub struct MutationEngine {
    /// Strategies, applied in order
    strategies: Vec<Box<dyn MutationStrategy>>,
    /// Expand every mutated token into its syntactic variants
    expand_variants: bool,
    /// Which extracted tokens to mutate
    token_selection: TokenSelection,
    /// Strip `=` padding when re-encoding
    strip_padding: bool,
}

impl MutationEngine {
    /// Create an engine with variant expansion on and only the first token mutated
    pub fn new(strategies: Vec<Box<dyn MutationStrategy>>) -> Self {
        Self {
            strategies,
            expand_variants: true,
            token_selection: TokenSelection::First,
            strip_padding: true,
        }
    }

    /// Create an engine from configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        let strategies = strategies::build(
            &config.strategies,
            &config.correlation_url,
            config.non_numeric_claims,
        );

        Self::new(strategies)
            .with_variants(config.expand_variants)
            .with_token_selection(config.token_selection)
            .with_strip_padding(config.strip_padding)
    }

    pub fn with_variants(mut self, expand: bool) -> Self {
        self.expand_variants = expand;
        self
    }

    pub fn with_token_selection(mut self, selection: TokenSelection) -> Self {
        self.token_selection = selection;
        self
    }

    pub fn with_strip_padding(mut self, strip: bool) -> Self {
        self.strip_padding = strip;
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Generate every mutated request for `request`
    ///
    /// Returns [`ProbeError::NoTokenFound`] when the headers carry no token, and
    /// aborts with [`ProbeError::MalformedToken`] when a subject token cannot be decoded.
    pub fn run(&self, request: &str) -> Result<Vec<MutationResult>> {
        let tokens = scanner::extract(request);
        if tokens.is_empty() {
            tracing::warn!("No candidate token in request headers");
            return Err(ProbeError::NoTokenFound);
        }

        let subjects = self.select_subjects(&tokens);
        if tokens.len() > subjects.len() {
            tracing::info!(
                found = tokens.len(),
                mutated = subjects.len(),
                "Not every extracted token will be mutated"
            );
        }

        let mut results = Vec::new();
        for subject in subjects {
            results.extend(self.mutate_subject(request, subject)?);
        }

        tracing::info!(
            results = results.len(),
            strategies = self.strategies.len(),
            "Mutation run complete"
        );

        Ok(results)
    }

    fn select_subjects<'a>(&self, tokens: &'a [ExtractedToken]) -> Vec<&'a ExtractedToken> {
        match self.token_selection {
            TokenSelection::First => tokens.iter().take(1).collect(),
            TokenSelection::All => {
                // Substitution replaces every occurrence, so repeats add nothing
                let mut subjects: Vec<&ExtractedToken> = Vec::new();
                for token in tokens {
                    if !subjects.iter().any(|s| s.token == token.token) {
                        subjects.push(token);
                    }
                }
                subjects
            }
        }
    }

    fn mutate_subject(
        &self,
        request: &str,
        subject: &ExtractedToken,
    ) -> Result<Vec<MutationResult>> {
        let decoded = jwt::decode(&subject.token)?;
        tracing::debug!(
            header = %subject.header_name,
            alg = ?decoded.header.get("alg"),
            claims = decoded.payload.len(),
            "Decoded subject token"
        );

        let mut results = Vec::new();

        for strategy in &self.strategies {
            for mutation in strategy.apply(&decoded) {
                let t = &mutation.token;
                let encoded =
                    jwt::encode(&t.header, &t.payload, &t.signature, self.strip_padding)?;

                for (variant, candidate) in self.expand(encoded) {
                    tracing::debug!(
                        strategy = strategy.name(),
                        property = %mutation.label,
                        %variant,
                        "Generated candidate"
                    );

                    results.push(MutationResult {
                        strategy: strategy.name().to_string(),
                        mutated_property: mutation.label.clone(),
                        variant,
                        header_name: subject.header_name.clone(),
                        original_token: subject.token.clone(),
                        request: request.replace(&subject.token, &candidate),
                        token: candidate,
                    });
                }
            }
        }

        Ok(results)
    }

    fn expand(&self, encoded: String) -> Vec<(VariantKind, String)> {
        if self.expand_variants {
            jwt::variants(&encoded).into()
        } else {
            vec![(VariantKind::Original, encoded)]
        }
    }
}

/// Run the built-in strategies with default engine settings
pub fn run(
    request: &str,
    kinds: &[StrategyKind],
    correlation_url: &str,
) -> Result<Vec<MutationResult>> {
    let strategies = strategies::build(kinds, correlation_url, NonNumericClaims::default());
    MutationEngine::new(strategies).run(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{NoneAlgorithmStrategy, SsrfHeaderStrategy};

    const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0In0.sig123";

    fn request_with(token: &str) -> String {
        format!(
            "GET /profile HTTP/1.1\nHost: app.local\n\
             Authorization: Bearer {}\nAccept: */*\n\nbody={}",
            token,
            token
        )
    }

    #[test]
    fn test_none_null_candidate_substituted() {
        let request = request_with(TOKEN);
        let engine =
            MutationEngine::new(vec![Box::new(NoneAlgorithmStrategy)]).with_variants(false);
        let results = engine.run(&request).unwrap();

        assert_eq!(results.len(), 6);
        let null = results.iter().find(|r| r.mutated_property == "null").unwrap();
        assert!(null.token.starts_with("eyJhbGciOm51bGx9."));
        assert!(null.token.ends_with(".sig123"));
        assert_eq!(null.request, request.replace(TOKEN, &null.token));
        // body occurrence replaced too
        assert!(!null.request.contains(TOKEN));
        assert_eq!(null.header_name, "Authorization");
        assert_eq!(null.original_token, TOKEN);
    }

    #[test]
    fn test_output_ordering() {
        let engine = MutationEngine::new(vec![
            Box::new(SsrfHeaderStrategy::new("http://cb.local/")),
            Box::new(NoneAlgorithmStrategy),
        ]);
        let results = engine.run(&request_with(TOKEN)).unwrap();

        assert_eq!(results.len(), (3 + 6) * 4);
        assert_eq!(results[0].strategy, "ssrf_header");
        assert_eq!(results[0].mutated_property, "jku");
        let variants: Vec<VariantKind> = results[..4].iter().map(|r| r.variant).collect();
        assert_eq!(variants, VariantKind::all());
        assert_eq!(results[4].mutated_property, "x5u");
        assert_eq!(results[12].strategy, "none_algorithm");
        assert_eq!(results[12].mutated_property, "none");
    }

    #[test]
    fn test_no_token_found() {
        let engine = MutationEngine::new(vec![Box::new(NoneAlgorithmStrategy)]);
        let err = engine.run("GET / HTTP/1.1\n\n").unwrap_err();
        assert!(matches!(err, ProbeError::NoTokenFound));
    }

    #[test]
    fn test_malformed_token_aborts() {
        // matches the scan pattern but the header is not JSON
        let request = request_with("eyJub3Rqc29u.eyJzdWIiOiIxMjM0In0.sig");
        let engine = MutationEngine::new(vec![Box::new(NoneAlgorithmStrategy)]);
        assert!(matches!(
            engine.run(&request),
            Err(ProbeError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_token_selection_all() {
        let second = "eyJhbGciOiJub25lIn0.eyJhIjoxfQ.";
        let request = format!(
            "GET / HTTP/1.1\nAuthorization: Bearer {}\nCookie: s={}; t={}\n\n",
            TOKEN, second, TOKEN
        );

        let first_only = MutationEngine::new(vec![Box::new(NoneAlgorithmStrategy)])
            .with_variants(false)
            .run(&request)
            .unwrap();
        assert_eq!(first_only.len(), 6);

        let all = MutationEngine::new(vec![Box::new(NoneAlgorithmStrategy)])
            .with_variants(false)
            .with_token_selection(TokenSelection::All)
            .run(&request)
            .unwrap();
        assert_eq!(all.len(), 12);
        assert_eq!(all[6].original_token, second);
        assert_eq!(all[6].header_name, "Cookie");
    }

    #[test]
    fn test_run_is_deterministic() {
        let request = request_with(TOKEN);
        let kinds = StrategyKind::all();
        let a = run(&request, kinds, "http://cb.local/").unwrap();
        let b = run(&request, kinds, "http://cb.local/").unwrap();
        assert_eq!(a, b);
    }
}
