use std::fs;
use std::path::Path;

use verity_core::GeminiConfig;

/// High-level configuration for the fact-checker front-end
#[derive(Clone, Debug)]
pub struct FactCheckerConfig {
    pub gemini: GeminiConfig,
    /// Display name of the output language
    pub language: String,
    /// Trimmed text shorter than this is not submitted unless an image is attached
    pub min_text_chars: usize,
    /// Caller-side bound on one analysis
    pub timeout_secs: u64,
}

impl Default for FactCheckerConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            language: std::env::var("FACT_CHECKER_LANGUAGE")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "English".to_string()),
            min_text_chars: 5,
            timeout_secs: std::env::var("FACT_CHECKER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(120),
        }
    }
}

impl FactCheckerConfig {
    /// Load configuration from a TOML file (path via FACT_CHECKER_CONFIG or ./fact_checker.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path =
            std::env::var("FACT_CHECKER_CONFIG").unwrap_or_else(|_| "fact_checker.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::debug!(target = "fact_checker", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match Self::from_toml_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target = "fact_checker", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target = "fact_checker", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn from_toml_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        Ok(toml::from_str::<FactCheckerToml>(s)?.overlay(base))
    }

    /// Whether the input may be submitted at all
    pub fn accepts(&self, text: &str, has_image: bool) -> bool {
        has_image || text.trim().chars().count() >= self.min_text_chars
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct FactCheckerToml {
    pub language: Option<String>,
    pub min_text_chars: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub gemini: Option<GeminiToml>,
}

impl FactCheckerToml {
    fn overlay(self, mut base: FactCheckerConfig) -> FactCheckerConfig {
        if let Some(l) = self.language.filter(|l| !l.is_empty()) {
            base.language = l;
        }
        if let Some(n) = self.min_text_chars {
            base.min_text_chars = n;
        }
        if let Some(t) = self.timeout_secs {
            base.timeout_secs = t;
        }
        if let Some(g) = self.gemini {
            g.apply(&mut base.gemini);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GeminiToml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub search_grounding: Option<bool>,
    pub temperature: Option<f32>,
}
impl GeminiToml {
    fn apply(self, g: &mut GeminiConfig) {
        if let Some(x) = self.base_url {
            g.base_url = x;
        }
        if let Some(x) = self.model {
            g.model = x;
        }
        if let Some(x) = self.api_key.filter(|k| !k.trim().is_empty()) {
            g.api_key = Some(x);
        }
        if let Some(x) = self.request_timeout_ms {
            g.request_timeout_ms = Some(x);
        }
        if let Some(x) = self.search_grounding {
            g.search_grounding = x;
        }
        if let Some(x) = self.temperature {
            g.temperature = Some(x);
        }
    }
}
