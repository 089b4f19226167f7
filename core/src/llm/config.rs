use std::fmt;

/// Configuration for GeminiClient loaded from environment variables
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub base_url: String, // e.g., https://generativelanguage.googleapis.com/v1beta
    pub model: String,    // e.g., models/gemini-2.5-flash
    pub api_key: Option<String>,
    /// No timeout unless set; callers are expected to bound latency themselves
    pub request_timeout_ms: Option<u64>,
    /// Enable the provider's search tool so responses carry grounding chunks
    pub search_grounding: bool,
    pub temperature: Option<f32>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: env_nonempty("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            model: env_nonempty("GEMINI_MODEL")
                .unwrap_or_else(|| "models/gemini-2.5-flash".to_string()),
            api_key: env_nonempty("GEMINI_API_KEY").or_else(|| env_nonempty("VITE_GEMINI_API_KEY")),
            request_timeout_ms: env_nonempty("GEMINI_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()),
            search_grounding: env_nonempty("GEMINI_SEARCH_GROUNDING")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
            temperature: env_nonempty("GEMINI_TEMPERATURE").and_then(|v| v.parse::<f32>().ok()),
        }
    }
}

impl GeminiConfig {
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// `{base_url}/models/{name}:generateContent`, accepting names with or without `models/`
    pub fn generate_url(&self) -> String {
        let name = self.model.trim().trim_start_matches("models/");
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            name
        )
    }
}

// Hand-written so the key never reaches logs
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field(
                "api_key",
                &if self.has_credentials() {
                    "<redacted>"
                } else {
                    "<unset>"
                },
            )
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("search_grounding", &self.search_grounding)
            .field("temperature", &self.temperature)
            .finish()
    }
}
