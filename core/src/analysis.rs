//! Request and result types for a single fact-check.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// MIME type assumed for images that do not declare one
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Image attached to a request, carried as base64 text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Raw base64 or a `data:<mime>;base64,<data>` URL
    pub data: String,
    /// Explicit MIME type; wins over the one embedded in a data URL
    pub mime_type: Option<String>,
}

impl ImageAttachment {
    /// Wrap base64 text or a data URL as-is
    pub fn from_base64(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
        }
    }

    /// Encode raw image bytes
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: BASE64.encode(bytes),
            mime_type: Some(mime_type.into()),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Split into (mime type, bare base64 payload)
    pub fn resolve(&self) -> (String, &str) {
        let (embedded_mime, payload) = match self.data.strip_prefix("data:") {
            Some(rest) => match rest.split_once(',') {
                Some((header, payload)) => {
                    let mime = header
                        .split(';')
                        .next()
                        .filter(|m| !m.is_empty())
                        .map(str::to_string);
                    (mime, payload)
                }
                None => (None, self.data.as_str()),
            },
            None => (None, self.data.as_str()),
        };

        let mime = self
            .mime_type
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or(embedded_mime)
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
        (mime, payload.trim())
    }
}

/// Input for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub raw_text: String,
    pub image: Option<ImageAttachment>,
    /// Display name of the output language, e.g. "English" or "Español"
    pub target_language: String,
    /// Human-readable date placed into the instruction
    pub current_date: String,
}

impl AnalysisRequest {
    /// New request dated today (local time, e.g. "October 16, 2026")
    pub fn new(raw_text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            image: None,
            target_language: target_language.into(),
            current_date: chrono::Local::now().format("%B %-d, %Y").to_string(),
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_date(mut self, current_date: impl Into<String>) -> Self {
        self.current_date = current_date.into();
        self
    }

    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.image
            .as_ref()
            .map(|img| !img.resolve().1.is_empty())
            .unwrap_or(false)
    }
}

/// Truthfulness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
    Misleading,
    Unverified,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Real,
        Verdict::Fake,
        Verdict::Misleading,
        Verdict::Unverified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
            Verdict::Misleading => "MISLEADING",
            Verdict::Unverified => "UNVERIFIED",
        }
    }

    /// Exact match on the upper-case name, surrounding whitespace ignored
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|v| v.as_str() == label)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactualCheck {
    pub claim: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Reference the model cites as evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Validated verdict returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub detected_language: String,
    pub verdict: Verdict,
    /// Always within 0..=100
    pub confidence_score: u8,
    pub summary: String,
    pub reasoning: Vec<String>,
    pub bias_analysis: String,
    pub is_sensitive: bool,
    pub factual_checks: Vec<FactualCheck>,
    pub sources: Vec<GroundingSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_strips_data_url_prefix_and_uses_its_mime() {
        let img = ImageAttachment::from_base64("data:image/png;base64,iVBORw0KGgo=");
        let (mime, payload) = img.resolve();
        assert_eq!(mime, "image/png");
        assert_eq!(payload, "iVBORw0KGgo=");
    }

    #[test]
    fn explicit_mime_wins_and_default_is_jpeg() {
        let img = ImageAttachment::from_base64("data:image/png;base64,AAAA")
            .with_mime_type("image/webp");
        assert_eq!(img.resolve().0, "image/webp");

        let bare = ImageAttachment::from_base64("AAAA");
        assert_eq!(bare.resolve(), (DEFAULT_IMAGE_MIME.to_string(), "AAAA"));
    }

    #[test]
    fn verdict_labels_are_exact() {
        assert_eq!(Verdict::from_label(" FAKE "), Some(Verdict::Fake));
        assert_eq!(Verdict::from_label("fake"), None);
        assert_eq!(Verdict::from_label("MOSTLY TRUE"), None);
        assert_eq!(
            serde_json::to_string(&Verdict::Misleading).unwrap(),
            "\"MISLEADING\""
        );
    }
}
