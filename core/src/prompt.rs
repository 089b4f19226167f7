//! Prompt assembly: turns an `AnalysisRequest` into one user turn for the model.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::AnalysisRequest;
use crate::llm::{Content, GenerateContentRequest, Part};
use crate::{Result, VerityError};

/// Image ready for the wire: bare base64 plus declared MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// Instruction block plus user content for a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub instruction: String,
    pub user_text: String,
    pub image: Option<InlineImage>,
}

impl PromptPayload {
    /// Single user turn; the image part (if any) precedes the text part
    pub fn to_request(&self) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(img) = &self.image {
            parts.push(Part::inline(img.mime_type.clone(), img.data.clone()));
        }
        parts.push(Part::text(format!(
            "System Instruction: {}\n\n{}",
            self.instruction, self.user_text
        )));
        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            ..Default::default()
        }
    }
}

/// Fact-checking instruction with the output schema the model must follow.
///
/// The sensitivity rule is product policy: only explicit sexual content,
/// nudity or rape count; violence and property crime never do.
pub fn system_instruction(target_language: &str, current_date: &str) -> String {
    format!(
        r#"You are an elite AI fact-checker. Current Date: {date}.

ALGORITHM:
1. Identify the language of the input.
2. Analyze source credibility and logical consistency.
3. Check for sensitive topics (Rape, Pornography, Sexual Content, Nudity). Mark "isSensitive": true ONLY for confirmed explicit sexual content/nudity or rape. ABSOLUTELY EXCLUDE Murder, Theft, Robbery, or general violence from being labeled as sensitive, regardless of severity.
4. Write every free-text field of the output in this language: {lang}.
5. IF AN IMAGE IS PROVIDED: analyze its visual elements, overlaid text and metadata for signs of manipulation or missing context.

Respond with JSON only, in exactly this format:
{{
  "detectedLanguage": "string",
  "verdict": "REAL" | "FAKE" | "MISLEADING" | "UNVERIFIED",
  "confidenceScore": integer (0-100),
  "summary": "Overview in {lang}",
  "reasoning": ["point 1 in {lang}", ...],
  "biasAnalysis": "Bias evaluation in {lang}",
  "isSensitive": boolean,
  "factualChecks": [
    {{
      "claim": "Claim",
      "isCorrect": boolean,
      "explanation": "Explanation in {lang}"
    }}
  ]
}}"#,
        date = current_date,
        lang = target_language,
    )
}

fn user_text(request: &AnalysisRequest) -> String {
    if request.has_text() {
        format!("Analyze this news content:\n\n\"{}\"", request.raw_text)
    } else {
        "Analyze the attached image as a news item.".to_string()
    }
}

/// Build the payload. Fails when there is nothing to analyze or the image is not valid base64.
pub fn build_prompt(request: &AnalysisRequest) -> Result<PromptPayload> {
    let image = match &request.image {
        Some(attachment) if request.has_image() => {
            let (mime_type, data) = attachment.resolve();
            BASE64.decode(data).map_err(|e| {
                VerityError::InvalidInput(format!("image data is not valid base64: {e}"))
            })?;
            Some(InlineImage {
                mime_type,
                data: data.to_string(),
            })
        }
        _ => None,
    };

    if !request.has_text() && image.is_none() {
        return Err(VerityError::InvalidInput(
            "request needs text or an image".to_string(),
        ));
    }

    debug!(
        target = "verity::prompt",
        language = %request.target_language,
        text_chars = request.raw_text.chars().count(),
        has_image = image.is_some(),
        "Built fact-check prompt"
    );

    Ok(PromptPayload {
        instruction: system_instruction(&request.target_language, &request.current_date),
        user_text: user_text(request),
        image,
    })
}
