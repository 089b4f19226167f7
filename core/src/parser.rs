//! Model output parsing.
//!
//! The model is not a trusted compiler target: its text is unwrapped from
//! markdown fences, parsed as JSON and then checked field by field before an
//! `AnalysisResult` is built.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::{AnalysisResult, FactualCheck, GroundingSource, Verdict};
use crate::invoker::ModelReply;
use crate::llm::GenerateContentResponse;
use crate::{Result, VerityError};

/// Title given to citations that carry only a URI
pub const PLACEHOLDER_SOURCE_TITLE: &str = "Source";

fn strip_one_fence(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s.trim()
}

/// Remove surrounding ```json ... ``` (or bare ```) fences, nested ones
/// included, and trim. Idempotent.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut s = raw;
    loop {
        let next = strip_one_fence(s);
        if next == s {
            break s;
        }
        s = next;
    }
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str, raw: &str) -> Result<&'a Value> {
    obj.get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| VerityError::parse(raw, format!("missing required field `{key}`")))
}

fn optional_str(obj: &Map<String, Value>, key: &str, raw: &str) -> Result<String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(VerityError::parse(raw, format!("`{key}` must be a string"))),
    }
}

fn string_list(value: &Value, key: &str, raw: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| VerityError::parse(raw, format!("`{key}` must be an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| VerityError::parse(raw, format!("`{key}` must hold strings")))
        })
        .collect()
}

fn confidence(value: &Value) -> Result<u8> {
    let n = value.as_f64().ok_or_else(|| {
        debug!(target = "verity::parser", value = %value, "Non-numeric confidenceScore");
        VerityError::Validation("confidenceScore must be a number".to_string())
    })?;
    if n.fract() != 0.0 || !(0.0..=100.0).contains(&n) {
        debug!(target = "verity::parser", value = n, "confidenceScore out of range");
        return Err(VerityError::Validation(
            "confidenceScore must be an integer between 0 and 100".to_string(),
        ));
    }
    Ok(n as u8)
}

fn factual_checks(obj: &Map<String, Value>, raw: &str) -> Result<Vec<FactualCheck>> {
    let items = match obj.get("factualChecks") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(VerityError::parse(raw, "`factualChecks` must be an array")),
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<FactualCheck> {
            let check = item.as_object().ok_or_else(|| {
                VerityError::parse(raw, format!("factualChecks[{i}] must be an object"))
            })?;
            let is_correct = required(check, "isCorrect", raw)?.as_bool().ok_or_else(|| {
                VerityError::parse(raw, format!("factualChecks[{i}].isCorrect must be a boolean"))
            })?;
            Ok(FactualCheck {
                claim: optional_str(check, "claim", raw)?,
                is_correct,
                explanation: optional_str(check, "explanation", raw)?,
            })
        })
        .collect()
}

/// Parse and validate the model's text. `sources` is attached as given.
pub fn parse_analysis_text(raw: &str, sources: Vec<GroundingSource>) -> Result<AnalysisResult> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        debug!(target = "verity::parser", raw = %raw, "Unparsable model output");
        warn!(target = "verity::parser", error = %e, "Failed to parse model JSON");
        VerityError::parse(raw, e.to_string())
    })?;
    let obj = value
        .as_object()
        .ok_or_else(|| VerityError::parse(raw, "top-level value must be an object"))?;

    let verdict_value = required(obj, "verdict", raw)?;
    let verdict_label = verdict_value
        .as_str()
        .ok_or_else(|| VerityError::parse(raw, "`verdict` must be a string"))?;
    let verdict = Verdict::from_label(verdict_label).ok_or_else(|| {
        debug!(target = "verity::parser", verdict = %verdict_label, "Unknown verdict");
        VerityError::Validation(
            "verdict must be one of REAL, FAKE, MISLEADING, UNVERIFIED".to_string(),
        )
    })?;
    let confidence_score = confidence(required(obj, "confidenceScore", raw)?)?;
    let reasoning = string_list(required(obj, "reasoning", raw)?, "reasoning", raw)?;

    let is_sensitive = match obj.get("isSensitive") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(VerityError::parse(raw, "`isSensitive` must be a boolean")),
    };

    Ok(AnalysisResult {
        detected_language: optional_str(obj, "detectedLanguage", raw)?,
        verdict,
        confidence_score,
        summary: optional_str(obj, "summary", raw)?,
        reasoning,
        bias_analysis: optional_str(obj, "biasAnalysis", raw)?,
        is_sensitive,
        factual_checks: factual_checks(obj, raw)?,
        sources,
    })
}

/// Sources of the first candidate: citations first, then grounding chunks.
/// Entries without a URI are skipped and a URI is listed once.
pub fn extract_sources(response: &GenerateContentResponse) -> Vec<GroundingSource> {
    let mut sources: Vec<GroundingSource> = Vec::new();
    let Some(candidate) = response.first_candidate() else {
        return sources;
    };

    let mut push = |title: Option<&str>, uri: Option<&str>| {
        let Some(uri) = uri.map(str::trim).filter(|u| !u.is_empty()) else {
            return;
        };
        if sources.iter().any(|s| s.uri == uri) {
            return;
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(PLACEHOLDER_SOURCE_TITLE);
        sources.push(GroundingSource {
            title: title.to_string(),
            uri: uri.to_string(),
        });
    };

    if let Some(meta) = &candidate.citation_metadata {
        for c in &meta.citation_sources {
            push(None, c.uri.as_deref());
        }
    }
    if let Some(meta) = &candidate.grounding_metadata {
        for chunk in &meta.grounding_chunks {
            if let Some(web) = &chunk.web {
                push(web.title.as_deref(), web.uri.as_deref());
            }
        }
    }
    sources
}

/// Full parse of a model reply, with its sources merged in
pub fn parse_reply(reply: &ModelReply) -> Result<AnalysisResult> {
    let sources = extract_sources(&reply.raw);
    parse_analysis_text(&reply.text, sources)
}
