mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use config::FactCheckerConfig;
use tracing::{error, info};
use verity_core::{
    AnalysisRequest, AnalysisResult, ChannelProgress, FactChecker, GeminiClient, ImageAttachment,
    Result, Verdict,
};

/// Check a news excerpt (and/or an image) for credibility
#[derive(Parser, Debug)]
#[command(name = "fact-checker", version)]
struct Cli {
    /// News text to analyze
    text: Option<String>,

    /// Read the news text from a file instead
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Attach an image (jpeg, png, webp, gif, heic)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output language display name, e.g. "English" or "Español"
    #[arg(long)]
    language: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

fn read_text(cli: &Cli) -> Result<String> {
    Ok(match (&cli.text, &cli.file) {
        (Some(t), _) => t.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => String::new(),
    })
}

fn load_image(path: &Path) -> Result<ImageAttachment> {
    let bytes = std::fs::read(path)?;
    Ok(ImageAttachment::from_bytes(&bytes, mime_for(path)))
}

fn to_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

fn render(result: &AnalysisResult) {
    let badge = match result.verdict {
        Verdict::Real => "✅",
        Verdict::Fake => "❌",
        Verdict::Misleading => "⚠️ ",
        Verdict::Unverified => "❔",
    };
    println!();
    println!("{badge} {}  (confidence: {}%)", result.verdict, result.confidence_score);
    if !result.detected_language.is_empty() {
        println!("Detected language: {}", result.detected_language);
    }
    if result.is_sensitive {
        println!("[sensitive content]");
    }
    if !result.summary.is_empty() {
        println!("\n{}", result.summary);
    }
    if !result.reasoning.is_empty() {
        println!("\nReasoning:");
        for r in &result.reasoning {
            println!("  - {r}");
        }
    }
    if !result.factual_checks.is_empty() {
        println!("\nFactual checks:");
        for c in &result.factual_checks {
            let mark = if c.is_correct { "✓" } else { "✗" };
            println!("  {mark} {}\n      {}", c.claim, c.explanation);
        }
    }
    if !result.bias_analysis.is_empty() {
        println!("\nBias: {}", result.bias_analysis);
    }
    if !result.sources.is_empty() {
        println!("\nSources:");
        for s in &result.sources {
            println!("  - {}: {}", s.title, s.uri);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Same lookup order as the web front-end: .env.local, then .env
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,verity_core=info,fact_checker=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = FactCheckerConfig::load();
    if let Some(lang) = cli.language.clone() {
        cfg.language = lang;
    }

    let text = read_text(&cli)?;
    let image = cli.image.as_deref().map(load_image).transpose()?;

    if !cfg.accepts(&text, image.is_some()) {
        eprintln!(
            "Please provide at least {} characters of text or attach an image.",
            cfg.min_text_chars
        );
        std::process::exit(2);
    }

    let checker = FactChecker::new(Arc::new(GeminiClient::new(cfg.gemini.clone())?));

    let mut request = AnalysisRequest::new(text, cfg.language.clone());
    if let Some(img) = image {
        request = request.with_image(img);
    }
    info!(target = "fact_checker", language = %request.target_language, date = %request.current_date, "Submitting analysis");

    let (progress, mut stages) = ChannelProgress::new();
    let printer = tokio::spawn(async move {
        while let Some(stage) = stages.recv().await {
            eprintln!("… {stage}");
        }
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(cfg.timeout_secs),
        checker.analyze(&request, &progress),
    )
    .await;
    drop(progress);
    let _ = printer.await;

    match outcome {
        Ok(Ok(result)) => {
            if cli.json {
                println!("{}", to_json(&result)?);
            } else {
                render(&result);
            }
            Ok(())
        }
        Ok(Err(e)) => {
            if let Some(raw) = e.raw_output() {
                tracing::debug!(target = "fact_checker", raw = %raw, "Model output that failed to parse");
            }
            error!(target = "fact_checker", error = %e, "Analysis failed");
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
        Err(_) => {
            error!(target = "fact_checker", timeout_secs = cfg.timeout_secs, "Analysis timed out");
            eprintln!("Analysis timed out after {}s.", cfg.timeout_secs);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_core::VerityError;

    #[test]
    fn missing_image_file_is_an_io_error() {
        let err = load_image(Path::new("/nonexistent/dir/photo.png")).unwrap_err();
        assert!(matches!(err, VerityError::Io(_)));
    }

    #[test]
    fn missing_text_file_is_an_io_error() {
        let cli = Cli::parse_from(["fact-checker", "--file", "/nonexistent/dir/news.txt"]);
        assert!(matches!(read_text(&cli), Err(VerityError::Io(_))));
    }

    #[test]
    fn image_bytes_are_encoded_with_extension_mime() {
        let path = std::env::temp_dir().join(format!("fact_checker_{}.png", std::process::id()));
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let img = load_image(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(img.mime_type.as_deref(), Some("image/png"));
        assert_eq!(img.data, "iVBORw==");
    }

    #[test]
    fn json_output_uses_camel_case() {
        let result = AnalysisResult {
            detected_language: "English".into(),
            verdict: Verdict::Misleading,
            confidence_score: 70,
            summary: String::new(),
            reasoning: vec!["partly true".into()],
            bias_analysis: String::new(),
            is_sensitive: false,
            factual_checks: vec![],
            sources: vec![],
        };
        let out = to_json(&result).unwrap();
        assert!(out.contains("\"confidenceScore\": 70"));
        assert!(out.contains("\"verdict\": \"MISLEADING\""));
    }
}
