//! Batch translation endpoints: file upload and progress polling

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{render_instruction, DEFAULT_SYSTEM_PROMPT};
use crate::infrastructure::report::{render_report, TranslationPair};
use crate::infrastructure::ProgressSnapshot;

/// Accepted upload extensions, lowercase
const ALLOWED_EXTENSIONS: &[&str] = &["txt", "csv"];

#[derive(Debug, Default)]
struct UploadForm {
    filename: Option<String>,
    contents: Option<String>,
    model_id: Option<String>,
    source_language: Option<String>,
    target_language: Option<String>,
    system_prompt: Option<String>,
}

/// POST /v1/batch
///
/// Multipart upload of a line-oriented document. Responds with a rendered
/// HTML report as a download once every line has been translated.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;

    let filename = form
        .filename
        .ok_or_else(|| ApiError::bad_request("No file was uploaded").with_param("file"))?;
    let contents = form.contents.unwrap_or_default();
    let model_id = form
        .model_id
        .ok_or_else(|| ApiError::bad_request("A model must be selected").with_param("model_id"))?;
    let source_language = form
        .source_language
        .ok_or_else(|| ApiError::bad_request("Missing source language"))?;
    let target_language = form
        .target_language
        .ok_or_else(|| ApiError::bad_request("Missing target language"))?;

    let stem = validate_filename(&filename)?;

    let lines = lines_from(&contents);
    if lines.is_empty() {
        return Err(ApiError::bad_request("The uploaded file contains no text").with_param("file"));
    }

    let template = form
        .system_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let system_prompt = render_instruction(template, &source_language, &target_language);

    info!(%filename, %model_id, lines = lines.len(), "batch upload accepted");

    let originals = lines.clone();
    let translated = state
        .batch
        .run(&model_id, &system_prompt, lines)
        .await
        .map_err(ApiError::from)?;

    let pairs: Vec<TranslationPair> = originals
        .into_iter()
        .zip(translated)
        .map(|(original, translated)| TranslationPair {
            original,
            translated,
        })
        .collect();

    let html = render_report(&pairs, &source_language, &target_language);
    let download_name = output_filename(stem);

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        html,
    ))
}

/// GET /v1/batch/progress
pub async fn progress(State(state): State<AppState>) -> Json<ProgressSnapshot> {
    Json(state.progress.snapshot())
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                form.filename = field.file_name().map(str::to_string);
                form.contents = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read uploaded file: {}", e))
                })?);
            }
            "model_id" => form.model_id = read_text(field).await?,
            "source_language" => form.source_language = read_text(field).await?,
            "target_language" => form.target_language = read_text(field).await?,
            "system_prompt" => form.system_prompt = read_text(field).await?,
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>, ApiError> {
    let text = field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart field: {}", e)))?;

    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

/// Check the extension and return the filename stem.
fn validate_filename(filename: &str) -> Result<&str, ApiError> {
    let (stem, extension) = filename
        .rsplit_once('.')
        .ok_or_else(|| ApiError::bad_request("Uploaded file has no extension"))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
        return Err(ApiError::bad_request(format!(
            "Unsupported file type '.{}'. Allowed types: .txt, .csv",
            extension
        ))
        .with_param("file"));
    }

    Ok(stem)
}

/// Non-empty trimmed lines, in document order. Blank lines carry no text to
/// translate and are dropped, matching what the report shows.
fn lines_from(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn output_filename(stem: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    format!("{stem}_translated_{timestamp}.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;

    #[test]
    fn test_lines_from_drops_blank_lines() {
        let lines = lines_from("one\n\n  \ntwo  \r\nthree");
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_validate_filename_accepts_txt_and_csv() {
        assert_eq!(validate_filename("doc.txt").unwrap(), "doc");
        assert_eq!(validate_filename("data.CSV").unwrap(), "data");
    }

    #[test]
    fn test_validate_filename_rejects_other_types() {
        assert!(validate_filename("book.pdf").is_err());
        assert!(validate_filename("noextension").is_err());
    }

    #[test]
    fn test_output_filename_keeps_the_stem() {
        let name = output_filename("chapter1");
        assert!(name.starts_with("chapter1_translated_"));
        assert!(name.ends_with(".html"));
    }

    #[tokio::test]
    async fn test_progress_starts_empty() {
        let state = test_state().await;

        let snapshot = progress(State(state)).await.0;
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.percent, 0);
    }
}
