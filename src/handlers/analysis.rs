use axum::{
    extract::Multipart,
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::{
    analyzer::{self, TextAnalysis},
    error::{AppError, Result},
    response,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    file_name: Option<String>,
    file_size: u64,
    file_size_label: String,
    #[serde(flatten)]
    analysis: TextAnalysis,
    reading_time_label: String,
}

/// Character and word statistics for an uploaded `.txt` file.
#[axum::debug_handler]
pub async fn analyze_text_file(mut multipart: Multipart) -> Result<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("Ошибка чтения формы: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Multipart(format!("Ошибка чтения файла: {}", e)))?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| AppError::Validation("Ошибка анализа файла".to_string()))?;

        let analysis = analyzer::analyze(content);
        tracing::debug!(
            "📊 Analyzed {:?}: {} words, {} chars",
            file_name,
            analysis.word_count,
            analysis.char_count
        );

        return response::json(
            StatusCode::OK,
            &AnalysisResponse {
                file_name,
                file_size: bytes.len() as u64,
                file_size_label: analyzer::format_file_size(bytes.len() as u64),
                analysis,
                reading_time_label: analyzer::format_reading_time(analysis.reading_time_minutes),
            },
        );
    }

    Err(AppError::Validation("Файл обязателен".to_string()))
}
