//! ZIP packaging of a single session.
//!
//! An archive holds two entries: `data.txt`, a `#`-commented header followed
//! by a blank line and the raw `variable`, and `session-metadata.json`, which
//! is informational only. Decoding reads nothing but `data.txt`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{Cursor, Read, Write};
use zip::{CompressionMethod, ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::{
    error::{AppError, Result},
    models::session::{Session, SessionStatus},
};

/// Entry carrying the header and the payload.
pub const DATA_ENTRY: &str = "data.txt";
/// Entry carrying the informational metadata record.
pub const METADATA_ENTRY: &str = "session-metadata.json";

/// Largest `data.txt` accepted on import, after decompression.
pub const MAX_DATA_BYTES: u64 = 16 * 1024 * 1024;

const COMMENT_MARKER: char = '#';
const TITLE: &str = "Gemini CLI Session Data";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveMetadata<'a> {
    name: &'a str,
    status: SessionStatus,
    created_at: DateTime<Utc>,
    exported_at: DateTime<Utc>,
}

/// Flattens a value onto one header line so it cannot end the comment block.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Renders the `data.txt` body for a session.
pub fn render_body(session: &Session) -> String {
    format!(
        "{m} {title}\n{m} Session Name: {name}\n{m} Created: {created}\n{m} Status: {status}\n\n{variable}",
        m = COMMENT_MARKER,
        title = TITLE,
        name = header_value(&session.name),
        created = session.created_at.to_rfc3339(),
        status = session.status,
        variable = session.variable,
    )
}

/// Packs a session into a two-entry ZIP archive.
pub fn encode(session: &Session, exported_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let metadata = ArchiveMetadata {
        name: &session.name,
        status: session.status,
        created_at: session.created_at,
        exported_at,
    };
    let metadata_json = sonic_rs::to_string_pretty(&metadata)
        .map_err(|e| AppError::Internal(format!("Metadata serialization failed: {}", e)))?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    writer
        .start_file(DATA_ENTRY, options)
        .map_err(|e| AppError::Internal(format!("Failed to start {}: {}", DATA_ENTRY, e)))?;
    writer.write_all(render_body(session).as_bytes())?;

    writer
        .start_file(METADATA_ENTRY, options)
        .map_err(|e| AppError::Internal(format!("Failed to start {}: {}", METADATA_ENTRY, e)))?;
    writer.write_all(metadata_json.as_bytes())?;

    let cursor = writer
        .finish()
        .map_err(|e| AppError::Internal(format!("Failed to finish archive: {}", e)))?;

    Ok(cursor.into_inner())
}

/// Pulls the payload out of a `data.txt` body.
///
/// The payload starts at the first line that is neither blank nor starts
/// with `#`, and runs to the end of the text. A payload whose own first
/// line begins with `#` is therefore cut at its first non-comment line.
pub fn extract_variable(body: &str) -> Result<String> {
    let lines: Vec<&str> = body.split('\n').collect();

    let start = lines
        .iter()
        .position(|line| !line.starts_with(COMMENT_MARKER) && !line.trim().is_empty())
        .ok_or_else(|| AppError::Format("Переменная сессии не найдена в файле".to_string()))?;

    let variable = lines[start..].join("\n").trim().to_string();
    if variable.is_empty() {
        return Err(AppError::Format("Переменная сессии пуста".to_string()));
    }

    Ok(variable)
}

/// Reads the session payload back out of an archive.
pub fn decode(bytes: &[u8]) -> Result<String> {
    decode_with_limit(bytes, MAX_DATA_BYTES)
}

fn decode_with_limit(bytes: &[u8], limit: u64) -> Result<String> {
    if !infer::archive::is_zip(bytes) {
        return Err(AppError::Format("Файл не является ZIP-архивом".to_string()));
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Format(format!("Не удалось открыть архив: {}", e)))?;

    let mut entry = archive.by_name(DATA_ENTRY).map_err(|e| match e {
        ZipError::FileNotFound => {
            AppError::Format(format!("Файл {} не найден в архиве", DATA_ENTRY))
        }
        other => AppError::Format(format!("Не удалось прочитать {}: {}", DATA_ENTRY, other)),
    })?;

    let too_large = || AppError::Format(format!("Файл {} слишком большой", DATA_ENTRY));
    if entry.size() > limit {
        return Err(too_large());
    }

    // The declared size can lie, so the read itself is bounded too.
    let mut body = String::new();
    entry
        .by_ref()
        .take(limit + 1)
        .read_to_string(&mut body)
        .map_err(|e| AppError::Format(format!("Не удалось прочитать {}: {}", DATA_ENTRY, e)))?;
    if body.len() as u64 > limit {
        return Err(too_large());
    }

    extract_variable(&body)
}
