use serde::Serialize;

/// Reference reading speed used for the time estimate.
pub const WORDS_PER_MINUTE: usize = 225;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Statistics for a plain-text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    /// Characters other than whitespace.
    pub char_count: usize,
    /// Whitespace-separated tokens.
    pub word_count: usize,
    pub reading_time_minutes: usize,
}

/// Counts characters and words in `content` and estimates reading time.
pub fn analyze(content: &str) -> TextAnalysis {
    let char_count = content.chars().filter(|c| !c.is_whitespace()).count();
    let word_count = content.split_whitespace().count();

    TextAnalysis {
        char_count,
        word_count,
        reading_time_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
    }
}

/// Human-readable size in base-1024 units, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let rounded = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Reading time as shown on the dashboard, e.g. `45 мин` or `2ч 5м`.
pub fn format_reading_time(minutes: usize) -> String {
    if minutes < 60 {
        return format!("{} мин", minutes);
    }

    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining > 0 {
        format!("{}ч {}м", hours, remaining)
    } else {
        format!("{}ч", hours)
    }
}
