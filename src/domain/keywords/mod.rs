//! Keyword list handling: splitting the generated list and CSV export.

/// Header of the single CSV column.
pub const CSV_HEADER: &str = "Keywords";

/// Splits a comma-separated keyword response into trimmed, non-empty entries.
///
/// Order is preserved and duplicates are kept.
pub fn split_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders keywords as a one-column CSV document with a header row.
///
/// Fields containing quotes, commas or line breaks are quoted.
pub fn to_csv(keywords: &[String]) -> String {
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for keyword in keywords {
        csv.push_str(&quote_field(keyword));
        csv.push('\n');
    }
    csv
}

/// The CSV document as UTF-8 bytes.
pub fn to_csv_bytes(keywords: &[String]) -> Vec<u8> {
    to_csv(keywords).into_bytes()
}

/// Download name for a topic's keyword file.
///
/// Spaces and path separators become underscores, so the name never leaves
/// the directory it is joined onto.
pub fn csv_file_name(topic: &str) -> String {
    format!("{}_keywords.csv", topic.trim().replace([' ', '/', '\\'], "_"))
}

fn quote_field(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
