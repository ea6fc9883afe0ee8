//! Small string and file system helpers.
//!
//! - Title casing for verdict labels
//! - Truncation and slugification for logs and report file names
//! - Output directory validation for reports

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Title-case a label: the first letter of every alphabetic run is
/// uppercased and the rest of the run is lowercased.
///
/// ```ignore
/// assert_eq!(title_case("not a NEWS"), "Not A News");
/// assert_eq!(title_case("FALSE"), "False");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a claim to a file-name-friendly slug, at most `max_len` chars.
///
/// ```ignore
/// assert_eq!(slugify_title("Flight MH370 found!", 40), "flight-mh370-found");
/// ```
pub fn slugify_title(title: &str, max_len: usize) -> String {
    let slug = title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let slug: String = slug.chars().take(max_len).collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "claim".to_string()
    } else {
        slug
    }
}

/// Create the report directory if needed and check that a file can be written in it.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe = Path::new(path).join(".newscred-probe");
    fs::write(&probe, b"").await?;
    fs::remove_file(&probe).await?;
    info!("Report directory is writable");
    Ok(())
}
