//! Inserts a single change-annotation comment into a source file
//!
//! The comment lands below the leading header block (shebang and encoding
//! lines). A file consisting only of header lines gets the comment after
//! its last line.

use crate::error::AnnotateError;
use std::fs;
use std::path::Path;

/// Prefix of every inserted comment
pub const ANNOTATION_PREFIX: &str = "# TODO: PyCompileCheck detected changes: ";

/// Build the comment line, without a line terminator
pub fn annotation_line(descriptions: &[String]) -> String {
    format!("{}{}", ANNOTATION_PREFIX, descriptions.join(", "))
}

/// Index of the first line that is not a header line
///
/// Returns `lines.len()` when every line is a header line.
pub fn insertion_index<S: AsRef<str>>(lines: &[S], header_prefixes: &[String]) -> usize {
    lines
        .iter()
        .position(|line| {
            let trimmed = line.as_ref().trim();
            !header_prefixes
                .iter()
                .any(|prefix| trimmed.starts_with(prefix.as_str()))
        })
        .unwrap_or(lines.len())
}

/// Terminator of the first terminated line, `\n` when there is none
fn line_ending(lines: &[&str]) -> &'static str {
    match lines.iter().find(|line| line.ends_with('\n')) {
        Some(line) if line.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

/// Insert the annotation into `content`, preserving every original line
pub fn annotate_content(content: &str, descriptions: &[String], header_prefixes: &[String]) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let index = insertion_index(&lines, header_prefixes);
    let comment = annotation_line(descriptions);
    let eol = line_ending(&lines);

    let mut out = String::with_capacity(content.len() + comment.len() + 2);
    for (i, line) in lines.iter().enumerate() {
        if i == index {
            out.push_str(&comment);
            out.push_str(eol);
        }
        out.push_str(line);
    }

    if index == lines.len() {
        // Header-only file: the last header line may lack its terminator
        if !out.is_empty() && !out.ends_with('\n') {
            out.push_str(eol);
        }
        out.push_str(&comment);
        out.push_str(eol);
    }

    out
}

/// Annotate the file at `path` in place, fully overwriting it
pub fn annotate_file(
    path: &Path,
    descriptions: &[String],
    header_prefixes: &[String],
) -> Result<(), AnnotateError> {
    if descriptions.is_empty() {
        return Err(AnnotateError::NoChanges(path.display().to_string()));
    }

    let bytes = fs::read(path).map_err(|e| AnnotateError::ReadFailed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let content = String::from_utf8(bytes)
        .map_err(|_| AnnotateError::InvalidUtf8(path.display().to_string()))?;

    let annotated = annotate_content(&content, descriptions, header_prefixes);

    fs::write(path, annotated).map_err(|e| AnnotateError::WriteFailed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!("Annotated {:?}: {}", path, descriptions.join(", "));
    Ok(())
}
