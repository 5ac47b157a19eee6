//! Text normalization and prompt-safe chunking.
//!
//! The normalizer receives raw text from the external file-parsing
//! collaborator and produces a document ready for prompting. The
//! chunker splits oversized documents along paragraph boundaries with
//! overlap, so an action point's context survives a chunk edge.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::InputError;

fn spaces_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("valid regex"))
}

fn newline_pad_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ?\n ?").expect("valid regex"))
}

fn blank_runs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Normalize raw document text for prompting.
///
/// Collapses whitespace runs, strips control and other non-printable
/// characters, and reduces blank-line runs to single paragraph breaks.
/// Fails with [`InputError::EmptyDocument`] when nothing extractable
/// remains.
pub fn normalize(raw: &str) -> Result<String, InputError> {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let printable: String = unified
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect();

    let collapsed = spaces_re().replace_all(&printable, " ");
    let trimmed_lines = newline_pad_re().replace_all(&collapsed, "\n");
    let text = blank_runs_re()
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(InputError::EmptyDocument);
    }
    Ok(text)
}

/// Split normalized text into overlapping chunks along paragraph
/// boundaries.
///
/// Paragraphs pack greedily up to `max_chars`. Each chunk after the
/// first starts with trailing paragraphs of its predecessor totalling
/// at least `overlap_chars` (when available). A single paragraph
/// longer than `max_chars` is hard-split at character boundaries with
/// the same overlap.
///
/// Deterministic: the same input always yields the same chunks.
pub fn split_into_chunks(text: &str, max_chars: usize, overlap_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    // Overlap must leave room for progress.
    let overlap = overlap_chars.min(max_chars / 2);

    let mut paragraphs: Vec<String> = Vec::new();
    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if para.chars().count() > max_chars {
            paragraphs.extend(hard_split(para, max_chars, overlap));
        } else {
            paragraphs.push(para.to_string());
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0usize;

    for para in paragraphs {
        let para_len = para.chars().count();
        // +2 for the paragraph separator
        let sep = if current.is_empty() { 0 } else { 2 };
        if current_len + sep + para_len > max_chars && !current.is_empty() {
            chunks.push(current.join("\n\n"));

            // Seed the next chunk with trailing overlap paragraphs.
            let mut carried: Vec<String> = Vec::new();
            let mut carried_len = 0usize;
            for prev in current.iter().rev() {
                if carried_len >= overlap {
                    break;
                }
                carried_len += prev.chars().count() + 2;
                carried.push(prev.clone());
            }
            carried.reverse();
            // The carried overlap must still leave room for the
            // incoming paragraph.
            while !carried.is_empty() && carried_len + 2 + para_len > max_chars {
                let dropped = carried.remove(0);
                carried_len -= dropped.chars().count() + 2;
            }
            current = carried;
            current_len = current_len_of(&current);
        }
        if !current.is_empty() {
            current_len += 2;
        }
        current_len += para_len;
        current.push(para);
    }

    if !current.is_empty() {
        chunks.push(current.join("\n\n"));
    }
    chunks
}

/// Joined length of a paragraph run, separators included.
fn current_len_of(paragraphs: &[String]) -> usize {
    let content: usize = paragraphs.iter().map(|p| p.chars().count()).sum();
    content + paragraphs.len().saturating_sub(1) * 2
}

/// Split one oversized paragraph into character windows with overlap.
fn hard_split(paragraph: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = paragraph.chars().collect();
    let step = max_chars - overlap;
    let mut pieces = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        pieces.push(chars[start..end].iter().collect::<String>());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    pieces
}
