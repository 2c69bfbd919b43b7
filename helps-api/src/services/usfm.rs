//! USFM slice extraction and marker stripping
//!
//! Extracts a verse, verse range, or full chapter from raw USFM and
//! reduces it to plain text. Extracted text must be non-empty and free of
//! residual backslash escapes before a caller may accept it; anything
//! else counts as "not found" for that candidate.

use once_cell::sync::Lazy;
use regex::Regex;

use helps_common::ParsedReference;

// Alignment wrappers carry word-level metadata the plain text never shows
static ZALN_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\zaln-s\s*\|[^\\]*\\\*").expect("static regex"));
static ZALN_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\zaln-e\\\*").expect("static regex"));
static FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\f\s.*?\\f\*").expect("static regex"));
static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\+?w\s+([^|\\]*?)(?:\|[^\\]*)?\\\+?w\*").expect("static regex"));
static NUMBERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[cv]\s+\d+[a-z]?\s*").expect("static regex"));
static OTHER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\+?[a-z0-9-]+\*?\s?").expect("static regex"));

/// Strip all USFM markup, returning whitespace-normalized plain text.
pub fn to_text(usfm: &str) -> String {
    let text = ZALN_OPEN.replace_all(usfm, " ");
    let text = ZALN_CLOSE.replace_all(&text, " ");
    let text = FOOTNOTE.replace_all(&text, " ");
    let text = WORD.replace_all(&text, "$1");
    let text = NUMBERED_MARKER.replace_all(&text, " ");
    let text = OTHER_MARKER.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extraction acceptance: non-empty and no residual escape sequences.
pub fn is_clean(text: &str) -> bool {
    !text.trim().is_empty() && !text.contains('\\')
}

/// Extract the slice a reference asks for and reduce it to plain text.
///
/// Book-only references yield the whole book. Returns `None` when the
/// requested chapter/verses are absent or the stripped text fails the
/// acceptance check.
pub fn extract(usfm: &str, reference: &ParsedReference) -> Option<String> {
    let chapter = match reference.chapter {
        Some(chapter) => chapter,
        None => {
            let text = to_text(usfm);
            return is_clean(&text).then_some(text);
        }
    };

    let raw = match (reference.verse, reference.end_chapter, reference.end_verse) {
        // Full chapter
        (None, _, _) => chapter_block(usfm, chapter)?.to_string(),
        // Range crossing into a later chapter: rest of the first chapter,
        // whole middle chapters, head of the last
        (Some(verse), Some(end_chapter), Some(end_verse)) => {
            let mut parts = Vec::new();
            for c in chapter..=end_chapter {
                let block = chapter_block(usfm, c)?;
                let part = if c == chapter {
                    verse_to_end(block, verse)?
                } else if c == end_chapter {
                    verse_slice(block, 1, Some(end_verse))?
                } else {
                    block.to_string()
                };
                parts.push(part);
            }
            parts.join(" ")
        }
        // Single verse or same-chapter range
        (Some(verse), _, end_verse) => {
            verse_slice(chapter_block(usfm, chapter)?, verse, end_verse)?
        }
    };

    let text = to_text(&raw);
    is_clean(&text).then_some(text)
}

/// The raw text between `\c n` and the next `\c` (or end of book)
fn chapter_block(usfm: &str, chapter: u32) -> Option<&str> {
    let open = format!("\\c {chapter}");
    let mut search_from = 0;
    loop {
        let at = usfm[search_from..].find(&open)? + search_from;
        let after = at + open.len();
        // Guard against "\c 1" matching inside "\c 10"
        let boundary = usfm[after..]
            .chars()
            .next()
            .map(|c| !c.is_ascii_digit())
            .unwrap_or(true);
        if boundary {
            let rest = &usfm[after..];
            let end = rest.find("\\c ").map(|i| after + i).unwrap_or(usfm.len());
            return Some(&usfm[after..end]);
        }
        search_from = after;
    }
}

/// Raw text from the start of `\v from` to the end of the chapter block
fn verse_to_end(block: &str, from: u32) -> Option<String> {
    let start = verse_start(block, from)?;
    Some(block[start..].to_string())
}

/// Byte offset where `\v n` starts within a chapter block
fn verse_start(block: &str, verse: u32) -> Option<usize> {
    let open = format!("\\v {verse}");
    let mut search_from = 0;
    loop {
        let at = block[search_from..].find(&open)? + search_from;
        let after = at + open.len();
        let boundary = block[after..]
            .chars()
            .next()
            .map(|c| !c.is_ascii_digit())
            .unwrap_or(true);
        if boundary {
            return Some(at);
        }
        search_from = after;
    }
}

/// Raw text of verses `from..=to` (or `from` only) within a chapter block
fn verse_slice(block: &str, from: u32, to: Option<u32>) -> Option<String> {
    let to = to.unwrap_or(from);
    let mut collected = String::new();

    for verse in from..=to {
        let start = verse_start(block, verse)?;
        let after = start + format!("\\v {verse}").len();
        let end = block[after..]
            .find("\\v ")
            .map(|i| after + i)
            .unwrap_or(block.len());
        collected.push_str(&block[start..end]);
        collected.push(' ');
    }

    Some(collected)
}
