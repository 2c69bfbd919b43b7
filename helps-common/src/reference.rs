//! Scripture reference parsing
//!
//! Parses free-text references ("John 3:16", "Genesis 1:1-2:3", "1Co 1")
//! into a structured form with the canonical book name. Book lookup goes
//! through the canonical table in [`crate::books`], so common abbreviations
//! and numbered-book prefixes resolve correctly.

use serde::{Deserialize, Serialize};

use crate::books;

/// A parsed scripture reference.
///
/// When `is_valid` is false, `book` is empty. Chapter/verse numbers, when
/// present, are positive; `end_verse >= verse` whenever both refer to the
/// same chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Canonical book name ("1 Corinthians"), empty when invalid
    pub book: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
    #[serde(rename = "endChapter", skip_serializing_if = "Option::is_none")]
    pub end_chapter: Option<u32>,
    #[serde(rename = "endVerse", skip_serializing_if = "Option::is_none")]
    pub end_verse: Option<u32>,
    /// The input text as received
    #[serde(rename = "originalText")]
    pub original_text: String,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
}

impl ParsedReference {
    fn invalid(original: &str) -> Self {
        Self {
            book: String::new(),
            chapter: None,
            verse: None,
            end_chapter: None,
            end_verse: None,
            original_text: original.to_string(),
            is_valid: false,
        }
    }
}

/// Parse a free-text scripture reference.
///
/// Accepted shapes: `Book`, `Book C`, `Book C:V`, `Book C:V-V2`,
/// `Book C:V-C2:V2`. The book part may carry a numbered prefix with or
/// without a space ("1Co", "2 Cor").
pub fn parse(text: &str) -> ParsedReference {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ParsedReference::invalid(text);
    }

    let (book_part, numeric_part) = split_book(trimmed);
    let book = match books::find(book_part.trim()) {
        Some(b) => b.name.to_string(),
        None => return ParsedReference::invalid(text),
    };

    let mut parsed = ParsedReference {
        book,
        chapter: None,
        verse: None,
        end_chapter: None,
        end_verse: None,
        original_text: text.to_string(),
        is_valid: true,
    };

    let numeric_part = numeric_part.trim();
    if numeric_part.is_empty() {
        return parsed;
    }

    let (start, end) = match numeric_part.split_once('-') {
        Some((a, b)) => (a.trim(), Some(b.trim())),
        None => (numeric_part, None),
    };

    match parse_chapter_verse(start) {
        Some((chapter, verse)) => {
            parsed.chapter = Some(chapter);
            parsed.verse = verse;
        }
        None => return ParsedReference::invalid(text),
    }

    if let Some(end) = end {
        // A range end needs a range start verse
        if parsed.verse.is_none() {
            return ParsedReference::invalid(text);
        }
        match parse_chapter_verse(end) {
            // "1:1-2:3" crosses into another chapter
            Some((end_chapter, Some(end_verse))) => {
                parsed.end_chapter = Some(end_chapter);
                parsed.end_verse = Some(end_verse);
            }
            // "3:16-18" stays within the chapter
            Some((end_verse, None)) => {
                parsed.end_verse = Some(end_verse);
            }
            None => return ParsedReference::invalid(text),
        }
    }

    // Same-chapter range must not run backwards
    if parsed.end_chapter.is_none() {
        if let (Some(v), Some(ev)) = (parsed.verse, parsed.end_verse) {
            if ev < v {
                return ParsedReference::invalid(text);
            }
        }
    }

    parsed
}

/// Split input into book text and the trailing chapter/verse text.
///
/// A leading single digit (numbered book) is part of the book; the first
/// digit after at least one letter starts the chapter.
fn split_book(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let mut idx = 0;

    // Numbered-book prefix: "1Co", "2 Cor", "3 John"
    if bytes[0].is_ascii_digit() {
        idx = 1;
        while idx < bytes.len() && bytes[idx] == b' ' {
            idx += 1;
        }
    }

    let mut seen_letter = false;
    while idx < bytes.len() {
        let c = bytes[idx] as char;
        if c.is_ascii_digit() && seen_letter {
            break;
        }
        if c.is_ascii_alphabetic() {
            seen_letter = true;
        }
        idx += 1;
    }

    (&text[..idx], &text[idx..])
}

/// Parse "C" or "C:V" into (chapter, verse). Zero is not a valid number.
fn parse_chapter_verse(text: &str) -> Option<(u32, Option<u32>)> {
    if text.is_empty() {
        return None;
    }
    match text.split_once(':') {
        Some((c, v)) => {
            let chapter = parse_positive(c)?;
            let verse = parse_positive(v)?;
            Some((chapter, Some(verse)))
        }
        None => Some((parse_positive(text)?, None)),
    }
}

fn parse_positive(text: &str) -> Option<u32> {
    match text.trim().parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_book_chapter_verse() {
        let r = parse("John 3:16");
        assert_eq!(r.book, "John");
        assert_eq!(r.chapter, Some(3));
        assert_eq!(r.verse, Some(16));
        assert_eq!(r.end_chapter, None);
        assert_eq!(r.end_verse, None);
        assert!(r.is_valid);
    }

    #[test]
    fn parses_cross_chapter_range() {
        let r = parse("Genesis 1:1-2:3");
        assert_eq!(r.book, "Genesis");
        assert_eq!(r.chapter, Some(1));
        assert_eq!(r.verse, Some(1));
        assert_eq!(r.end_chapter, Some(2));
        assert_eq!(r.end_verse, Some(3));
        assert!(r.is_valid);
    }

    #[test]
    fn parses_same_chapter_range() {
        let r = parse("John 3:16-18");
        assert_eq!(r.chapter, Some(3));
        assert_eq!(r.verse, Some(16));
        assert_eq!(r.end_chapter, None);
        assert_eq!(r.end_verse, Some(18));
        assert!(r.is_valid);
    }

    #[test]
    fn normalizes_numbered_book_abbreviation() {
        let r = parse("1Co 1");
        assert_eq!(r.book, "1 Corinthians");
        assert_eq!(r.chapter, Some(1));
        assert_eq!(r.verse, None);
        assert!(r.is_valid);
    }

    #[test]
    fn parses_book_only() {
        let r = parse("Titus");
        assert_eq!(r.book, "Titus");
        assert_eq!(r.chapter, None);
        assert!(r.is_valid);
    }

    #[test]
    fn unknown_book_is_invalid_with_empty_book() {
        let r = parse("Frodo 1:1");
        assert!(!r.is_valid);
        assert!(r.book.is_empty());
    }

    #[test]
    fn backwards_range_is_invalid() {
        assert!(!parse("John 3:18-16").is_valid);
    }

    #[test]
    fn zero_verse_is_invalid() {
        assert!(!parse("John 3:0").is_valid);
        assert!(!parse("John 0:1").is_valid);
    }

    #[test]
    fn original_text_is_preserved() {
        let r = parse("  2 Cor 5:17 ");
        assert_eq!(r.original_text, "  2 Cor 5:17 ");
        assert_eq!(r.book, "2 Corinthians");
    }

    #[test]
    fn reparse_of_canonical_name_is_stable() {
        let first = parse("1Co 1");
        let second = parse(&format!("{} 1", first.book));
        assert_eq!(first.book, second.book);
        assert_eq!(first.chapter, second.chapter);
    }
}
