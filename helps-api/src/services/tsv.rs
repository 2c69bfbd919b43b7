//! TSV parsing for translation-helps resources
//!
//! The first line defines headers; every following non-blank line is
//! split on tabs and zipped against the headers by position. A row with
//! fewer fields than headers gets `""` for the missing trailing fields;
//! extra trailing fields are ignored. Well-formed rows are never altered.
//!
//! One narrow compatibility rule exists for a known upstream shape: a
//! notes-style table (`Reference` first, with `Quote`, `Occurrence` and
//! `Note` columns) sometimes ships intro rows missing their `Quote`
//! field. Those rows get an empty `Quote` inserted at its position, an
//! intro `Quote` of `"0"` is normalized to `""`, and an empty `Note`
//! paired with non-numeric `Occurrence` text means the two were swapped
//! upstream and are swapped back.

use std::collections::BTreeMap;

/// A parsed row: header name -> field value
pub type TsvRow = BTreeMap<String, String>;

/// Parsed table with header order preserved
#[derive(Debug, Clone, PartialEq)]
pub struct TsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<TsvRow>,
}

/// Parse TSV content. Blank lines are dropped.
pub fn parse(content: &str) -> TsvTable {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let headers: Vec<String> = match lines.next() {
        Some(header_line) => header_line
            .trim_end_matches('\r')
            .split('\t')
            .map(str::to_string)
            .collect(),
        None => return TsvTable { headers: vec![], rows: vec![] },
    };

    let notes_shape = is_notes_shape(&headers);
    let rows = lines
        .map(|line| {
            let mut fields: Vec<String> = line
                .trim_end_matches('\r')
                .split('\t')
                .map(str::to_string)
                .collect();

            if notes_shape {
                repair_intro_row(&headers, &mut fields);
            }

            zip_row(&headers, fields)
        })
        .collect();

    TsvTable { headers, rows }
}

/// Zip fields against headers by position; pad short rows, ignore extras.
fn zip_row(headers: &[String], mut fields: Vec<String>) -> TsvRow {
    fields.resize(headers.len(), String::new());
    headers
        .iter()
        .cloned()
        .zip(fields)
        .collect()
}

/// The specific upstream shape the intro-row quirk applies to
fn is_notes_shape(headers: &[String]) -> bool {
    headers.first().map(String::as_str) == Some("Reference")
        && ["Quote", "Occurrence", "Note"]
            .iter()
            .all(|name| headers.iter().any(|h| h == name))
}

fn is_intro_reference(reference: &str) -> bool {
    reference.ends_with(":intro") || reference == "intro"
}

/// Repair a malformed intro row in place. Fires only when the shape
/// matches exactly; anything else is left untouched.
fn repair_intro_row(headers: &[String], fields: &mut Vec<String>) {
    let intro = fields
        .first()
        .map(|reference| is_intro_reference(reference))
        .unwrap_or(false);
    if !intro {
        return;
    }

    let quote_idx = headers.iter().position(|h| h == "Quote");
    let occurrence_idx = headers.iter().position(|h| h == "Occurrence");
    let note_idx = headers.iter().position(|h| h == "Note");
    let (Some(quote_idx), Some(occurrence_idx), Some(note_idx)) =
        (quote_idx, occurrence_idx, note_idx)
    else {
        return;
    };

    // Exactly one field short: the Quote column was dropped upstream
    if fields.len() + 1 == headers.len() && quote_idx <= fields.len() {
        fields.insert(quote_idx, String::new());
    }
    if fields.len() != headers.len() {
        return;
    }

    // Intro rows never carry a real quote
    if fields[quote_idx] == "0" {
        fields[quote_idx] = String::new();
    }

    // Note text that slid into the Occurrence column
    let occurrence_is_text = !fields[occurrence_idx].is_empty()
        && fields[occurrence_idx].parse::<f64>().is_err();
    if fields[note_idx].is_empty() && occurrence_is_text {
        fields.swap(occurrence_idx, note_idx);
    }
}

/// Does a row's `Reference` (or `Chapter`/`Verse`) match the request?
///
/// Chapter filters whenever a chapter is given; verse filters only when a
/// verse is given, so chapter-only or book-only requests return broader
/// row sets. A range with `end_chapter` spans chapters: the first chapter
/// from its start verse, whole middle chapters, the last chapter up to its
/// end verse.
pub fn row_matches(
    row: &TsvRow,
    chapter: Option<u32>,
    verse: Option<u32>,
    end_chapter: Option<u32>,
    end_verse: Option<u32>,
) -> bool {
    let Some(want_chapter) = chapter else {
        return true;
    };
    let (row_chapter, row_verse) = row_location(row);

    if let Some(last_chapter) = end_chapter {
        let Some(row_chapter) = row_chapter else {
            return false;
        };
        if row_chapter < want_chapter || row_chapter > last_chapter {
            return false;
        }
        if row_chapter == want_chapter {
            if let Some(first_verse) = verse {
                return row_verse.map(|v| v >= first_verse).unwrap_or(false);
            }
            return true;
        }
        if row_chapter == last_chapter {
            if let Some(last_verse) = end_verse {
                return row_verse.map(|v| v <= last_verse).unwrap_or(false);
            }
            return true;
        }
        return true;
    }

    if row_chapter != Some(want_chapter) {
        return false;
    }
    let Some(want_verse) = verse else {
        return true;
    };
    match row_verse {
        Some(v) => v >= want_verse && v <= end_verse.unwrap_or(want_verse),
        None => false,
    }
}

/// Chapter/verse of a row from its `Reference` ("3:16") or the older
/// `Chapter`/`Verse` column pair. Intro rows have no verse.
fn row_location(row: &TsvRow) -> (Option<u32>, Option<u32>) {
    if let Some(reference) = row.get("Reference") {
        if let Some((chapter, verse)) = reference.split_once(':') {
            return (chapter.trim().parse().ok(), verse.trim().parse().ok());
        }
        return (reference.trim().parse().ok(), None);
    }
    let chapter = row.get("Chapter").and_then(|c| c.trim().parse().ok());
    let verse = row.get("Verse").and_then(|v| v.trim().parse().ok());
    (chapter, verse)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTES: &str = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
        1:1\tabc1\t\t\tgood quote\t1\tA note\n\
        1:2\tabc2\t\t\tother\t2\tAnother note\n";

    #[test]
    fn rows_zip_against_headers_by_position() {
        let table = parse(NOTES);
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Reference"], "1:1");
        assert_eq!(table.rows[0]["Quote"], "good quote");
        assert_eq!(table.rows[1]["Note"], "Another note");
    }

    #[test]
    fn every_row_has_exactly_the_header_keys() {
        let table = parse("A\tB\tC\n1\t2\n1\t2\t3\t4\n");
        for row in &table.rows {
            assert_eq!(row.len(), 3);
        }
        // Short row padded with ""
        assert_eq!(table.rows[0]["C"], "");
        // Extra trailing field ignored
        assert_eq!(table.rows[1]["C"], "3");
    }

    #[test]
    fn blank_lines_are_dropped() {
        let table = parse("A\tB\n\n1\t2\n   \n3\t4\n");
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn well_formed_rows_are_never_altered() {
        let table = parse(NOTES);
        assert_eq!(table.rows[0]["Occurrence"], "1");
        assert_eq!(table.rows[0]["Note"], "A note");
    }

    #[test]
    fn intro_row_missing_quote_gets_empty_quote() {
        // 6 fields against 7 headers, intro reference
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            1:intro\tdef1\t\t\t0\tChapter overview text\n";
        let table = parse(content);
        let row = &table.rows[0];
        assert_eq!(row.len(), 7);
        assert_eq!(row["Quote"], "");
        assert_eq!(row["Note"], "Chapter overview text");
        // "0" occurrence stays: it is numeric, so no swap applies
        assert_eq!(row["Occurrence"], "0");
    }

    #[test]
    fn intro_quote_zero_is_normalized() {
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            front:intro\tghi1\t\t\t0\t0\tBook introduction\n";
        let table = parse(content);
        assert_eq!(table.rows[0]["Quote"], "");
        assert_eq!(table.rows[0]["Note"], "Book introduction");
    }

    #[test]
    fn swapped_note_and_occurrence_are_restored() {
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            1:intro\tjkl1\t\t\t\tThe note text landed here\t\n";
        let table = parse(content);
        assert_eq!(table.rows[0]["Note"], "The note text landed here");
        assert_eq!(table.rows[0]["Occurrence"], "");
    }

    #[test]
    fn quirk_never_fires_outside_notes_shape() {
        // Same malformed width, but not a notes-style header
        let content = "Reference\tID\tQuestion\tResponse\n1:intro\tq1\tWhy?\n";
        let table = parse(content);
        assert_eq!(table.rows[0]["Response"], "");
    }

    #[test]
    fn quirk_never_fires_for_non_intro_rows() {
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            1:5\tmno1\t\t\tquote\t1\n";
        let table = parse(content);
        // Plain short row: padded at the tail, no insertion
        assert_eq!(table.rows[0]["Quote"], "quote");
        assert_eq!(table.rows[0]["Occurrence"], "1");
        assert_eq!(table.rows[0]["Note"], "");
    }

    #[test]
    fn row_filtering_by_chapter_and_verse() {
        let table = parse(NOTES);
        let row = &table.rows[0]; // 1:1

        assert!(row_matches(row, None, None, None, None));
        assert!(row_matches(row, Some(1), None, None, None));
        assert!(row_matches(row, Some(1), Some(1), None, None));
        assert!(!row_matches(row, Some(1), Some(2), None, None));
        assert!(!row_matches(row, Some(2), None, None, None));
        assert!(row_matches(row, Some(1), Some(1), None, Some(3)));
    }

    #[test]
    fn cross_chapter_range_spans_every_chapter() {
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            1:1\ta\t\t\tq\t1\tfirst chapter start\n\
            1:31\tb\t\t\tq\t1\tfirst chapter end\n\
            2:1\tc\t\t\tq\t1\tsecond chapter\n\
            2:3\td\t\t\tq\t1\tsecond chapter end\n\
            2:4\te\t\t\tq\t1\tpast the range\n\
            3:1\tf\t\t\tq\t1\tthird chapter\n";
        let table = parse(content);

        // Genesis 1:1-2:3
        let matched: Vec<&str> = table
            .rows
            .iter()
            .filter(|row| row_matches(row, Some(1), Some(1), Some(2), Some(3)))
            .map(|row| row["Reference"].as_str())
            .collect();
        assert_eq!(matched, vec!["1:1", "1:31", "2:1", "2:3"]);
    }

    #[test]
    fn cross_chapter_range_keeps_first_chapter_verse_floor() {
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            1:2\ta\t\t\tq\t1\tbefore the start\n\
            1:5\tb\t\t\tq\t1\tat the start\n\
            2:1\tc\t\t\tq\t1\tmiddle chapter\n\
            3:2\td\t\t\tq\t1\tafter the end verse\n";
        let table = parse(content);
        let matched: Vec<&str> = table
            .rows
            .iter()
            .filter(|row| row_matches(row, Some(1), Some(5), Some(3), Some(1)))
            .map(|row| row["Reference"].as_str())
            .collect();
        assert_eq!(matched, vec!["1:5", "2:1"]);
    }

    #[test]
    fn intro_rows_match_chapter_only_requests() {
        let content = "Reference\tID\tTags\tSupportReference\tQuote\tOccurrence\tNote\n\
            1:intro\tp1\t\t\t\t0\tIntro\n";
        let table = parse(content);
        let row = &table.rows[0];
        assert!(row_matches(row, Some(1), None, None, None));
        assert!(!row_matches(row, Some(1), Some(1), None, None));
    }
}
