//! Canonical book table
//!
//! Maps canonical English book names to their 3-letter USFM codes, canonical
//! order numbers, and common abbreviations. Lookup is case-insensitive and
//! ignores spaces and periods, so "1 Cor.", "1Co" and "1corinthians" all
//! resolve to 1 Corinthians.

/// One entry in the canonical book table
#[derive(Debug, Clone, Copy)]
pub struct Book {
    /// Canonical English name ("1 Corinthians")
    pub name: &'static str,
    /// 3-letter USFM code ("1CO")
    pub code: &'static str,
    /// Canonical order number, 1 (Genesis) through 66 (Revelation)
    pub number: u8,
    /// Common abbreviations, normalized (lowercase, no spaces/periods)
    pub aliases: &'static [&'static str],
}

/// The 66-book Protestant canon in canonical order
pub static BOOKS: &[Book] = &[
    Book { name: "Genesis", code: "GEN", number: 1, aliases: &["gen", "gn"] },
    Book { name: "Exodus", code: "EXO", number: 2, aliases: &["exo", "ex", "exod"] },
    Book { name: "Leviticus", code: "LEV", number: 3, aliases: &["lev", "lv"] },
    Book { name: "Numbers", code: "NUM", number: 4, aliases: &["num", "nm", "nb"] },
    Book { name: "Deuteronomy", code: "DEU", number: 5, aliases: &["deu", "deut", "dt"] },
    Book { name: "Joshua", code: "JOS", number: 6, aliases: &["jos", "josh"] },
    Book { name: "Judges", code: "JDG", number: 7, aliases: &["jdg", "judg", "jdgs"] },
    Book { name: "Ruth", code: "RUT", number: 8, aliases: &["rut", "ru", "rth"] },
    Book { name: "1 Samuel", code: "1SA", number: 9, aliases: &["1sa", "1sam", "1sm"] },
    Book { name: "2 Samuel", code: "2SA", number: 10, aliases: &["2sa", "2sam", "2sm"] },
    Book { name: "1 Kings", code: "1KI", number: 11, aliases: &["1ki", "1kgs", "1kin"] },
    Book { name: "2 Kings", code: "2KI", number: 12, aliases: &["2ki", "2kgs", "2kin"] },
    Book { name: "1 Chronicles", code: "1CH", number: 13, aliases: &["1ch", "1chr", "1chron"] },
    Book { name: "2 Chronicles", code: "2CH", number: 14, aliases: &["2ch", "2chr", "2chron"] },
    Book { name: "Ezra", code: "EZR", number: 15, aliases: &["ezr"] },
    Book { name: "Nehemiah", code: "NEH", number: 16, aliases: &["neh", "ne"] },
    Book { name: "Esther", code: "EST", number: 17, aliases: &["est", "esth"] },
    Book { name: "Job", code: "JOB", number: 18, aliases: &["job", "jb"] },
    Book { name: "Psalms", code: "PSA", number: 19, aliases: &["psa", "ps", "pss", "psalm", "psm"] },
    Book { name: "Proverbs", code: "PRO", number: 20, aliases: &["pro", "prov", "prv"] },
    Book { name: "Ecclesiastes", code: "ECC", number: 21, aliases: &["ecc", "eccl", "qoh"] },
    Book { name: "Song of Solomon", code: "SNG", number: 22, aliases: &["sng", "song", "sos", "songofsongs"] },
    Book { name: "Isaiah", code: "ISA", number: 23, aliases: &["isa", "is"] },
    Book { name: "Jeremiah", code: "JER", number: 24, aliases: &["jer", "jr"] },
    Book { name: "Lamentations", code: "LAM", number: 25, aliases: &["lam", "lm"] },
    Book { name: "Ezekiel", code: "EZK", number: 26, aliases: &["ezk", "ezek", "eze"] },
    Book { name: "Daniel", code: "DAN", number: 27, aliases: &["dan", "dn"] },
    Book { name: "Hosea", code: "HOS", number: 28, aliases: &["hos", "ho"] },
    Book { name: "Joel", code: "JOL", number: 29, aliases: &["jol", "joel", "jl"] },
    Book { name: "Amos", code: "AMO", number: 30, aliases: &["amo", "am"] },
    Book { name: "Obadiah", code: "OBA", number: 31, aliases: &["oba", "obad", "ob"] },
    Book { name: "Jonah", code: "JON", number: 32, aliases: &["jon", "jnh"] },
    Book { name: "Micah", code: "MIC", number: 33, aliases: &["mic", "mc"] },
    Book { name: "Nahum", code: "NAM", number: 34, aliases: &["nam", "nah", "na"] },
    Book { name: "Habakkuk", code: "HAB", number: 35, aliases: &["hab", "hb"] },
    Book { name: "Zephaniah", code: "ZEP", number: 36, aliases: &["zep", "zeph"] },
    Book { name: "Haggai", code: "HAG", number: 37, aliases: &["hag", "hg"] },
    Book { name: "Zechariah", code: "ZEC", number: 38, aliases: &["zec", "zech", "zc"] },
    Book { name: "Malachi", code: "MAL", number: 39, aliases: &["mal", "ml"] },
    Book { name: "Matthew", code: "MAT", number: 40, aliases: &["mat", "mt", "matt"] },
    Book { name: "Mark", code: "MRK", number: 41, aliases: &["mrk", "mk", "mark"] },
    Book { name: "Luke", code: "LUK", number: 42, aliases: &["luk", "lk"] },
    Book { name: "John", code: "JHN", number: 43, aliases: &["jhn", "jn"] },
    Book { name: "Acts", code: "ACT", number: 44, aliases: &["act", "ac"] },
    Book { name: "Romans", code: "ROM", number: 45, aliases: &["rom", "rm"] },
    Book { name: "1 Corinthians", code: "1CO", number: 46, aliases: &["1co", "1cor"] },
    Book { name: "2 Corinthians", code: "2CO", number: 47, aliases: &["2co", "2cor"] },
    Book { name: "Galatians", code: "GAL", number: 48, aliases: &["gal", "ga"] },
    Book { name: "Ephesians", code: "EPH", number: 49, aliases: &["eph"] },
    Book { name: "Philippians", code: "PHP", number: 50, aliases: &["php", "phil", "phili"] },
    Book { name: "Colossians", code: "COL", number: 51, aliases: &["col"] },
    Book { name: "1 Thessalonians", code: "1TH", number: 52, aliases: &["1th", "1thess", "1thes"] },
    Book { name: "2 Thessalonians", code: "2TH", number: 53, aliases: &["2th", "2thess", "2thes"] },
    Book { name: "1 Timothy", code: "1TI", number: 54, aliases: &["1ti", "1tim"] },
    Book { name: "2 Timothy", code: "2TI", number: 55, aliases: &["2ti", "2tim"] },
    Book { name: "Titus", code: "TIT", number: 56, aliases: &["tit", "ti"] },
    Book { name: "Philemon", code: "PHM", number: 57, aliases: &["phm", "phlm", "philem"] },
    Book { name: "Hebrews", code: "HEB", number: 58, aliases: &["heb"] },
    Book { name: "James", code: "JAS", number: 59, aliases: &["jas", "jam", "jm"] },
    Book { name: "1 Peter", code: "1PE", number: 60, aliases: &["1pe", "1pet", "1pt"] },
    Book { name: "2 Peter", code: "2PE", number: 61, aliases: &["2pe", "2pet", "2pt"] },
    Book { name: "1 John", code: "1JN", number: 62, aliases: &["1jn", "1john", "1jo"] },
    Book { name: "2 John", code: "2JN", number: 63, aliases: &["2jn", "2john", "2jo"] },
    Book { name: "3 John", code: "3JN", number: 64, aliases: &["3jn", "3john", "3jo"] },
    Book { name: "Jude", code: "JUD", number: 65, aliases: &["jud", "jude"] },
    Book { name: "Revelation", code: "REV", number: 66, aliases: &["rev", "rv", "apoc"] },
];

/// Normalize a book query for lookup: lowercase, spaces and periods removed
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Find a book by name, code, or common abbreviation.
///
/// Lookup order: exact canonical name, exact code, exact alias, then a
/// prefix match against the canonical name (3 characters minimum, first
/// book in canonical order wins).
pub fn find(query: &str) -> Option<&'static Book> {
    let q = normalize(query);
    if q.is_empty() {
        return None;
    }

    for book in BOOKS {
        if normalize(book.name) == q || book.code.to_ascii_lowercase() == q {
            return Some(book);
        }
    }
    for book in BOOKS {
        if book.aliases.contains(&q.as_str()) {
            return Some(book);
        }
    }
    if q.len() >= 3 {
        for book in BOOKS {
            if normalize(book.name).starts_with(&q) {
                return Some(book);
            }
        }
    }
    None
}

/// Map a canonical book name to its 3-letter code.
///
/// Unknown names pass through uppercased so callers can still build an
/// upstream path from them.
pub fn code_for_name(name: &str) -> String {
    match find(name) {
        Some(book) => book.code.to_string(),
        None => name.to_ascii_uppercase(),
    }
}
