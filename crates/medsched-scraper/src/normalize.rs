//! Pure text utilities shared by every extractor.
//!
//! Locale-sensitive handling (Spanish weekday names with accents, name
//! casing) is kept here so extractors never special-case it themselves.

use std::sync::LazyLock;

use medsched_core::NameCase;
use regex::Regex;

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

const ELLIPSIS: &str = "...";

/// Canonical weekday, rendered with its Spanish name in output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Lunes",
            Weekday::Tuesday => "Martes",
            Weekday::Wednesday => "Miércoles",
            Weekday::Thursday => "Jueves",
            Weekday::Friday => "Viernes",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }

    /// Two-letter label abbreviation (`LU`, `MA`, `MI`, ...).
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Weekday::Monday => "LU",
            Weekday::Tuesday => "MA",
            Weekday::Wednesday => "MI",
            Weekday::Thursday => "JU",
            Weekday::Friday => "VI",
            Weekday::Saturday => "SA",
            Weekday::Sunday => "DO",
        }
    }

    /// Single-letter cell code (`L`, `M`, `X`, `J`, `V`, `S`, `D`).
    #[must_use]
    pub fn cell_letter(self) -> char {
        match self {
            Weekday::Monday => 'L',
            Weekday::Tuesday => 'M',
            Weekday::Wednesday => 'X',
            Weekday::Thursday => 'J',
            Weekday::Friday => 'V',
            Weekday::Saturday => 'S',
            Weekday::Sunday => 'D',
        }
    }

    /// Resolve a label token: a two-letter abbreviation or a full day name,
    /// any case, accents optional.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let folded = fold_accents(&token.trim().to_uppercase());
        Self::ALL.into_iter().find(|day| {
            folded == day.abbreviation() || folded == fold_accents(&day.name().to_uppercase())
        })
    }

    #[must_use]
    pub fn from_cell_letter(letter: char) -> Option<Self> {
        let letter = letter.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|day| day.cell_letter() == letter)
    }
}

/// Replace Spanish accented vowels with their plain forms.
#[must_use]
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' => 'O',
            'Ú' | 'Ü' => 'U',
            other => other,
        })
        .collect()
}

/// Trim and reduce every interior whitespace run to a single space.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First digit run following `label` (case-insensitive, optional `:` and
/// whitespace in between). Empty when the label or digits are absent.
#[must_use]
pub fn extract_code(text: &str, label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        return String::new();
    }
    let pattern = format!(r"(?i){}:?\s*(\d+)", regex::escape(label));
    let Ok(re) = Regex::new(&pattern) else {
        return String::new();
    };
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// First run of digits anywhere in `text`, or empty.
#[must_use]
pub fn first_digit_run(text: &str) -> String {
    DIGIT_RUN_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Lowercase and join whitespace-separated words with single hyphens.
#[must_use]
pub fn derive_slug(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Cap `text` at `max_len` characters, appending `...` when cut.
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_len).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Uppercase the first letter of every word, lowercase the rest.
///
/// A "word" starts after any non-alphabetic character, so hyphenated and
/// apostrophe names (`garcía-lópez`, `o'brien`) are cased per part.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Collapse whitespace, then apply the source's casing convention.
#[must_use]
pub fn apply_name_case(text: &str, case: NameCase) -> String {
    let collapsed = collapse_whitespace(text);
    match case {
        NameCase::Lower => collapsed.to_lowercase(),
        NameCase::Title => title_case(&collapsed),
        NameCase::AsIs => collapsed,
    }
}

/// Remove label words (with an optional trailing `:`) and extracted codes
/// from a biography block, then collapse whitespace.
#[must_use]
pub fn strip_label_tokens(text: &str, labels: &[&str], codes: &[&str]) -> String {
    let mut stripped = text.to_string();

    let labels: Vec<String> = labels
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| regex::escape(l.trim()))
        .collect();
    if !labels.is_empty() {
        let pattern = format!(r"\b(?:{})\b:?", labels.join("|"));
        if let Ok(re) = Regex::new(&pattern) {
            stripped = re.replace_all(&stripped, " ").into_owned();
        }
    }

    for code in codes.iter().filter(|c| !c.trim().is_empty()) {
        let pattern = format!(r"\b{}\b", regex::escape(code.trim()));
        if let Ok(re) = Regex::new(&pattern) {
            stripped = re.replace_all(&stripped, " ").into_owned();
        }
    }

    collapse_whitespace(&stripped)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
