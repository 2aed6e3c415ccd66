//! Weekly availability decoding.
//!
//! Two encodings are supported and both yield [`TimeSlot`]s:
//!
//! - **Labeled rows**: a label cell with comma-separated day abbreviations
//!   (`"LU,MA"`) and a value cell with free text holding an `H:MM - H:MM`
//!   range. Every listed day receives the same range.
//! - **Cell assignments**: a script body made of
//!   `document.getElementById("M-M").innerHTML="11:00 - 12:30\n[506]";`
//!   statements, where the id is `<day letter>-<shift letter>` and the value
//!   may end with a bracketed office code.
//!
//! A location that yields no slot gets a single [`TimeSlot::consult`]
//! sentinel so it still produces an output row.

use std::sync::LazyLock;

use medsched_core::{TimeSlot, UNKNOWN_DAY};
use regex::Regex;

use crate::normalize::{collapse_whitespace, fold_accents, Weekday};

static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})").expect("valid time range regex")
});

static BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]").expect("valid regex"));

static CELL_ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"document\.getElementById\(\s*["']([A-Z]-[A-Z])["']\s*\)\.innerHTML\s*=\s*"((?:[^"\\]|\\.)*)"\s*;"#,
    )
    .expect("valid cell assignment regex")
});

/// Morning and afternoon shift letters used in cell ids.
const SHIFT_LETTERS: [char; 2] = ['M', 'T'];

/// First `H:MM - H:MM` range in `text`.
#[must_use]
pub fn parse_time_range(text: &str) -> Option<(String, String)> {
    let cap = TIME_RANGE_RE.captures(text)?;
    let start = cap.get(1)?.as_str().to_string();
    let end = cap.get(2)?.as_str().to_string();
    Some((start, end))
}

/// Split a row label into uppercase day tokens, dropping dots and blanks.
#[must_use]
pub fn split_day_label(label: &str) -> Vec<String> {
    label
        .to_uppercase()
        .replace('.', "")
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` when a weekday abbreviation occurs anywhere in the label, so
/// ranges like `LU - VI` or `LUNES A VIERNES` qualify.
#[must_use]
pub fn is_schedule_label(label: &str) -> bool {
    let folded = fold_accents(&label.to_uppercase().replace('.', ""));
    Weekday::ALL
        .into_iter()
        .any(|day| folded.contains(day.abbreviation()))
}

/// Decode a single labeled row. Empty when the value holds no time range.
///
/// Tokens that are not weekdays are kept verbatim as the day so malformed
/// source data stays visible.
#[must_use]
pub fn decode_labeled_row(label: &str, value: &str) -> Vec<TimeSlot> {
    let Some((start, end)) = parse_time_range(value) else {
        tracing::debug!(label, value, "schedule row has no time range; skipped");
        return Vec::new();
    };

    split_day_label(label)
        .into_iter()
        .map(|token| {
            let day = Weekday::from_token(&token).map_or(token, |d| d.name().to_string());
            TimeSlot::new(day, start.clone(), end.clone())
        })
        .collect()
}

/// Decode all labeled rows of one location, in order.
#[must_use]
pub fn decode_labeled_rows<'a, I>(rows: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let slots = rows
        .into_iter()
        .flat_map(|(label, value)| decode_labeled_row(label, value))
        .collect();
    with_consult_fallback(slots)
}

/// Canonical day for a `<day>-<shift>` cell id, or [`UNKNOWN_DAY`].
#[must_use]
pub fn day_for_cell(identifier: &str) -> String {
    let mut parts = identifier.trim().split('-');
    let (Some(day), Some(shift), None) = (parts.next(), parts.next(), parts.next()) else {
        return UNKNOWN_DAY.to_string();
    };

    let mut day_chars = day.chars();
    let mut shift_chars = shift.chars();
    match (
        day_chars.next(),
        day_chars.next(),
        shift_chars.next(),
        shift_chars.next(),
    ) {
        (Some(d), None, Some(s), None) if SHIFT_LETTERS.contains(&s.to_ascii_uppercase()) => {
            Weekday::from_cell_letter(d)
                .map_or_else(|| UNKNOWN_DAY.to_string(), |w| w.name().to_string())
        }
        _ => UNKNOWN_DAY.to_string(),
    }
}

/// Decode one cell value. `None` when the value is blank or has no range.
#[must_use]
pub fn decode_cell(identifier: &str, value: &str) -> Option<TimeSlot> {
    let cleaned = BRACKETED_RE.replace_all(value, "");
    let cleaned = collapse_whitespace(&cleaned);
    if cleaned.is_empty() {
        return None;
    }
    let Some((start, end)) = parse_time_range(&cleaned) else {
        tracing::debug!(identifier, value, "cell has no time range; skipped");
        return None;
    };
    Some(TimeSlot::new(day_for_cell(identifier), start, end))
}

/// Pull `(cell id, decoded value)` pairs out of a script body, in order.
#[must_use]
pub fn parse_cell_assignments(script: &str) -> Vec<(String, String)> {
    CELL_ASSIGNMENT_RE
        .captures_iter(script)
        .filter_map(|cap| {
            let id = cap.get(1)?.as_str().to_string();
            let value = unescape_js_string(cap.get(2)?.as_str());
            Some((id, value))
        })
        .collect()
}

/// Decode a whole cell-assignment script into slots for one location.
#[must_use]
pub fn decode_assignment_script(script: &str) -> Vec<TimeSlot> {
    let cells = parse_cell_assignments(script);
    decode_cells(cells.iter().map(|(id, v)| (id.as_str(), v.as_str())))
}

/// Decode a list of already-separated cell pairs for one location.
#[must_use]
pub fn decode_cells<'a, I>(cells: I) -> Vec<TimeSlot>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let slots = cells
        .into_iter()
        .filter_map(|(id, value)| decode_cell(id, value))
        .collect();
    with_consult_fallback(slots)
}

fn with_consult_fallback(slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
    if slots.is_empty() {
        vec![TimeSlot::consult()]
    } else {
        slots
    }
}

/// Decode the escapes a JS double-quoted string literal can carry.
fn unescape_js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
