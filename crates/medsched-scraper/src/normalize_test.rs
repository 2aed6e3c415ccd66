use super::*;

// -----------------------------------------------------------------------
// extract_code
// -----------------------------------------------------------------------

#[test]
fn extract_code_with_colon() {
    assert_eq!(extract_code("CV CMP: 45678 RNE: 1234", "CMP"), "45678");
}

#[test]
fn extract_code_without_colon_or_space() {
    assert_eq!(extract_code("Colegiatura CMP45678", "CMP"), "45678");
}

#[test]
fn extract_code_is_case_insensitive() {
    assert_eq!(extract_code("rne 998", "RNE"), "998");
}

#[test]
fn extract_code_absent_label_is_empty() {
    assert_eq!(extract_code("Médico cirujano", "CMP"), "");
}

#[test]
fn extract_code_label_without_digits_is_empty() {
    assert_eq!(extract_code("CMP: en trámite", "CMP"), "");
}

#[test]
fn extract_code_empty_label_is_empty() {
    assert_eq!(extract_code("CMP 123", "  "), "");
}

#[test]
fn first_digit_run_finds_leading_number() {
    assert_eq!(first_digit_run("RNE 00321 (Cardiología)"), "00321");
    assert_eq!(first_digit_run("sin registro"), "");
}

// -----------------------------------------------------------------------
// derive_slug / collapse_whitespace / truncate
// -----------------------------------------------------------------------

#[test]
fn derive_slug_simple() {
    assert_eq!(derive_slug("La Molina"), "la-molina");
}

#[test]
fn derive_slug_collapses_whitespace_runs() {
    assert_eq!(
        derive_slug("  Medicina   Interna\t General "),
        "medicina-interna-general"
    );
}

#[test]
fn derive_slug_keeps_accents() {
    assert_eq!(
        derive_slug("Cardiología Pediátrica"),
        "cardiología-pediátrica"
    );
}

#[test]
fn derive_slug_empty_input() {
    assert_eq!(derive_slug("   "), "");
}

#[test]
fn collapse_whitespace_normalizes_interior_runs() {
    assert_eq!(
        collapse_whitespace("  Dr.\n  Ana \t Torres  "),
        "Dr. Ana Torres"
    );
}

#[test]
fn truncate_within_bound_is_unchanged() {
    assert_eq!(truncate("Pediatría", 10), "Pediatría");
}

#[test]
fn truncate_exactly_at_bound_is_unchanged() {
    assert_eq!(truncate("0123456789", 10), "0123456789");
}

#[test]
fn truncate_over_bound_appends_ellipsis() {
    let out = truncate("Especialista en cirugía", 10);
    assert_eq!(out, "Especialis...");
    assert_eq!(out.chars().count(), 13);
}

#[test]
fn truncate_counts_characters_not_bytes() {
    assert_eq!(truncate("áéíóúñ", 3), "áéí...");
}

// -----------------------------------------------------------------------
// casing
// -----------------------------------------------------------------------

#[test]
fn title_case_uppercase_name() {
    assert_eq!(title_case("JUAN PÉREZ GARCÍA"), "Juan Pérez García");
}

#[test]
fn title_case_hyphen_and_apostrophe() {
    assert_eq!(
        title_case("maría garcía-lópez o'brien"),
        "María García-López O'Brien"
    );
}

#[test]
fn apply_name_case_lower() {
    assert_eq!(
        apply_name_case("  Ana  María TORRES ", NameCase::Lower),
        "ana maría torres"
    );
}

#[test]
fn apply_name_case_as_is_only_collapses() {
    assert_eq!(
        apply_name_case("Ana   TORRES", NameCase::AsIs),
        "Ana TORRES"
    );
}

// -----------------------------------------------------------------------
// Weekday
// -----------------------------------------------------------------------

#[test]
fn weekday_from_abbreviation() {
    assert_eq!(Weekday::from_token("LU"), Some(Weekday::Monday));
    assert_eq!(Weekday::from_token(" mi "), Some(Weekday::Wednesday));
    assert_eq!(Weekday::from_token("DO"), Some(Weekday::Sunday));
}

#[test]
fn weekday_from_full_name_with_or_without_accent() {
    assert_eq!(Weekday::from_token("Miércoles"), Some(Weekday::Wednesday));
    assert_eq!(Weekday::from_token("SABADO"), Some(Weekday::Saturday));
}

#[test]
fn weekday_unknown_token() {
    assert_eq!(Weekday::from_token("FE"), None);
    assert_eq!(Weekday::from_token(""), None);
}

#[test]
fn weekday_from_cell_letter() {
    assert_eq!(Weekday::from_cell_letter('X'), Some(Weekday::Wednesday));
    assert_eq!(Weekday::from_cell_letter('m'), Some(Weekday::Tuesday));
    assert_eq!(Weekday::from_cell_letter('Q'), None);
}

#[test]
fn weekday_names_are_accented() {
    assert_eq!(Weekday::Wednesday.name(), "Miércoles");
    assert_eq!(Weekday::Saturday.name(), "Sábado");
}

// -----------------------------------------------------------------------
// strip_label_tokens
// -----------------------------------------------------------------------

#[test]
fn strip_label_tokens_removes_labels_and_codes() {
    let text = "CV CMP: 45678 RNE: 1234 Médico cirujano por la UNMSM.";
    assert_eq!(
        strip_label_tokens(text, &["CV", "CMP", "RNE"], &["45678", "1234"]),
        "Médico cirujano por la UNMSM."
    );
}

#[test]
fn strip_label_tokens_keeps_words_containing_labels() {
    let text = "CVC y CMPX no son etiquetas";
    assert_eq!(
        strip_label_tokens(text, &["CV", "CMP"], &[]),
        "CVC y CMPX no son etiquetas"
    );
}

#[test]
fn strip_label_tokens_ignores_empty_codes() {
    assert_eq!(
        strip_label_tokens("CMP: Pediatra con 10 años", &["CMP"], &["", " "]),
        "Pediatra con 10 años"
    );
}
