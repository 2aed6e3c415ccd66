//! Small helpers over `scraper` shared by the listing and detail extractors.

use scraper::{ElementRef, Selector};

/// Parse a selector literal. Only used with compile-time constant selectors.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

/// All descendant text of `element`, text nodes joined by a single space and
/// whitespace collapsed.
///
/// Adjacent nodes are always separated, so `<b>Dr</b>. Ana` reads `Dr . Ana`.
/// This keeps `CV<br>CMP` from fusing into one word.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match of `selector` under `element`, or empty.
pub(crate) fn first_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Attribute of the first match of `selector` under `element`, trimmed.
pub(crate) fn first_attr(
    element: ElementRef<'_>,
    selector: &Selector,
    attr: &str,
) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
