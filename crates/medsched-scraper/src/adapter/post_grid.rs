//! `WordPress` post grid listings with one server-rendered profile per doctor.
//!
//! Listing cards are `div.fl-post-grid-post` blocks carrying the post id as
//! a `post-<id>` class. Profile pages hold the biography in
//! `div#cv-ficha` and the schedule as a flat run of site headings
//! (`single-horarios`) and labeled day rows (`row-underline`).

use std::sync::LazyLock;

use medsched_core::{DetailReference, DoctorProfile, DoctorSummary, LocationSchedule, SourceConfig};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{
    build_location, DetailPayload, DetailRequests, ListingPage, SourceAdapter, DEFAULT_SITE_TITLE,
};
use crate::error::ExtractError;
use crate::fetch::FetchRequest;
use crate::html::{element_text, first_attr, first_text, has_class, selector};
use crate::normalize::{
    apply_name_case, collapse_whitespace, extract_code, strip_label_tokens, truncate,
};
use crate::schedule::{decode_labeled_rows, is_schedule_label};

const DEFAULT_SPECIALTY: &str = "General";
const HEADING_CLASS: &str = "single-horarios";
const ROW_CLASS: &str = "row-underline";
const BIOGRAPHY_LABELS: [&str; 3] = ["CV", "CMP", "RNE"];
const POST_CLASS_PREFIX: &str = "post-";
/// Layout class that shares the post id prefix.
const GRID_POST_CLASS: &str = "post-grid-post";

static CARD: LazyLock<Selector> = LazyLock::new(|| selector("div.fl-post-grid-post"));
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("h2.fl-post-title a"));
static SPECIALTY: LazyLock<Selector> = LazyLock::new(|| selector("div.xterms"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("div.fl-post-image img"));
static BIOGRAPHY: LazyLock<Selector> = LazyLock::new(|| selector("div#cv-ficha"));
static CONTENT: LazyLock<Selector> = LazyLock::new(|| selector("div.entry-content"));
static SCHEDULE_ROWS: LazyLock<Selector> =
    LazyLock::new(|| selector("div.single-horarios, div.row-underline"));
static ROW_LABEL: LazyLock<Selector> = LazyLock::new(|| selector("div.col-md-5"));
static ROW_VALUE: LazyLock<Selector> = LazyLock::new(|| selector("div.col-md-7"));

static HEADING_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhorarios?\b").expect("valid regex"));

pub struct PostGridSource {
    config: SourceConfig,
}

impl PostGridSource {
    #[must_use]
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn extract_card(
        &self,
        card: ElementRef<'_>,
        position: usize,
    ) -> Result<DoctorSummary, ExtractError> {
        let link = card
            .select(&TITLE_LINK)
            .next()
            .ok_or(ExtractError::MalformedCard {
                position,
                part: "title link",
            })?;
        let display_name = apply_name_case(&element_text(link), self.config.name_case);

        let profile_url = link
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(ExtractError::MalformedCard {
                position,
                part: "profile link",
            })?;

        let source_id = post_id(card).ok_or_else(|| ExtractError::MissingIdentifier {
            position,
            name: display_name.clone(),
        })?;

        let specialty = match first_text(card, &SPECIALTY) {
            s if s.is_empty() => DEFAULT_SPECIALTY.to_string(),
            s => s,
        };

        Ok(DoctorSummary {
            source_id,
            display_name,
            specialty,
            image_url: first_attr(card, &IMAGE, "src").unwrap_or_default(),
            detail_reference: DetailReference::Url(profile_url.to_string()),
            credential_hint: String::new(),
        })
    }

    fn extract_locations(&self, document: &Html) -> Vec<LocationSchedule> {
        let Some(content) = document.select(&CONTENT).next() else {
            return Vec::new();
        };

        // (heading, rows) in document order; rows before the first heading
        // open an implicit default segment.
        let mut segments: Vec<(String, Vec<(String, String)>)> = Vec::new();
        for row in content.select(&SCHEDULE_ROWS) {
            if has_class(row, HEADING_CLASS) {
                segments.push((site_heading(row), Vec::new()));
            } else if has_class(row, ROW_CLASS) {
                let (Some(label), Some(value)) =
                    (row.select(&ROW_LABEL).next(), row.select(&ROW_VALUE).next())
                else {
                    continue;
                };
                let label = element_text(label);
                if !is_schedule_label(&label) {
                    continue;
                }
                if segments.is_empty() {
                    segments.push((DEFAULT_SITE_TITLE.to_string(), Vec::new()));
                }
                if let Some((_, rows)) = segments.last_mut() {
                    rows.push((label, element_text(value)));
                }
            }
        }

        segments
            .into_iter()
            .map(|(heading, rows)| {
                let slots = decode_labeled_rows(rows.iter().map(|(l, v)| (l.as_str(), v.as_str())));
                build_location(&self.config, &heading, slots)
            })
            .collect()
    }
}

impl SourceAdapter for PostGridSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn extract_page(&self, markup: &str) -> ListingPage {
        let document = Html::parse_document(markup);
        let mut page = ListingPage::default();

        for (index, card) in document.select(&CARD).enumerate() {
            page.cards_seen += 1;
            match self.extract_card(card, index + 1) {
                Ok(summary) => page.summaries.push(summary),
                Err(err) => page.rejected.push(err),
            }
        }

        page
    }

    fn detail_requests(&self, summary: &DoctorSummary) -> Option<DetailRequests> {
        summary
            .detail_reference
            .url()
            .map(|url| DetailRequests::Document(FetchRequest::new(url)))
    }

    fn extract_detail(&self, payload: &DetailPayload, _summary: &DoctorSummary) -> DoctorProfile {
        let DetailPayload::Document(markup) = payload else {
            return DoctorProfile::unavailable();
        };
        let document = Html::parse_document(markup);

        let mut profile = DoctorProfile::default();
        if let Some(block) = document.select(&BIOGRAPHY).next() {
            let text = element_text(block);
            profile.credential_code = extract_code(&text, "CMP");
            profile.secondary_credential_code = extract_code(&text, "RNE");
            let biography = strip_label_tokens(
                &text,
                &BIOGRAPHY_LABELS,
                &[
                    profile.credential_code.as_str(),
                    profile.secondary_credential_code.as_str(),
                ],
            );
            profile.biography = truncate(&biography, self.config.biography_max_len);
        }
        profile.locations = self.extract_locations(&document);
        profile
    }
}

/// Value of the first `post-<id>` class; the id may be non-numeric.
fn post_id(card: ElementRef<'_>) -> Option<String> {
    card.value()
        .classes()
        .filter(|class| *class != GRID_POST_CLASS)
        .find_map(|class| class.strip_prefix(POST_CLASS_PREFIX))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Heading text without the "Horarios" caption; the default site when
/// nothing is left.
fn site_heading(row: ElementRef<'_>) -> String {
    let raw = element_text(row);
    let text = HEADING_WORD_RE.replace_all(&raw, " ");
    match collapse_whitespace(&text) {
        heading if heading.is_empty() => DEFAULT_SITE_TITLE.to_string(),
        heading => heading,
    }
}
