//! Listing → detail → flat record driver.
//!
//! One run walks a single source sequentially: listing page, then every
//! doctor's detail resource(s), then the next page. Only the first listing
//! page is load-bearing; every later failure degrades the output instead of
//! aborting it.

use chrono::NaiveDate;
use medsched_core::{
    AttentionType, DoctorProfile, DoctorSummary, OutputRecord, SourceConfig, TimeSlot,
};

use crate::adapter::{DetailPayload, DetailRequests, SourceAdapter};
use crate::error::PipelineError;
use crate::fetch::{FetchRequest, PageFetcher};
use crate::normalize::derive_slug;

/// Per-run values stamped on every record of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    pub clinic_name: String,
    /// Fixed booking URL; the doctor's profile URL is used when `None`.
    pub booking_url: Option<String>,
    /// Run date as `YYYY-MM-DD`.
    pub extraction_date: String,
}

impl RecordContext {
    #[must_use]
    pub fn for_source(config: &SourceConfig, run_date: NaiveDate) -> Self {
        Self {
            clinic_name: config.clinic_name.clone(),
            booking_url: config.booking_url.clone(),
            extraction_date: run_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Result of one source run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub source: String,
    /// Listing pages fetched successfully, including the terminating empty one.
    pub pages_visited: u32,
    pub doctors: usize,
    /// Listing cards dropped for lack of a stable identifier or structure.
    pub skipped_cards: usize,
    /// Doctors with at least one failed detail fetch.
    pub degraded_doctors: usize,
    /// Doctors emitted as a single placeholder row for lack of any location.
    pub unscheduled_doctors: usize,
    /// Locations whose hours could not be read and carry the consult slot.
    pub consult_locations: usize,
    pub records: Vec<OutputRecord>,
}

/// Explode one doctor into output rows: one per (location, slot), or a
/// single placeholder row when no location was recovered.
#[must_use]
pub fn flatten(
    ctx: &RecordContext,
    summary: &DoctorSummary,
    profile: &DoctorProfile,
) -> Vec<OutputRecord> {
    let attention = AttentionType::default();
    let credential_code = if profile.credential_code.is_empty() {
        summary.credential_hint.clone()
    } else {
        profile.credential_code.clone()
    };
    let booking_url = ctx
        .booking_url
        .as_deref()
        .or_else(|| summary.detail_reference.url())
        .unwrap_or_default()
        .to_string();

    let base = OutputRecord {
        clinic_name: ctx.clinic_name.clone(),
        full_name: summary.display_name.clone(),
        credential_code,
        secondary_credential_code: profile.secondary_credential_code.clone(),
        source_doctor_id: summary.source_id.clone(),
        active: true,
        biography: profile.biography.clone(),
        image_url: summary.image_url.clone(),
        booking_url,
        specialty_slug: derive_slug(&summary.specialty),
        specialty: summary.specialty.clone(),
        description_card: format!("Médico especialista en {}", summary.specialty),
        site_slug: String::new(),
        site_title: String::new(),
        site_address: String::new(),
        district: String::new(),
        attention_type_slug: attention.slug().to_string(),
        attention_type_title: attention.title().to_string(),
        day: String::new(),
        start_time: String::new(),
        end_time: String::new(),
        extraction_date: ctx.extraction_date.clone(),
    };

    let records: Vec<OutputRecord> = profile
        .locations
        .iter()
        .flat_map(|location| {
            location.slots.iter().map(|slot| OutputRecord {
                site_slug: location.site_slug.clone(),
                site_title: location.site_title.clone(),
                site_address: location.address.clone(),
                district: location.district.clone(),
                day: slot.day.clone(),
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
                ..base.clone()
            })
        })
        .collect();

    if records.is_empty() {
        vec![base]
    } else {
        records
    }
}

/// Run one source to completion.
///
/// Pagination stops at the first page without cards, at the first listing
/// page that cannot be fetched after page 1, or at the source's `max_pages`.
///
/// # Errors
///
/// Returns [`PipelineError::FirstPageUnreachable`] when page 1 cannot be
/// fetched. Nothing else is fatal.
pub async fn run(
    adapter: &dyn SourceAdapter,
    fetcher: &dyn PageFetcher,
    run_date: NaiveDate,
) -> Result<RunReport, PipelineError> {
    let config = adapter.config();
    let ctx = RecordContext::for_source(config, run_date);
    let mut report = RunReport {
        source: config.name.clone(),
        ..RunReport::default()
    };

    let mut page: u32 = 1;
    loop {
        if let Some(max_pages) = config.max_pages {
            if page > max_pages {
                tracing::warn!(
                    source = %config.name,
                    max_pages,
                    "page cap reached; stopping pagination"
                );
                break;
            }
        }

        let url = adapter.page_url(page);
        let markup = match fetcher.fetch(&FetchRequest::new(url.as_str())).await {
            Ok(markup) => markup,
            Err(source) if page == 1 => {
                return Err(PipelineError::FirstPageUnreachable { url, source });
            }
            Err(e) => {
                tracing::warn!(
                    source = %config.name,
                    page,
                    url = %url,
                    error = %e,
                    "listing page unreachable; stopping pagination"
                );
                break;
            }
        };
        report.pages_visited += 1;

        let listing = adapter.extract_page(&markup);
        if listing.is_end() {
            tracing::info!(source = %config.name, page, "no cards on page; pagination complete");
            break;
        }
        tracing::info!(
            source = %config.name,
            page,
            cards = listing.cards_seen,
            doctors = listing.summaries.len(),
            "listing page extracted"
        );

        for rejected in &listing.rejected {
            tracing::warn!(source = %config.name, page, error = %rejected, "listing card skipped");
        }
        report.skipped_cards += listing.rejected.len();

        for summary in &listing.summaries {
            let (payload, degraded) =
                fetch_detail(fetcher, adapter.detail_requests(summary), summary).await;
            if degraded {
                report.degraded_doctors += 1;
            }

            let profile = adapter.extract_detail(&payload, summary);
            if !profile.has_schedule() {
                report.unscheduled_doctors += 1;
            }
            report.consult_locations += profile
                .locations
                .iter()
                .filter(|location| location.slots.iter().all(TimeSlot::is_consult))
                .count();
            tracing::debug!(
                source = %config.name,
                doctor_id = %summary.source_id,
                locations = profile.locations.len(),
                "doctor extracted"
            );
            report.records.extend(flatten(&ctx, summary, &profile));
            report.doctors += 1;
        }

        page += 1;
    }

    tracing::info!(
        source = %report.source,
        pages = report.pages_visited,
        doctors = report.doctors,
        skipped_cards = report.skipped_cards,
        degraded_doctors = report.degraded_doctors,
        unscheduled_doctors = report.unscheduled_doctors,
        consult_locations = report.consult_locations,
        records = report.records.len(),
        "source run complete"
    );
    Ok(report)
}

/// Fetch whatever detail resources the adapter asked for. The flag is
/// `true` when at least one of them could not be retrieved.
async fn fetch_detail(
    fetcher: &dyn PageFetcher,
    requests: Option<DetailRequests>,
    summary: &DoctorSummary,
) -> (DetailPayload, bool) {
    match requests {
        None => {
            tracing::warn!(
                doctor_id = %summary.source_id,
                "doctor has no detail reference; emitting placeholder"
            );
            (DetailPayload::Unavailable, true)
        }
        Some(DetailRequests::Document(request)) => {
            match fetch_part(fetcher, &request, summary, "profile").await {
                Some(body) => (DetailPayload::Document(body), false),
                None => (DetailPayload::Unavailable, true),
            }
        }
        Some(DetailRequests::Split {
            biography,
            schedule,
        }) => {
            let biography = fetch_part(fetcher, &biography, summary, "biography").await;
            let schedule = fetch_part(fetcher, &schedule, summary, "schedule").await;
            let degraded = biography.is_none() || schedule.is_none();
            (
                DetailPayload::Split {
                    biography,
                    schedule,
                },
                degraded,
            )
        }
    }
}

async fn fetch_part(
    fetcher: &dyn PageFetcher,
    request: &FetchRequest,
    summary: &DoctorSummary,
    part: &'static str,
) -> Option<String> {
    match fetcher.fetch(request).await {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::warn!(
                doctor_id = %summary.source_id,
                doctor = %summary.display_name,
                part,
                url = %request.url,
                error = %e,
                "detail fetch failed"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
