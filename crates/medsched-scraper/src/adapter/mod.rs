//! Source adapters.
//!
//! Each markup family (`post_grid`, `staff_portal`) implements
//! [`SourceAdapter`]; the pipeline is written once against the trait and
//! never looks at markup itself. Adapters are synchronous and pure: every
//! network round-trip goes through the pipeline's [`crate::PageFetcher`].

mod post_grid;
mod staff_portal;

pub use post_grid::PostGridSource;
pub use staff_portal::StaffPortalSource;

use medsched_core::{
    DoctorProfile, DoctorSummary, LocationSchedule, SourceConfig, SourceKind, TimeSlot,
};

use crate::error::{ExtractError, PipelineError};
use crate::fetch::FetchRequest;
use crate::normalize::derive_slug;

/// Site title used for schedule rows that appear before any site heading.
pub const DEFAULT_SITE_TITLE: &str = "Sede Principal";

/// Outcome of extracting one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Card containers found on the page, valid or not.
    pub cards_seen: usize,
    pub summaries: Vec<DoctorSummary>,
    pub rejected: Vec<ExtractError>,
}

impl ListingPage {
    /// A page without any card ends pagination.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.cards_seen == 0
    }
}

/// Resources to fetch for one doctor's detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailRequests {
    /// One server-rendered profile page.
    Document(FetchRequest),
    /// Separate biography and schedule fragments.
    Split {
        biography: FetchRequest,
        schedule: FetchRequest,
    },
}

/// What the pipeline managed to retrieve for [`DetailRequests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPayload {
    Unavailable,
    Document(String),
    /// Each part is `None` when its fetch failed.
    Split {
        biography: Option<String>,
        schedule: Option<String>,
    },
}

pub trait SourceAdapter: Send + Sync {
    fn config(&self) -> &SourceConfig;

    /// Listing URL for a 1-based page number.
    fn page_url(&self, page: u32) -> String {
        self.config().page_url(page)
    }

    fn extract_page(&self, markup: &str) -> ListingPage;

    /// `None` when the summary carries nothing to locate a detail resource.
    fn detail_requests(&self, summary: &DoctorSummary) -> Option<DetailRequests>;

    fn extract_detail(&self, payload: &DetailPayload, summary: &DoctorSummary) -> DoctorProfile;
}

/// Build the adapter for a source's markup family.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidSource`] when a `staff_portal` source has
/// no `staff_portal` section or no site.
pub fn adapter_for(config: SourceConfig) -> Result<Box<dyn SourceAdapter>, PipelineError> {
    match config.kind {
        SourceKind::PostGrid => Ok(Box::new(PostGridSource::new(config))),
        SourceKind::StaffPortal => Ok(Box::new(StaffPortalSource::new(config)?)),
    }
}

/// Attach configured address data to a site heading.
///
/// The heading is kept as the site title; the slug comes from the matched
/// site's fixed slug, else from the heading.
pub(crate) fn build_location(
    config: &SourceConfig,
    heading: &str,
    slots: Vec<TimeSlot>,
) -> LocationSchedule {
    let (address, district) = config.site_address(heading);
    let site_slug = config
        .resolve_site(heading)
        .and_then(|site| site.slug.clone())
        .unwrap_or_else(|| derive_slug(heading));

    LocationSchedule {
        site_title: heading.to_string(),
        site_slug,
        address,
        district,
        slots,
    }
}
