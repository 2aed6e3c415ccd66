//! Per-source static configuration loaded from `sources.yaml`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const PAGE_PLACEHOLDER: &str = "{page}";

fn default_unknown_address() -> String {
    "Dirección no especificada".to_string()
}

fn default_biography_max_len() -> usize {
    200
}

/// Which markup family a source publishes; selects the extraction adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `WordPress` post grid listing with one server-rendered profile page per doctor.
    PostGrid,
    /// Staff portal listing with separate CV and schedule script endpoints.
    StaffPortal,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::PostGrid => write!(f, "post_grid"),
            SourceKind::StaffPortal => write!(f, "staff_portal"),
        }
    }
}

/// Casing convention applied to doctor names and specialties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    Lower,
    Title,
    #[default]
    AsIs,
}

/// A known physical site and the names it appears under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    /// Fixed slug; derived from the site heading when absent.
    #[serde(default)]
    pub slug: Option<String>,
    pub address: String,
    pub district: String,
    /// Case-insensitive substrings that identify this site in a heading.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl SiteConfig {
    fn matches(&self, heading: &str) -> bool {
        let heading = heading.to_lowercase();
        if heading.is_empty() {
            return false;
        }
        std::iter::once(&self.title)
            .chain(self.aliases.iter())
            .map(|alias| alias.trim().to_lowercase())
            .any(|alias| !alias.is_empty() && heading.contains(&alias))
    }
}

/// Extra endpoints for [`SourceKind::StaffPortal`] sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffPortalConfig {
    /// Directory holding the CV and schedule scripts, with trailing slash.
    pub detail_base_url: String,
    /// Prefix for relative photo paths found on listing cards.
    pub image_base_url: String,
    /// Branch code the portal expects in `b_sede`.
    pub site_code: String,
    pub cv_path: String,
    pub schedule_path: String,
    /// The portal has served an expired certificate; opt-in only.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub clinic_name: String,
    pub first_page_url: String,
    /// Listing URL for pages 2.. with a `{page}` placeholder.
    pub page_url_template: String,
    /// Fixed booking URL; each doctor's profile URL is used when absent.
    #[serde(default)]
    pub booking_url: Option<String>,
    #[serde(default)]
    pub name_case: NameCase,
    #[serde(default = "default_biography_max_len")]
    pub biography_max_len: usize,
    #[serde(default = "default_unknown_address")]
    pub unknown_address: String,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    /// Optional cap on listing pages; pagination is otherwise open-ended.
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default)]
    pub staff_portal: Option<StaffPortalConfig>,
}

impl SourceConfig {
    /// Listing URL for a 1-based page number.
    #[must_use]
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.first_page_url.clone()
        } else {
            self.page_url_template
                .replace(PAGE_PLACEHOLDER, &page.to_string())
        }
    }

    /// First configured site whose title or alias occurs in `heading`,
    /// compared case-insensitively. Configuration order is priority order.
    #[must_use]
    pub fn resolve_site(&self, heading: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|site| site.matches(heading))
    }

    /// Address and district for a site heading, falling back to the
    /// configured "not specified" address and an empty district.
    #[must_use]
    pub fn site_address(&self, heading: &str) -> (String, String) {
        self.resolve_site(heading).map_or_else(
            || (self.unknown_address.clone(), String::new()),
            |site| (site.address.clone(), site.district.clone()),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// Load and validate the source definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        if !source.page_url_template.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "source '{}' page_url_template has no {PAGE_PLACEHOLDER} placeholder",
                source.name
            )));
        }

        if source.biography_max_len == 0 {
            return Err(ConfigError::Validation(format!(
                "source '{}' biography_max_len must be greater than zero",
                source.name
            )));
        }

        if source.max_pages == Some(0) {
            return Err(ConfigError::Validation(format!(
                "source '{}' max_pages must be greater than zero when set",
                source.name
            )));
        }

        if source.kind == SourceKind::StaffPortal {
            if source.staff_portal.is_none() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' is a staff_portal source but has no staff_portal section",
                    source.name
                )));
            }
            if source.sites.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' is a staff_portal source and needs its site in `sites`",
                    source.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
