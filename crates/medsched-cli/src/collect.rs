//! `collect` and `sources` command handlers.
//!
//! Sources run one after another. A source whose first listing page is
//! unreachable is logged and skipped so the others still produce output.

use std::path::Path;

use medsched_core::{AppConfig, SourceConfig, SourcesFile};
use medsched_scraper::{adapter_for, run, HttpFetcher};

use crate::sink::{self, OutputFormat};

/// Resolve the sources a run should cover.
///
/// `Some(name)` must match a configured source exactly.
pub(crate) fn select_sources<'a>(
    sources: &'a SourcesFile,
    source_filter: Option<&str>,
) -> anyhow::Result<Vec<&'a SourceConfig>> {
    match source_filter {
        Some(name) => {
            let source = sources
                .find(name)
                .ok_or_else(|| anyhow::anyhow!("source '{name}' not found in sources file"))?;
            Ok(vec![source])
        }
        None => Ok(sources.sources.iter().collect()),
    }
}

pub(crate) fn print_sources(sources: &SourcesFile) {
    if sources.sources.is_empty() {
        println!("no sources configured");
        return;
    }
    for source in &sources.sources {
        println!(
            "{:<24} {:<13} {:<28} {}",
            source.name,
            source.kind.to_string(),
            source.clinic_name,
            source.first_page_url
        );
    }
}

/// Listing URLs a dry run reports for one source.
pub(crate) fn planned_page_urls(source: &SourceConfig) -> Vec<String> {
    match source.max_pages {
        Some(max_pages) => (1..=max_pages).map(|page| source.page_url(page)).collect(),
        None => vec![source.page_url(1), source.page_url_template.clone()],
    }
}

/// Run every selected source and write one output file per source.
///
/// # Errors
///
/// Returns an error if the source filter matches nothing, an output file
/// cannot be written, or every selected source failed.
pub(crate) async fn run_collect(
    config: &AppConfig,
    sources: &SourcesFile,
    source_filter: Option<&str>,
    format: OutputFormat,
    output_dir: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let selected = select_sources(sources, source_filter)?;

    if dry_run {
        for source in &selected {
            println!("dry-run: {} ({})", source.name, source.kind);
            for url in planned_page_urls(source) {
                println!("  {url}");
            }
        }
        return Ok(());
    }

    let run_date = chrono::Local::now().date_naive();
    let mut failed = 0usize;

    for source in &selected {
        let accept_invalid_certs = source
            .staff_portal
            .as_ref()
            .is_some_and(|portal| portal.accept_invalid_certs);
        let fetcher = HttpFetcher::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.inter_request_delay_ms,
            accept_invalid_certs,
        )
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        let adapter = adapter_for((*source).clone())?;

        let report = match run(adapter.as_ref(), &fetcher, run_date).await {
            Ok(report) => report,
            Err(e) => {
                failed += 1;
                tracing::error!(source = %source.name, error = %e, "source run failed");
                eprintln!("error: {}: {e}", source.name);
                continue;
            }
        };

        let path = sink::write_records(output_dir, &source.name, &report.records, format)?;
        println!(
            "{}: {} records from {} doctors over {} pages \
             ({} cards skipped, {} degraded, {} unscheduled, {} consult-only sites) -> {}",
            report.source,
            report.records.len(),
            report.doctors,
            report.pages_visited,
            report.skipped_cards,
            report.degraded_doctors,
            report.unscheduled_doctors,
            report.consult_locations,
            path.display()
        );
    }

    if !selected.is_empty() && failed == selected.len() {
        anyhow::bail!("all {failed} selected sources failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medsched_core::{NameCase, SourceKind};

    fn source(name: &str, max_pages: Option<u32>) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            kind: SourceKind::PostGrid,
            clinic_name: "Clínica Anglo Americana".to_string(),
            first_page_url: "https://clinic.test/medicos/".to_string(),
            page_url_template: "https://clinic.test/medicos/page/{page}/".to_string(),
            booking_url: None,
            name_case: NameCase::Lower,
            biography_max_len: 200,
            unknown_address: "Dirección no especificada".to_string(),
            sites: Vec::new(),
            max_pages,
            staff_portal: None,
        }
    }

    fn sources_file() -> SourcesFile {
        SourcesFile {
            sources: vec![source("anglo-americana", None), source("otra", Some(2))],
        }
    }

    #[test]
    fn select_sources_without_filter_returns_all() {
        let file = sources_file();
        let selected = select_sources(&file, None).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_sources_by_name() {
        let file = sources_file();
        let selected = select_sources(&file, Some("otra")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "otra");
    }

    #[test]
    fn select_sources_unknown_name_fails() {
        let file = sources_file();
        let err = select_sources(&file, Some("missing")).unwrap_err();
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn planned_pages_follow_page_cap() {
        assert_eq!(
            planned_page_urls(&source("otra", Some(2))),
            vec![
                "https://clinic.test/medicos/".to_string(),
                "https://clinic.test/medicos/page/2/".to_string(),
            ]
        );
    }

    #[test]
    fn planned_pages_without_cap_show_template() {
        let urls = planned_page_urls(&source("anglo-americana", None));
        assert_eq!(urls[1], "https://clinic.test/medicos/page/{page}/");
    }
}
