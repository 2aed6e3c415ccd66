use thiserror::Error;

/// A page or fragment could not be retrieved. The pipeline does not look
/// past this distinction: every variant means "could not retrieve".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },
}

/// A listing card that cannot become a [`medsched_core::DoctorSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("listing card {position} ({name}) has no stable identifier")]
    MissingIdentifier { position: usize, name: String },

    #[error("listing card {position} is missing its {part}")]
    MalformedCard { position: usize, part: &'static str },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("first listing page {url} is unreachable: {source}")]
    FirstPageUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("source '{source_name}' is misconfigured: {reason}")]
    InvalidSource { source_name: String, reason: String },
}
