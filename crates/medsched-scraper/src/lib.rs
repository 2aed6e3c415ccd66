pub mod adapter;
pub mod error;
pub mod fetch;
mod html;
pub mod normalize;
pub mod pipeline;
pub mod schedule;

pub use adapter::{
    adapter_for, DetailPayload, DetailRequests, ListingPage, PostGridSource, SourceAdapter,
    StaffPortalSource,
};
pub use error::{ExtractError, FetchError, PipelineError};
pub use fetch::{FetchRequest, HttpFetcher, PageFetcher};
pub use pipeline::{flatten, run, RecordContext, RunReport};
