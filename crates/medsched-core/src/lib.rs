pub mod app_config;
pub mod config;
pub mod doctor;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use doctor::{
    AttentionType, DetailReference, DoctorProfile, DoctorSummary, LocationSchedule, OutputRecord,
    TimeSlot, CONSULT_DAY, UNKNOWN_DAY,
};
pub use sources::{
    load_sources, NameCase, SiteConfig, SourceConfig, SourceKind, SourcesFile, StaffPortalConfig,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
