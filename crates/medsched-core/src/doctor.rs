//! Doctor directory domain types shared by every source.
//!
//! The nested shape (`DoctorProfile` → `LocationSchedule` → `TimeSlot`) is what
//! extractors produce; `OutputRecord` is the flat row handed to the sink.

use serde::{Deserialize, Serialize};

/// Day value for a location whose schedule could not be parsed into slots.
pub const CONSULT_DAY: &str = "CONSULT";

/// Day value for a schedule cell whose identifier is not in the day table.
pub const UNKNOWN_DAY: &str = "UNKNOWN";

/// How the detail resource(s) for a doctor are located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailReference {
    /// A single profile page.
    Url(String),
    /// Named parameters the source plugs into its detail endpoints.
    Params(Vec<(String, String)>),
}

impl DetailReference {
    /// Look up a named parameter. Always `None` for [`DetailReference::Url`].
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        match self {
            DetailReference::Url(_) => None,
            DetailReference::Params(params) => params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            DetailReference::Url(url) => Some(url.as_str()),
            DetailReference::Params(_) => None,
        }
    }
}

/// Stub for one doctor discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSummary {
    /// Source-assigned identifier; opaque, not necessarily numeric.
    pub source_id: String,
    /// Name with the source's casing convention already applied.
    pub display_name: String,
    pub specialty: String,
    /// Absolute image URL, or empty.
    pub image_url: String,
    pub detail_reference: DetailReference,
    /// Credential code printed on the listing card, or empty.
    pub credential_hint: String,
}

/// Enriched record for one doctor, built from its detail payload(s).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub credential_code: String,
    pub secondary_credential_code: String,
    pub biography: String,
    /// Empty when nothing could be recovered; the pipeline then emits a
    /// single placeholder record for the doctor.
    pub locations: Vec<LocationSchedule>,
}

impl DoctorProfile {
    /// Profile for a doctor whose detail payload could not be retrieved.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_schedule(&self) -> bool {
        !self.locations.is_empty()
    }
}

/// One physical site for one doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSchedule {
    pub site_title: String,
    pub site_slug: String,
    pub address: String,
    pub district: String,
    pub slots: Vec<TimeSlot>,
}

/// A weekly availability window.
///
/// `day` is a canonical weekday name, [`CONSULT_DAY`], [`UNKNOWN_DAY`], or an
/// unrecognized source token kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl TimeSlot {
    #[must_use]
    pub fn new(
        day: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            day: day.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// The "ask the clinic" slot used when a location has no parseable hours.
    #[must_use]
    pub fn consult() -> Self {
        Self::new(CONSULT_DAY, "", "")
    }

    #[must_use]
    pub fn is_consult(&self) -> bool {
        self.day == CONSULT_DAY
    }
}

/// How the patient is seen. Every current source is in-person only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionType {
    #[default]
    InPerson,
}

impl AttentionType {
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            AttentionType::InPerson => "presencial",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            AttentionType::InPerson => "Presencial",
        }
    }
}

/// One flat row of the output table.
///
/// Serialized keys are the ones the downstream loaders already consume,
/// including the `sede_adress` spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    #[serde(rename = "clinica")]
    pub clinic_name: String,
    #[serde(rename = "nombre_completo")]
    pub full_name: String,
    #[serde(rename = "cmp")]
    pub credential_code: String,
    #[serde(rename = "rne")]
    pub secondary_credential_code: String,
    #[serde(rename = "codigo_medico")]
    pub source_doctor_id: String,
    #[serde(rename = "activo")]
    pub active: bool,
    #[serde(rename = "experiencia")]
    pub biography: String,
    #[serde(rename = "url_imagen")]
    pub image_url: String,
    #[serde(rename = "url_cita")]
    pub booking_url: String,
    #[serde(rename = "especialidad_slug")]
    pub specialty_slug: String,
    #[serde(rename = "especialidad")]
    pub specialty: String,
    pub description_card: String,
    #[serde(rename = "sede_slug")]
    pub site_slug: String,
    #[serde(rename = "sede_title")]
    pub site_title: String,
    #[serde(rename = "sede_adress")]
    pub site_address: String,
    #[serde(rename = "distrito")]
    pub district: String,
    #[serde(rename = "tipo_atencion_slug")]
    pub attention_type_slug: String,
    #[serde(rename = "tipo_atencion_title")]
    pub attention_type_title: String,
    #[serde(rename = "dia")]
    pub day: String,
    #[serde(rename = "hora_inicio")]
    pub start_time: String,
    #[serde(rename = "hora_fin")]
    pub end_time: String,
    #[serde(rename = "fecha_scraping")]
    pub extraction_date: String,
}

impl OutputRecord {
    /// `true` for the single row emitted for a doctor without any location.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.site_title.is_empty() && self.day.is_empty()
    }
}
