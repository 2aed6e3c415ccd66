//! Staff portal listings whose detail is split across a CV page and a
//! schedule script.
//!
//! Cards are `div.card` blocks; the doctor code only appears as the first
//! argument of a `ver_curriculo('<code>', ...)` button handler. The schedule
//! endpoint answers with `getElementById(..).innerHTML=` assignments, one
//! per filled weekday/shift cell, for the portal's single configured site.

use std::sync::LazyLock;

use medsched_core::{
    DetailReference, DoctorProfile, DoctorSummary, SiteConfig, SourceConfig, StaffPortalConfig,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{build_location, DetailPayload, DetailRequests, ListingPage, SourceAdapter};
use crate::error::{ExtractError, PipelineError};
use crate::fetch::FetchRequest;
use crate::html::{element_text, first_text, selector};
use crate::normalize::{apply_name_case, extract_code, first_digit_run, truncate};
use crate::schedule::decode_assignment_script;

const DEFAULT_SPECIALTY: &str = "General";
const UNKNOWN_NAME: &str = "Desconocido";
const CREDENTIAL_LABEL: &str = "CMP";
const CV_HANDLER: &str = "ver_curriculo";
/// Card spans shorter than this are badges, not specialties.
const MIN_SPECIALTY_LEN: usize = 4;

const PARAM_CODE: &str = "codigo";
const PARAM_CREDENTIAL: &str = "cmp";

static CARD: LazyLock<Selector> = LazyLock::new(|| selector("div.card"));
static CARD_BODY: LazyLock<Selector> = LazyLock::new(|| selector("div.card-body"));
static NAME: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static BUTTON: LazyLock<Selector> = LazyLock::new(|| selector("button[onclick]"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
static BIOGRAPHY: LazyLock<Selector> = LazyLock::new(|| selector("p#curriculo2"));
static SECONDARY_CREDENTIAL: LazyLock<Selector> = LazyLock::new(|| selector("span#rne"));

static QUOTED_ARG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").expect("valid regex"));

pub struct StaffPortalSource {
    config: SourceConfig,
    portal: StaffPortalConfig,
    site: SiteConfig,
}

impl StaffPortalSource {
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidSource`] when the `staff_portal`
    /// section or the site entry is missing.
    pub fn new(config: SourceConfig) -> Result<Self, PipelineError> {
        let portal = config
            .staff_portal
            .clone()
            .ok_or_else(|| PipelineError::InvalidSource {
                source_name: config.name.clone(),
                reason: "missing staff_portal section".to_string(),
            })?;
        let site = config
            .sites
            .first()
            .cloned()
            .ok_or_else(|| PipelineError::InvalidSource {
                source_name: config.name.clone(),
                reason: "staff portal sources need exactly one site".to_string(),
            })?;
        Ok(Self {
            config,
            portal,
            site,
        })
    }

    fn extract_card(
        &self,
        card: ElementRef<'_>,
        position: usize,
    ) -> Result<DoctorSummary, ExtractError> {
        let body = card
            .select(&CARD_BODY)
            .next()
            .ok_or(ExtractError::MalformedCard {
                position,
                part: "card body",
            })?;

        let display_name = match first_text(body, &NAME) {
            name if name.is_empty() => UNKNOWN_NAME.to_string(),
            name => apply_name_case(&name, self.config.name_case),
        };

        let mut credential_hint = String::new();
        let mut specialty = DEFAULT_SPECIALTY.to_string();
        for span in body.select(&SPAN) {
            let text = element_text(span);
            if text.contains(CREDENTIAL_LABEL) {
                credential_hint = first_digit_run(&text);
            } else if text.chars().count() >= MIN_SPECIALTY_LEN {
                specialty = apply_name_case(&text, self.config.name_case);
            }
        }

        let source_id = doctor_code(card).ok_or_else(|| ExtractError::MissingIdentifier {
            position,
            name: display_name.clone(),
        })?;

        Ok(DoctorSummary {
            detail_reference: DetailReference::Params(vec![
                (PARAM_CODE.to_string(), source_id.clone()),
                (PARAM_CREDENTIAL.to_string(), credential_hint.clone()),
            ]),
            source_id,
            display_name,
            specialty,
            image_url: self.image_url(card),
            credential_hint,
        })
    }

    fn image_url(&self, card: ElementRef<'_>) -> String {
        let Some(src) = card
            .select(&IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .find(|src| !src.is_empty())
        else {
            return String::new();
        };
        if src.starts_with("http://") || src.starts_with("https://") {
            src.to_string()
        } else {
            let path = src.trim_start_matches('/');
            format!("{}{path}", self.portal.image_base_url)
        }
    }

    fn biography_url(&self, code: &str, credential: &str) -> String {
        format!(
            "{}{}?codigo={code}&zona=curriculo&cmp={credential}&b_sede={}",
            self.portal.detail_base_url, self.portal.cv_path, self.portal.site_code
        )
    }

    fn schedule_url(&self, code: &str) -> String {
        format!(
            "{}{}?codigo={code}&zona=horario&b_sede={}",
            self.portal.detail_base_url, self.portal.schedule_path, self.portal.site_code
        )
    }
}

impl SourceAdapter for StaffPortalSource {
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
        let code = summary.detail_reference.param(PARAM_CODE)?;
        let credential = summary
            .detail_reference
            .param(PARAM_CREDENTIAL)
            .unwrap_or_default();

        let referer = self.config.first_page_url.clone();
        Some(DetailRequests::Split {
            biography: FetchRequest::new(self.biography_url(code, credential))
                .with_referer(referer.clone()),
            schedule: FetchRequest::new(self.schedule_url(code)).with_referer(referer),
        })
    }

    fn extract_detail(&self, payload: &DetailPayload, summary: &DoctorSummary) -> DoctorProfile {
        let DetailPayload::Split {
            biography,
            schedule,
        } = payload
        else {
            return DoctorProfile::unavailable();
        };

        let mut profile = DoctorProfile {
            credential_code: summary.credential_hint.clone(),
            ..DoctorProfile::default()
        };

        if let Some(markup) = biography {
            let document = Html::parse_document(markup);
            if let Some(block) = document.select(&BIOGRAPHY).next() {
                profile.biography = truncate(&element_text(block), self.config.biography_max_len);
            }
            if let Some(span) = document.select(&SECONDARY_CREDENTIAL).next() {
                profile.secondary_credential_code = first_digit_run(&element_text(span));
            }
            if profile.credential_code.is_empty() {
                profile.credential_code =
                    extract_code(&element_text(document.root_element()), CREDENTIAL_LABEL);
            }
        }

        if let Some(script) = schedule {
            let slots = decode_assignment_script(script);
            profile
                .locations
                .push(build_location(&self.config, &self.site.title, slots));
        }

        profile
    }
}

/// First quoted argument of the card's CV button handler.
fn doctor_code(card: ElementRef<'_>) -> Option<String> {
    card.select(&BUTTON)
        .filter_map(|button| button.value().attr("onclick"))
        .find(|handler| handler.contains(CV_HANDLER))
        .and_then(|handler| QUOTED_ARG_RE.captures(handler))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|code| !code.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::test_support::staff_portal_config;
    use medsched_core::{TimeSlot, CONSULT_DAY};

    const LISTING: &str = r#"
        <html><body>
          <div class="card">
            <img src="fotos/14770090.jpg">
            <div class="card-body">
              <h3>JUAN PÉREZ GARCÍA</h3>
              <span>CMP 35423</span>
              <span>CARDIOLOGIA</span>
              <span>Dr</span>
              <button onclick="ver_curriculo('14770090','f0','35423     ')">Ver CV</button>
            </div>
          </div>
          <div class="card">
            <div class="card-body">
              <h3>MARIA SIN CODIGO</h3>
              <button onclick="ver_horario()">Horario</button>
            </div>
          </div>
          <div class="card">
            <img src="https://cdn.test/rosa.png">
            <div class="card-body">
              <button onclick="ver_curriculo(' 555 ','f1','')">Ver CV</button>
            </div>
          </div>
        </body></html>
    "#;

    const CV: &str = r#"<html><body>
        <p id="curriculo2">Médico cirujano, especialista en
          cardiología clínica.</p>
        <span id="rne">RNE 20111</span>
    </body></html>"#;

    const SCHEDULE: &str = r#"<script>
        document.getElementById("L-M").innerHTML="08:00 - 12:00\n[506]";
        document.getElementById("M-T").innerHTML="";
        document.getElementById("X-T").innerHTML="15:00 - 18:30 [210]";
    </script>"#;

    fn source() -> StaffPortalSource {
        StaffPortalSource::new(staff_portal_config()).unwrap()
    }

    fn summary() -> DoctorSummary {
        source().extract_page(LISTING).summaries.remove(0)
    }

    #[test]
    fn extract_page_reads_card_fields() {
        let page = source().extract_page(LISTING);
        assert_eq!(page.cards_seen, 3);
        assert_eq!(page.summaries.len(), 2);

        let juan = &page.summaries[0];
        assert_eq!(juan.source_id, "14770090");
        assert_eq!(juan.display_name, "Juan Pérez García");
        assert_eq!(juan.specialty, "Cardiologia");
        assert_eq!(juan.credential_hint, "35423");
        assert_eq!(
            juan.image_url,
            "https://portal.test/STAFF02/staff-oracle/fotos/14770090.jpg"
        );
        assert_eq!(juan.detail_reference.param("codigo"), Some("14770090"));
        assert_eq!(juan.detail_reference.param("cmp"), Some("35423"));
    }

    #[test]
    fn extract_page_defaults_for_sparse_card() {
        let page = source().extract_page(LISTING);
        let rosa = &page.summaries[1];
        assert_eq!(rosa.source_id, "555");
        assert_eq!(rosa.display_name, "Desconocido");
        assert_eq!(rosa.specialty, "General");
        assert!(rosa.credential_hint.is_empty());
        assert_eq!(rosa.image_url, "https://cdn.test/rosa.png");
    }

    #[test]
    fn card_without_cv_handler_is_rejected() {
        let page = source().extract_page(LISTING);
        assert_eq!(
            page.rejected,
            vec![ExtractError::MissingIdentifier {
                position: 2,
                name: "Maria Sin Codigo".to_string()
            }]
        );
    }

    #[test]
    fn detail_requests_carry_codes_and_referer() {
        let Some(DetailRequests::Split {
            biography,
            schedule,
        }) = source().detail_requests(&summary())
        else {
            panic!("expected split detail requests");
        };
        assert_eq!(
            biography.url,
            "https://portal.test/staff/ver_cv_surco.php?codigo=14770090&zona=curriculo&cmp=35423&b_sede=1"
        );
        assert_eq!(
            schedule.url,
            "https://portal.test/staff/ver_hora_surco.php?codigo=14770090&zona=horario&b_sede=1"
        );
        assert_eq!(
            schedule.referer.as_deref(),
            Some("https://portal.test/staff/staff-medico-surco.php")
        );
    }

    #[test]
    fn extract_detail_combines_cv_and_schedule() {
        let payload = DetailPayload::Split {
            biography: Some(CV.to_string()),
            schedule: Some(SCHEDULE.to_string()),
        };
        let profile = source().extract_detail(&payload, &summary());

        assert_eq!(profile.credential_code, "35423");
        assert_eq!(profile.secondary_credential_code, "20111");
        assert_eq!(
            profile.biography,
            "Médico cirujano, especialista en cardiología clínica."
        );
        assert_eq!(profile.locations.len(), 1);

        let surco = &profile.locations[0];
        assert_eq!(surco.site_title, "San Pablo Surco");
        assert_eq!(surco.site_slug, "surco");
        assert_eq!(surco.address, "Av. El Polo 789");
        assert_eq!(surco.district, "Santiago de Surco");
        assert_eq!(
            surco.slots,
            vec![
                TimeSlot::new("Lunes", "08:00", "12:00"),
                TimeSlot::new("Miércoles", "15:00", "18:30"),
            ]
        );
    }

    #[test]
    fn schedule_without_ranges_gets_consult_sentinel() {
        let payload = DetailPayload::Split {
            biography: None,
            schedule: Some("<script></script>".to_string()),
        };
        let profile = source().extract_detail(&payload, &summary());
        assert_eq!(profile.locations.len(), 1);
        assert_eq!(profile.locations[0].slots.len(), 1);
        assert_eq!(profile.locations[0].slots[0].day, CONSULT_DAY);
    }

    #[test]
    fn missing_schedule_yields_no_locations() {
        let payload = DetailPayload::Split {
            biography: Some(CV.to_string()),
            schedule: None,
        };
        let profile = source().extract_detail(&payload, &summary());
        assert!(!profile.has_schedule());
        assert_eq!(profile.secondary_credential_code, "20111");
    }

    #[test]
    fn new_rejects_source_without_site() {
        let mut config = staff_portal_config();
        config.sites.clear();
        assert!(matches!(
            StaffPortalSource::new(config),
            Err(PipelineError::InvalidSource { .. })
        ));
    }
}
