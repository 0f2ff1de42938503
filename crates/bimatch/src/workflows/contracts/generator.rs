//! Invocation of the external text-generation collaborator.
//!
//! The collaborator is a black box beyond its output-validation contract:
//! it receives a fixed structural template with the draft facts inlined and
//! deterministic-leaning sampling parameters, and whatever comes back must
//! still pass the content gate before it is persisted.

use crate::config::GeneratorConfig;

use super::domain::ContractData;

/// Sampling parameters passed to the collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_k: u32,
    pub top_p: f32,
}

impl From<&GeneratorConfig> for GenerationParams {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_k: config.top_k,
            top_p: config.top_p,
        }
    }
}

/// The external text-generation collaborator.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, params: GenerationParams)
        -> Result<String, GenerationError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("text generation failed: {0}")]
    Failed(String),
}

pub(crate) fn format_amount(cents: i64, currency: &str) -> String {
    format!("{},{:02} {currency}", cents / 100, (cents % 100).abs())
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|date| date.to_string()).unwrap_or_default()
}

/// The fixed structural template: numbered articles, mandatory clauses,
/// and a closing signature block, with the validated draft facts inlined.
pub fn build_prompt(data: &ContractData, prompt_version: &str) -> String {
    let deliverables = data
        .project
        .deliverables
        .iter()
        .map(|deliverable| format!("- {deliverable}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Redigi in italiano un contratto di collaborazione professionale (modello {prompt_version}).\n\
         Struttura obbligatoria: almeno 10 articoli numerati nel formato \"Art. N - Titolo\" e una \
         sezione conclusiva \"Firme\" con spazio per entrambe le parti.\n\
         Clausole obbligatorie: durata dell'incarico, compenso, diritto di recesso, protezione dei \
         dati personali (GDPR), proprietà intellettuale sugli elaborati.\n\
         Cita la Partita IVA e il Codice Fiscale delle parti esattamente come indicati.\n\
         \n\
         Professionista: {professional_name}\n\
         Partita IVA: {professional_vat}\n\
         Codice Fiscale: {professional_fiscal_code}\n\
         Domicilio fiscale: {professional_address}\n\
         \n\
         Committente: {company_name}\n\
         Partita IVA: {company_vat}\n\
         Rappresentante legale: {legal_representative}\n\
         Sede legale: {company_address}\n\
         \n\
         Progetto: {project_title}\n\
         Data di inizio: {start_date}\n\
         Data di fine: {end_date}\n\
         Deliverable:\n{deliverables}\n\
         \n\
         Compenso totale: {amount}\n",
        professional_name = data.professional.display_name,
        professional_vat = data.professional.vat_number.as_deref().unwrap_or_default(),
        professional_fiscal_code = data.professional.fiscal_code.as_deref().unwrap_or_default(),
        professional_address = data.professional.fiscal_address.as_deref().unwrap_or_default(),
        company_name = data.company.display_name,
        company_vat = data.company.vat_number.as_deref().unwrap_or_default(),
        legal_representative = data
            .company
            .legal_representative
            .as_deref()
            .unwrap_or_default(),
        company_address = data.company.legal_address.as_deref().unwrap_or_default(),
        project_title = data.project.title,
        start_date = format_date(data.project.start_date),
        end_date = format_date(data.project.end_date),
        amount = format_amount(data.payment.total_amount_cents, &data.payment.currency),
    )
}
