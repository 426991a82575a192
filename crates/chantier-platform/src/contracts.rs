use chantier_core::{
    ConflictQuery, DevisKind, InvoiceLineItem, InvoiceTotals, RetentionGuarantee, ScheduledEvent,
};
use chantier_finance::JournalEntry;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub participant_ids: Vec<String>,
    pub exclude_event_id: Option<Uuid>,
}

impl ConflictCheckRequest {
    pub fn into_query(self) -> ConflictQuery {
        let query = ConflictQuery::new(self.starts_at, self.ends_at, self.participant_ids);
        match self.exclude_event_id {
            Some(event_id) => query.excluding(event_id),
            None => query,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub conflicts: Vec<ScheduledEvent>,
    pub busy_participant_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevisTotalsRequest {
    pub lines: Vec<InvoiceLineItem>,
    #[serde(default)]
    pub reverse_charge: bool,
    pub retention_percentage: Option<Decimal>,
    pub retention_release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevisTotalsResponse {
    pub totals: InvoiceTotals,
    pub retention: Option<RetentionGuarantee>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDevisTotalsResponse {
    pub devis_id: Uuid,
    pub chantier_id: Option<Uuid>,
    pub kind: DevisKind,
    pub totals: InvoiceTotals,
    pub retention: Option<RetentionGuarantee>,
    /// Only factures are posted; quotes carry no journal.
    pub journal: Option<JournalEntry>,
}
