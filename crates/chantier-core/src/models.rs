use std::{
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::DomainError, standards::VatRate};

/// Half-open interval `[starts_at, ends_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self, DomainError> {
        if starts_at >= ends_at {
            return Err(DomainError::InvalidInterval { starts_at, ends_at });
        }

        Ok(Self { starts_at, ends_at })
    }

    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }

    /// Back-to-back slots (`a.ends_at == b.starts_at`) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.starts_at < other.ends_at && other.starts_at < self.ends_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: Uuid,
    #[serde(default)]
    pub chantier_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub participant_ids: BTreeSet<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl ScheduledEvent {
    pub fn new(
        id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let slot = TimeSlot::new(starts_at, ends_at)?;

        Ok(Self {
            id,
            chantier_id: None,
            title: None,
            organizer_id: None,
            participant_ids: BTreeSet::new(),
            starts_at: slot.starts_at,
            ends_at: slot.ends_at,
        })
    }

    pub fn with_chantier(mut self, chantier_id: Uuid) -> Self {
        self.chantier_id = Some(chantier_id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_organizer(mut self, organizer_id: impl Into<String>) -> Self {
        self.organizer_id = Some(organizer_id.into());
        self
    }

    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participant_ids
            .extend(participants.into_iter().map(Into::into));
        self
    }

    /// The organizer counts as a participant even when not listed.
    pub fn involves(&self, participant_id: &str) -> bool {
        self.organizer_id.as_deref() == Some(participant_id)
            || self.participant_ids.contains(participant_id)
    }

    /// `None` when the stored interval is empty or inverted.
    pub fn slot(&self) -> Option<TimeSlot> {
        TimeSlot::new(self.starts_at, self.ends_at).ok()
    }

    pub fn reschedule(
        &mut self,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let slot = TimeSlot::new(starts_at, ends_at)?;
        self.starts_at = slot.starts_at;
        self.ends_at = slot.ends_at;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictQuery {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// May contain duplicates; compared as a set.
    #[serde(default)]
    pub participant_ids: Vec<String>,
    /// The event being rescheduled, never reported against itself.
    #[serde(default)]
    pub exclude_event_id: Option<Uuid>,
}

impl ConflictQuery {
    pub fn new<I, S>(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            starts_at,
            ends_at,
            participant_ids: participants.into_iter().map(Into::into).collect(),
            exclude_event_id: None,
        }
    }

    pub fn excluding(mut self, event_id: Uuid) -> Self {
        self.exclude_event_id = Some(event_id);
        self
    }

    pub fn window(&self) -> Result<TimeSlot, DomainError> {
        TimeSlot::new(self.starts_at, self.ends_at)
    }

    pub fn participant_set(&self) -> BTreeSet<String> {
        self.participant_ids.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub amount_excl_tax: Decimal,
    /// Percentage, validated against the legal rates when totals are computed.
    pub vat_rate: Decimal,
    #[serde(default)]
    pub category: String,
}

impl InvoiceLineItem {
    pub fn new(amount_excl_tax: Decimal, vat_rate: Decimal, category: impl Into<String>) -> Self {
        Self {
            amount_excl_tax,
            vat_rate,
            category: category.into(),
        }
    }
}

/// Derived from a line set on demand, never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal_by_rate: BTreeMap<VatRate, Decimal>,
    pub vat_by_rate: BTreeMap<VatRate, Decimal>,
    pub total_excl_tax: Decimal,
    pub total_vat: Decimal,
    pub total_incl_tax: Decimal,
    pub reverse_charge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionGuarantee {
    pub percentage: Decimal,
    pub held_amount: Decimal,
    pub net_payable: Decimal,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

impl RetentionGuarantee {
    pub fn with_release_date(mut self, release_date: NaiveDate) -> Self {
        self.release_date = Some(release_date);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DevisKind {
    Devis,
    Facture,
}

impl DevisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevisKind::Devis => "DEVIS",
            DevisKind::Facture => "FACTURE",
        }
    }
}

impl FromStr for DevisKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEVIS" => Ok(DevisKind::Devis),
            "FACTURE" => Ok(DevisKind::Facture),
            _ => anyhow::bail!("kind must be DEVIS or FACTURE"),
        }
    }
}

/// A quote or invoice as loaded from storage, lines in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevisDocument {
    pub id: Uuid,
    pub chantier_id: Option<Uuid>,
    pub kind: DevisKind,
    pub reverse_charge: bool,
    pub retention_percentage: Option<Decimal>,
    pub retention_release_date: Option<NaiveDate>,
    pub lines: Vec<InvoiceLineItem>,
}
