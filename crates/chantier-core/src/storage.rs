use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{DevisDocument, ScheduledEvent, TimeSlot};

/// Source of the planning snapshot the conflict detector runs against.
#[async_trait]
pub trait PlanningStore: Send + Sync {
    /// Events involving any of `participant_ids` that overlap `window`.
    async fn events_for_participants(
        &self,
        participant_ids: &BTreeSet<String>,
        window: TimeSlot,
    ) -> anyhow::Result<Vec<ScheduledEvent>>;
}

#[async_trait]
pub trait DevisStore: Send + Sync {
    async fn devis(&self, devis_id: Uuid) -> anyhow::Result<Option<DevisDocument>>;
}
