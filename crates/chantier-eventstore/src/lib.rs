use std::collections::{BTreeSet, HashMap};

use anyhow::Context;
use async_trait::async_trait;
use chantier_core::{DevisDocument, DevisStore, PlanningStore, ScheduledEvent, TimeSlot};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryPlanningStore {
    events: RwLock<HashMap<Uuid, ScheduledEvent>>,
}

impl InMemoryPlanningStore {
    pub fn with_events(events: impl IntoIterator<Item = ScheduledEvent>) -> Self {
        Self {
            events: RwLock::new(events.into_iter().map(|event| (event.id, event)).collect()),
        }
    }

    pub async fn schedule(&self, event: ScheduledEvent) -> anyhow::Result<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            anyhow::bail!("event {} already scheduled", event.id);
        }
        events.insert(event.id, event);
        Ok(())
    }

    pub async fn reschedule(
        &self,
        event_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> anyhow::Result<ScheduledEvent> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(&event_id)
            .with_context(|| format!("event {event_id} not found"))?;
        event.reschedule(starts_at, ends_at)?;
        Ok(event.clone())
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl PlanningStore for InMemoryPlanningStore {
    async fn events_for_participants(
        &self,
        participant_ids: &BTreeSet<String>,
        window: TimeSlot,
    ) -> anyhow::Result<Vec<ScheduledEvent>> {
        let events = self.events.read().await;
        // Same predicate as the SQL store: malformed rows are returned as-is.
        Ok(events
            .values()
            .filter(|event| event.starts_at < window.ends_at && event.ends_at > window.starts_at)
            .filter(|event| participant_ids.iter().any(|id| event.involves(id)))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryDevisStore {
    documents: RwLock<HashMap<Uuid, DevisDocument>>,
}

impl InMemoryDevisStore {
    pub async fn insert(&self, document: DevisDocument) {
        let mut documents = self.documents.write().await;
        documents.insert(document.id, document);
    }
}

#[async_trait]
impl DevisStore for InMemoryDevisStore {
    async fn devis(&self, devis_id: Uuid) -> anyhow::Result<Option<DevisDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&devis_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chantier_core::{DevisKind, InvoiceLineItem};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, hour, 0, 0).unwrap()
    }

    fn participants(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn candidates_are_filtered_by_window_and_participant() {
        let store = InMemoryPlanningStore::default();
        assert!(store.is_empty().await);
        let matching = ScheduledEvent::new(Uuid::new_v4(), at(9), at(10))
            .unwrap()
            .with_participants(["u1"]);
        let other_person = ScheduledEvent::new(Uuid::new_v4(), at(9), at(10))
            .unwrap()
            .with_participants(["u2"]);
        let later = ScheduledEvent::new(Uuid::new_v4(), at(12), at(13))
            .unwrap()
            .with_organizer("u1");
        for event in [matching.clone(), other_person, later] {
            store.schedule(event).await.unwrap();
        }

        let window = TimeSlot::new(at(8), at(11)).unwrap();
        let found = store
            .events_for_participants(&participants(&["u1"]), window)
            .await
            .unwrap();

        assert_eq!(found, vec![matching]);
        assert_eq!(store.len().await, 3);
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn scheduling_the_same_id_twice_fails() {
        let event = ScheduledEvent::new(Uuid::new_v4(), at(9), at(10)).unwrap();
        let store = InMemoryPlanningStore::with_events([event.clone()]);

        assert!(store.schedule(event).await.is_err());
    }

    #[tokio::test]
    async fn reschedule_moves_the_event() {
        let event = ScheduledEvent::new(Uuid::new_v4(), at(9), at(10))
            .unwrap()
            .with_participants(["u1"]);
        let store = InMemoryPlanningStore::with_events([event.clone()]);

        let moved = store.reschedule(event.id, at(15), at(16)).await.unwrap();
        assert_eq!(moved.starts_at, at(15));

        let morning = TimeSlot::new(at(8), at(11)).unwrap();
        let found = store
            .events_for_participants(&participants(&["u1"]), morning)
            .await
            .unwrap();
        assert!(found.is_empty());

        assert!(store.reschedule(event.id, at(16), at(15)).await.is_err());
        assert!(store.reschedule(Uuid::new_v4(), at(8), at(9)).await.is_err());
    }

    #[tokio::test]
    async fn devis_lookup_returns_stored_document() {
        let store = InMemoryDevisStore::default();
        let document = DevisDocument {
            id: Uuid::new_v4(),
            chantier_id: None,
            kind: DevisKind::Devis,
            reverse_charge: false,
            retention_percentage: None,
            retention_release_date: None,
            lines: vec![InvoiceLineItem::new(
                Decimal::new(100, 0),
                Decimal::new(20, 0),
                "materiaux",
            )],
        };
        store.insert(document.clone()).await;

        assert_eq!(store.devis(document.id).await.unwrap(), Some(document));
        assert_eq!(store.devis(Uuid::new_v4()).await.unwrap(), None);
    }
}
