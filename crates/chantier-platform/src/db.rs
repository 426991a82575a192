use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chantier_core::{
    DevisDocument, DevisKind, DevisStore, InvoiceLineItem, PlanningStore, ScheduledEvent,
    TimeSlot,
};
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use tracing::debug;
use uuid::Uuid;

pub async fn connect_database(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Reads `scheduled_events` joined with `scheduled_event_participants`.
#[derive(Clone)]
pub struct PgPlanningStore {
    pool: PgPool,
}

impl PgPlanningStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanningStore for PgPlanningStore {
    async fn events_for_participants(
        &self,
        participant_ids: &BTreeSet<String>,
        window: TimeSlot,
    ) -> Result<Vec<ScheduledEvent>> {
        let participants: Vec<String> = participant_ids.iter().cloned().collect();

        let rows = sqlx::query(
            r#"
            SELECT
                e.id,
                e.chantier_id,
                e.title,
                e.organizer_id,
                e.starts_at,
                e.ends_at,
                COALESCE(
                    array_agg(p.participant_id) FILTER (WHERE p.participant_id IS NOT NULL),
                    '{}'
                ) AS participant_ids
            FROM scheduled_events e
            LEFT JOIN scheduled_event_participants p ON p.event_id = e.id
            WHERE e.starts_at < $2
              AND e.ends_at > $1
              AND (
                e.organizer_id = ANY($3)
                OR EXISTS (
                    SELECT 1
                    FROM scheduled_event_participants q
                    WHERE q.event_id = e.id AND q.participant_id = ANY($3)
                )
              )
            GROUP BY e.id
            "#,
        )
        .bind(window.starts_at)
        .bind(window.ends_at)
        .bind(participants)
        .fetch_all(&self.pool)
        .await
        .context("failed to load scheduled events")?;
        debug!(rows = rows.len(), "loaded candidate events");

        rows.into_iter()
            .map(|row| -> Result<ScheduledEvent> {
                let participant_ids: Vec<String> = row.try_get("participant_ids")?;
                Ok(ScheduledEvent {
                    id: row.try_get("id")?,
                    chantier_id: row.try_get("chantier_id")?,
                    title: row.try_get("title")?,
                    organizer_id: row.try_get("organizer_id")?,
                    participant_ids: participant_ids.into_iter().collect(),
                    starts_at: row.try_get("starts_at")?,
                    ends_at: row.try_get("ends_at")?,
                })
            })
            .collect()
    }
}

/// Reads `devis` headers and their `devis_lines`, ordered by `position`.
#[derive(Clone)]
pub struct PgDevisStore {
    pool: PgPool,
}

impl PgDevisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DevisStore for PgDevisStore {
    async fn devis(&self, devis_id: Uuid) -> Result<Option<DevisDocument>> {
        let Some(header) = sqlx::query(
            r#"
            SELECT id, chantier_id, kind, reverse_charge, retention_percentage, retention_release_date
            FROM devis
            WHERE id = $1
            "#,
        )
        .bind(devis_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to load devis")?
        else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            r#"
            SELECT amount_excl_tax, vat_rate, COALESCE(category, '') AS category
            FROM devis_lines
            WHERE devis_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(devis_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to load devis lines")?;

        let lines = line_rows
            .into_iter()
            .map(|row| -> Result<InvoiceLineItem> {
                Ok(InvoiceLineItem {
                    amount_excl_tax: row.try_get("amount_excl_tax")?,
                    vat_rate: row.try_get("vat_rate")?,
                    category: row.try_get("category")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let kind: String = header.try_get("kind")?;

        Ok(Some(DevisDocument {
            id: header.try_get("id")?,
            chantier_id: header.try_get("chantier_id")?,
            kind: kind.parse::<DevisKind>()?,
            reverse_charge: header.try_get("reverse_charge")?,
            retention_percentage: header.try_get("retention_percentage")?,
            retention_release_date: header.try_get("retention_release_date")?,
            lines,
        }))
    }
}
