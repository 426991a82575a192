use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chantier_core::{DevisKind, DomainError, InvoiceLineItem, InvoiceTotals, RetentionGuarantee};
use chantier_finance::{TotalsOptions, compute_retention, compute_totals, invoice_journal};
use chantier_planning::{busy_participants, find_conflicts};
use chantier_platform::{
    ConflictCheckRequest, ConflictCheckResponse, DevisTotalsRequest, DevisTotalsResponse,
    StoredDevisTotalsResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn check_conflicts(
    State(state): State<AppState>,
    Json(payload): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>, (StatusCode, String)> {
    let query = payload.into_query();
    let window = query.window().map_err(invalid_request)?;
    let participants = query.participant_set();
    if participants.is_empty() {
        return Ok(Json(ConflictCheckResponse {
            conflicts: Vec::new(),
            busy_participant_ids: Vec::new(),
        }));
    }

    let existing = state
        .planning
        .events_for_participants(&participants, window)
        .await
        .map_err(store_unavailable)?;
    let conflicts = find_conflicts(&query, &existing).map_err(invalid_request)?;
    let busy_participant_ids = busy_participants(&query, &conflicts)
        .into_iter()
        .collect();

    info!(
        participants = participants.len(),
        candidates = existing.len(),
        conflicts = conflicts.len(),
        "conflict check completed"
    );

    Ok(Json(ConflictCheckResponse {
        conflicts,
        busy_participant_ids,
    }))
}

pub(crate) async fn compute_devis_totals(
    Json(payload): Json<DevisTotalsRequest>,
) -> Result<Json<DevisTotalsResponse>, (StatusCode, String)> {
    let (totals, retention) = totals_with_retention(
        &payload.lines,
        payload.reverse_charge,
        payload.retention_percentage,
        payload.retention_release_date,
    )
    .map_err(invalid_request)?;

    Ok(Json(DevisTotalsResponse { totals, retention }))
}

pub(crate) async fn stored_devis_totals(
    State(state): State<AppState>,
    Path(devis_id): Path<Uuid>,
) -> Result<Json<StoredDevisTotalsResponse>, (StatusCode, String)> {
    let Some(document) = state.devis.devis(devis_id).await.map_err(store_unavailable)? else {
        return Err((StatusCode::NOT_FOUND, "devis not found".to_string()));
    };

    let (totals, retention) = totals_with_retention(
        &document.lines,
        document.reverse_charge,
        document.retention_percentage,
        document.retention_release_date,
    )
    .map_err(invalid_request)?;

    let journal = (document.kind == DevisKind::Facture)
        .then(|| invoice_journal(format!("Facture {devis_id}"), &totals, retention.as_ref()));

    info!(
        devis_id = %devis_id,
        kind = document.kind.as_str(),
        total_incl_tax = %totals.total_incl_tax,
        "devis totals computed"
    );

    Ok(Json(StoredDevisTotalsResponse {
        devis_id,
        chantier_id: document.chantier_id,
        kind: document.kind,
        totals,
        retention,
        journal,
    }))
}

fn totals_with_retention(
    lines: &[InvoiceLineItem],
    reverse_charge: bool,
    retention_percentage: Option<Decimal>,
    retention_release_date: Option<NaiveDate>,
) -> Result<(InvoiceTotals, Option<RetentionGuarantee>), DomainError> {
    let totals = compute_totals(lines, TotalsOptions { reverse_charge })?;
    let retention = retention_percentage
        .map(|percentage| compute_retention(totals.total_incl_tax, percentage))
        .transpose()?
        .map(|retention| match retention_release_date {
            Some(release_date) => retention.with_release_date(release_date),
            None => retention,
        });

    Ok((totals, retention))
}

fn invalid_request<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// Storage failures surface as 503; no fallback data is fabricated.
fn store_unavailable(err: anyhow::Error) -> (StatusCode, String) {
    error!("store unavailable: {err:#}");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!("storage unavailable: {err}"),
    )
}
