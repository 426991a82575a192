use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chantier_core::{DevisStore, PlanningStore};

mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub planning: Arc<dyn PlanningStore>,
    pub devis: Arc<dyn DevisStore>,
}

impl AppState {
    pub fn new(planning: Arc<dyn PlanningStore>, devis: Arc<dyn DevisStore>) -> Self {
        Self { planning, devis }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/planning/conflicts", post(handlers::check_conflicts))
        .route("/devis/totals", post(handlers::compute_devis_totals))
        .route(
            "/devis/{devis_id}/totals",
            get(handlers::stored_devis_totals),
        )
        .with_state(state)
}
