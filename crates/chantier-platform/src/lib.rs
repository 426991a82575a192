pub mod config;
pub mod contracts;
pub mod db;

pub use config::ServiceConfig;
pub use contracts::{
    ConflictCheckRequest, ConflictCheckResponse, DevisTotalsRequest, DevisTotalsResponse,
    StoredDevisTotalsResponse,
};
pub use db::{PgDevisStore, PgPlanningStore, connect_database};
