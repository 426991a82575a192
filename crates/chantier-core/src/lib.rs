pub mod error;
pub mod models;
pub mod standards;
pub mod storage;

pub use error::DomainError;
pub use models::{
    ConflictQuery, DevisDocument, DevisKind, InvoiceLineItem, InvoiceTotals, RetentionGuarantee,
    ScheduledEvent, TimeSlot,
};
pub use standards::{ChartOfAccounts, PcgProfile, StandardsProfile, VatRate};
pub use storage::{DevisStore, PlanningStore};
