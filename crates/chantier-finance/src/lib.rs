pub mod journal;
pub mod retention;
pub mod totals;

pub use journal::{JournalEntry, JournalLine, invoice_journal};
pub use retention::compute_retention;
pub use totals::{TotalsOptions, compute_totals, round_currency};
