use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failures raised by the planning and devis engines.
///
/// All variants are client errors: retrying the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid interval: starts_at {starts_at} must be before ends_at {ends_at}")]
    InvalidInterval {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    #[error("line {line}: amount_excl_tax must be non-negative, got {amount}")]
    InvalidAmount { line: usize, amount: Decimal },
    #[error("line {line}: unsupported VAT rate {rate}%, expected one of 5.5, 10 or 20")]
    UnsupportedVatRate { line: usize, rate: Decimal },
    #[error("retention percentage {0} is outside the allowed range 0 to 5")]
    RetentionOutOfRange(Decimal),
    #[error("amount too large: {0} overflowed")]
    AmountOverflow(&'static str),
}
