use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The three French VAT rates a construction line may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VatRate {
    #[serde(rename = "5.5")]
    Reduced,
    #[serde(rename = "10")]
    Intermediate,
    #[serde(rename = "20")]
    Standard,
}

impl VatRate {
    pub const ALL: [VatRate; 3] = [VatRate::Reduced, VatRate::Intermediate, VatRate::Standard];

    pub fn percentage(&self) -> Decimal {
        match self {
            VatRate::Reduced => Decimal::new(55, 1),
            VatRate::Intermediate => Decimal::new(10, 0),
            VatRate::Standard => Decimal::new(20, 0),
        }
    }

    /// Matches numerically, so `20.00` and `20` both map to `Standard`.
    pub fn from_percentage(value: Decimal) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.percentage() == value)
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    pub customer_receivable: String,
    pub retention_receivable: String,
    pub revenue: String,
    pub vat_collected: String,
}

impl ChartOfAccounts {
    /// Collected VAT is split into one sub-account per rate.
    pub fn vat_collected_for(&self, rate: VatRate) -> String {
        let suffix = match rate {
            VatRate::Standard => "1",
            VatRate::Intermediate => "2",
            VatRate::Reduced => "3",
        };
        format!("{}{}", self.vat_collected, suffix)
    }
}

pub trait StandardsProfile {
    fn name(&self) -> &'static str;
    fn chart_of_accounts(&self) -> ChartOfAccounts;
    fn max_retention_percentage(&self) -> Decimal;
}

/// French Plan Comptable Général, construction works.
#[derive(Debug, Clone, Default)]
pub struct PcgProfile;

impl StandardsProfile for PcgProfile {
    fn name(&self) -> &'static str {
        "PCG-BTP"
    }

    fn chart_of_accounts(&self) -> ChartOfAccounts {
        ChartOfAccounts {
            customer_receivable: "411".to_string(),
            retention_receivable: "4117".to_string(),
            revenue: "704".to_string(),
            vat_collected: "44571".to_string(),
        }
    }

    fn max_retention_percentage(&self) -> Decimal {
        Decimal::new(5, 0)
    }
}
