use chantier_core::{InvoiceTotals, PcgProfile, RetentionGuarantee, StandardsProfile};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub memo: String,
    /// Accounting standard the lines were posted under.
    pub standard: String,
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn debit_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.debit).sum()
    }

    pub fn credit_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.credit).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.debit_total() == self.credit_total()
    }
}

/// Posting for an issued facture. The customer is debited the net payable,
/// the retention receivable the held amount; revenue and collected VAT per
/// rate are credited. Zero-amount lines are left out.
pub fn invoice_journal(
    memo: impl Into<String>,
    totals: &InvoiceTotals,
    retention: Option<&RetentionGuarantee>,
) -> JournalEntry {
    let profile = PcgProfile;
    let coa = profile.chart_of_accounts();

    let (receivable, held) = match retention {
        Some(retention) => (retention.net_payable, retention.held_amount),
        None => (totals.total_incl_tax, Decimal::ZERO),
    };

    let mut lines = vec![
        debit(coa.customer_receivable.clone(), receivable),
        debit(coa.retention_receivable.clone(), held),
        credit(coa.revenue.clone(), totals.total_excl_tax),
    ];
    lines.extend(
        totals
            .vat_by_rate
            .iter()
            .map(|(rate, vat)| credit(coa.vat_collected_for(*rate), *vat)),
    );
    lines.retain(|line| !(line.debit.is_zero() && line.credit.is_zero()));

    JournalEntry {
        id: Uuid::new_v4(),
        memo: memo.into(),
        standard: profile.name().to_string(),
        lines,
    }
}

fn debit(account: String, amount: Decimal) -> JournalLine {
    JournalLine {
        account,
        debit: amount,
        credit: Decimal::ZERO,
    }
}

fn credit(account: String, amount: Decimal) -> JournalLine {
    JournalLine {
        account,
        debit: Decimal::ZERO,
        credit: amount,
    }
}
