use std::collections::BTreeMap;

use chantier_core::{DomainError, InvoiceLineItem, InvoiceTotals, VatRate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsOptions {
    /// Autoliquidation: VAT liability moves to the buyer, seller charges none.
    #[serde(default)]
    pub reverse_charge: bool,
}

/// Two decimal places, ties to even.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Per-rate VAT is computed on the summed group subtotal and rounded once;
/// individual lines are never rounded.
pub fn compute_totals(
    lines: &[InvoiceLineItem],
    options: TotalsOptions,
) -> Result<InvoiceTotals, DomainError> {
    let mut subtotals: BTreeMap<VatRate, Decimal> = BTreeMap::new();

    for (index, line) in lines.iter().enumerate() {
        if line.amount_excl_tax < Decimal::ZERO {
            return Err(DomainError::InvalidAmount {
                line: index,
                amount: line.amount_excl_tax,
            });
        }
        let rate = VatRate::from_percentage(line.vat_rate).ok_or(
            DomainError::UnsupportedVatRate {
                line: index,
                rate: line.vat_rate,
            },
        )?;

        let subtotal = subtotals.entry(rate).or_insert(Decimal::ZERO);
        *subtotal = subtotal
            .checked_add(line.amount_excl_tax)
            .ok_or(DomainError::AmountOverflow("rate subtotal"))?;
    }

    let total_excl_tax = round_currency(checked_sum(subtotals.values(), "total excl. tax")?);

    let vat_by_rate = subtotals
        .iter()
        .map(|(rate, subtotal)| -> Result<(VatRate, Decimal), DomainError> {
            let vat = if options.reverse_charge {
                Decimal::ZERO
            } else {
                subtotal
                    .checked_mul(rate.percentage())
                    .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
                    .map(round_currency)
                    .ok_or(DomainError::AmountOverflow("VAT"))?
            };
            Ok((*rate, vat))
        })
        .collect::<Result<BTreeMap<VatRate, Decimal>, DomainError>>()?;

    let total_vat = checked_sum(vat_by_rate.values(), "total VAT")?;
    let total_incl_tax = total_excl_tax
        .checked_add(total_vat)
        .ok_or(DomainError::AmountOverflow("total incl. tax"))?;

    let subtotal_by_rate = subtotals
        .into_iter()
        .map(|(rate, subtotal)| (rate, round_currency(subtotal)))
        .collect();

    Ok(InvoiceTotals {
        subtotal_by_rate,
        vat_by_rate,
        total_excl_tax,
        total_vat,
        total_incl_tax,
        reverse_charge: options.reverse_charge,
    })
}

fn checked_sum<'a>(
    amounts: impl IntoIterator<Item = &'a Decimal>,
    what: &'static str,
) -> Result<Decimal, DomainError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(*amount))
        .ok_or(DomainError::AmountOverflow(what))
}
