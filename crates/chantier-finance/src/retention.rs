use chantier_core::{DomainError, PcgProfile, RetentionGuarantee, StandardsProfile};
use rust_decimal::Decimal;

use crate::totals::round_currency;

/// Retenue de garantie withheld from `total_incl_tax`.
///
/// `percentage` must lie within `[0, 5]`; the ceiling comes from the
/// standards profile, not from callers.
pub fn compute_retention(
    total_incl_tax: Decimal,
    percentage: Decimal,
) -> Result<RetentionGuarantee, DomainError> {
    let ceiling = PcgProfile.max_retention_percentage();
    if percentage < Decimal::ZERO || percentage > ceiling {
        return Err(DomainError::RetentionOutOfRange(percentage));
    }

    let held_amount = total_incl_tax
        .checked_mul(percentage)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .map(round_currency)
        .ok_or(DomainError::AmountOverflow("retention held amount"))?;
    let net_payable = total_incl_tax
        .checked_sub(held_amount)
        .ok_or(DomainError::AmountOverflow("net payable"))?;

    Ok(RetentionGuarantee {
        percentage,
        held_amount,
        net_payable,
        release_date: None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn five_percent_of_a_thousand() {
        let retention = compute_retention(dec("1000"), dec("5")).unwrap();

        assert_eq!(retention.held_amount, dec("50"));
        assert_eq!(retention.net_payable, dec("950"));
        assert_eq!(retention.release_date, None);
    }

    #[test]
    fn zero_percent_holds_nothing_back() {
        let retention = compute_retention(dec("1234.56"), Decimal::ZERO).unwrap();

        assert!(retention.held_amount.is_zero());
        assert_eq!(retention.net_payable, dec("1234.56"));
    }

    #[test]
    fn out_of_range_percentages_are_rejected() {
        assert_eq!(
            compute_retention(dec("1000"), dec("5.1")),
            Err(DomainError::RetentionOutOfRange(dec("5.1")))
        );
        assert_eq!(
            compute_retention(dec("1000"), dec("-1")),
            Err(DomainError::RetentionOutOfRange(dec("-1")))
        );
    }

    #[test]
    fn held_amount_is_rounded_and_net_keeps_the_remainder() {
        // 1234.57 * 2.5% = 30.86425
        let retention = compute_retention(dec("1234.57"), dec("2.5")).unwrap();

        assert_eq!(retention.held_amount, dec("30.86"));
        assert_eq!(retention.net_payable, dec("1203.71"));
        assert_eq!(
            retention.held_amount + retention.net_payable,
            dec("1234.57")
        );
    }

    #[test]
    fn oversized_total_fails_instead_of_overflowing() {
        assert_eq!(
            compute_retention(Decimal::MAX, dec("5")),
            Err(DomainError::AmountOverflow("retention held amount"))
        );

        let retention = compute_retention(Decimal::MAX, Decimal::ZERO).unwrap();
        assert_eq!(retention.net_payable, Decimal::MAX);
    }

    #[test]
    fn release_date_is_informational() {
        let release = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        let retention = compute_retention(dec("800"), dec("5"))
            .unwrap()
            .with_release_date(release);

        assert_eq!(retention.release_date, Some(release));
        assert_eq!(retention.held_amount, dec("40"));
    }
}
