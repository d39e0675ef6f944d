//! Scalar loan figures: monthly payment, total payment and total interest.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoanError;
use crate::schedule::{generate_schedule, summarize};
use crate::types::{LoanParameters, LoanSummary, Money, PaymentMethod, ScheduleEntry, to_money};
use crate::LoanResult;

/// Converts a nominal annual percentage into the per-month rate.
///
/// `10` (10% a year) becomes `10 / 100 / 12 ≈ 0.0083333`. Rates small enough
/// to fall below the decimal's 28-digit scale come out as exactly zero.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(1200)
}

/// The level installment of an annuity loan, rounded half-up to a whole unit.
///
/// Uses `PMT = P * r / (1 - (1 + r)^-n)`, the discount-factor form of
/// `P * r * (1 + r)^n / ((1 + r)^n - 1)`. With `r == 0`, or when the
/// denominator vanishes at the decimal's precision, the installment is
/// `principal / term_months` and the remainder is left to the last period.
///
/// # Errors
///
/// Returns an error if `term_months` is zero or the installment does not fit
/// in [`Money`].
pub fn annuity_installment(
    principal: Money,
    monthly_rate: Decimal,
    term_months: u32,
) -> LoanResult<Money> {
    if term_months == 0 {
        return Err(LoanError::invalid("term_months", "must be at least one month"));
    }
    if monthly_rate.is_zero() {
        return Ok(principal / Money::from(term_months));
    }

    let growth = Decimal::ONE
        .checked_add(monthly_rate)
        .ok_or_else(|| LoanError::overflow("annuity growth factor"))?;
    let discount = Decimal::ONE
        .checked_div(growth)
        .ok_or_else(|| LoanError::overflow("annuity discount factor"))?;
    let discount_n = discount
        .checked_powu(u64::from(term_months))
        .ok_or_else(|| LoanError::overflow("annuity discount factor"))?;
    let denominator = Decimal::ONE - discount_n;
    if denominator.is_zero() {
        debug!(%monthly_rate, term_months, "annuity denominator vanished, using interest-free split");
        return Ok(principal / Money::from(term_months));
    }

    let installment = Decimal::from(principal)
        .checked_mul(monthly_rate)
        .and_then(|periodic| periodic.checked_div(denominator))
        .ok_or_else(|| LoanError::overflow("annuity installment"))?;
    to_money(installment, "annuity installment")
}

/// Computes the headline figures for a loan.
///
/// Totals are summed from the full schedule so they always agree with
/// [`generate_schedule`]. The reported monthly payment depends on the method:
/// the level installment for annuities, the first (largest) payment for equal
/// principal, and the recurring interest-only amount for balloon loans.
///
/// # Errors
///
/// Returns [`LoanError::InvalidInput`] for a zero principal, a zero term or a
/// negative rate, and [`LoanError::Overflow`] when an amount cannot be
/// represented.
pub fn compute_summary(params: &LoanParameters) -> LoanResult<LoanSummary> {
    let schedule = generate_schedule(params)?;
    summary_from_schedule(params, &schedule)
}

/// Derives the headline figures from a schedule already generated for
/// `params`, without projecting it again.
///
/// # Errors
///
/// Returns [`LoanError::InvalidInput`] for an empty schedule and
/// [`LoanError::Overflow`] when the totals cannot be represented.
pub fn summary_from_schedule(
    params: &LoanParameters,
    schedule: &[ScheduleEntry],
) -> LoanResult<LoanSummary> {
    let summary = summarize(params.payment_method, schedule)?;

    // An annuity reports the closed-form installment rather than any single
    // row, since the last row carries the rounding correction.
    let summary = match params.payment_method {
        PaymentMethod::Annuity => LoanSummary {
            monthly_payment: annuity_installment(
                params.principal,
                params.monthly_rate(),
                params.term_months,
            )?,
            ..summary
        },
        PaymentMethod::EqualPrincipal | PaymentMethod::InterestOnlyBalloon => summary,
    };

    debug!(
        method = %params.payment_method,
        principal = params.principal,
        term_months = params.term_months,
        monthly_payment = summary.monthly_payment,
        total_interest = summary.total_interest,
        "computed loan summary"
    );
    Ok(summary)
}

/// Summaries of the same loan under every payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanComparison {
    /// The amount borrowed.
    pub principal: Money,
    /// Level-installment repayment.
    pub annuity: LoanSummary,
    /// Fixed principal share with interest on the declining balance.
    pub equal_principal: LoanSummary,
    /// Interest every month, principal in the last one.
    pub interest_only_balloon: LoanSummary,
}

impl LoanComparison {
    pub fn get(&self, method: PaymentMethod) -> &LoanSummary {
        match method {
            PaymentMethod::Annuity => &self.annuity,
            PaymentMethod::EqualPrincipal => &self.equal_principal,
            PaymentMethod::InterestOnlyBalloon => &self.interest_only_balloon,
        }
    }

    /// The method with the least total interest; ties go to the method
    /// listed first in [`PaymentMethod::ALL`].
    pub fn cheapest(&self) -> PaymentMethod {
        PaymentMethod::ALL
            .into_iter()
            .min_by_key(|method| self.get(*method).total_interest)
            .unwrap_or_default()
    }
}

/// Computes the loan under all three payment methods side by side.
///
/// # Errors
///
/// Fails with the same errors as [`compute_summary`].
pub fn compare_payment_methods(
    principal: Money,
    annual_rate_percent: Decimal,
    term_months: u32,
) -> LoanResult<LoanComparison> {
    let summary_for = |payment_method| {
        compute_summary(&LoanParameters {
            principal,
            annual_rate_percent,
            term_months,
            payment_method,
        })
    };

    Ok(LoanComparison {
        principal,
        annuity: summary_for(PaymentMethod::Annuity)?,
        equal_principal: summary_for(PaymentMethod::EqualPrincipal)?,
        interest_only_balloon: summary_for(PaymentMethod::InterestOnlyBalloon)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn loan(principal: Money, rate: Decimal, term: u32, method: PaymentMethod) -> LoanParameters {
        LoanParameters::new(principal, rate, term, method)
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(9)), dec!(0.0075));
        assert!(monthly_rate(dec!(10)) > dec!(0.008333) && monthly_rate(dec!(10)) < dec!(0.008334));
        assert!(monthly_rate(Decimal::ZERO).is_zero());
    }

    #[test]
    fn test_annuity_happy_path() -> anyhow::Result<()> {
        let summary = compute_summary(&loan(100_000_000, dec!(10), 12, PaymentMethod::Annuity))?;

        assert_eq!(summary.monthly_payment, 8_791_589);
        // Schedule totals stay within one unit per period of the closed form.
        let closed_form_total = summary.monthly_payment * 12;
        assert!(summary.total_payment.abs_diff(closed_form_total) <= 12);
        assert!(summary.total_payment.abs_diff(105_499_068) <= 12);
        assert!(summary.total_interest.abs_diff(5_499_068) <= 12);
        assert_eq!(summary.total_payment, 100_000_000 + summary.total_interest);
        Ok(())
    }

    #[test]
    fn test_annuity_zero_rate() -> anyhow::Result<()> {
        let summary = compute_summary(&loan(100_000_000, dec!(0), 10, PaymentMethod::Annuity))?;
        assert_eq!(
            summary,
            LoanSummary {
                monthly_payment: 10_000_000,
                total_payment: 100_000_000,
                total_interest: 0,
            }
        );
        Ok(())
    }

    #[test]
    fn test_annuity_zero_rate_uses_floor_division() -> anyhow::Result<()> {
        let summary = compute_summary(&loan(1_000, dec!(0), 3, PaymentMethod::Annuity))?;
        assert_eq!(summary.monthly_payment, 333);
        assert_eq!(summary.total_payment, 1_000);
        Ok(())
    }

    #[test]
    fn test_rate_underflowing_to_zero_takes_interest_free_branch() -> anyhow::Result<()> {
        // Non-zero annual rate that is below the decimal scale once divided by 1200.
        let tiny = Decimal::new(1, 28);
        assert!(monthly_rate(tiny).is_zero());

        let summary = compute_summary(&loan(100_000_000, tiny, 10, PaymentMethod::Annuity))?;
        assert_eq!(summary.monthly_payment, 10_000_000);
        assert_eq!(summary.total_interest, 0);
        Ok(())
    }

    #[test]
    fn test_annuity_installment_vanishing_denominator() -> anyhow::Result<()> {
        // Smallest representable rate: 1 - (1 + r)^-n is at the last digit of
        // precision, so the installment must stay near the interest-free split.
        let installment = annuity_installment(1_000_000, Decimal::new(1, 28), 4)?;
        assert!((200_000..=340_000).contains(&installment));
        Ok(())
    }

    #[test]
    fn test_annuity_installment_matches_growth_form() -> anyhow::Result<()> {
        let r = dec!(0.01);
        let growth = (Decimal::ONE + r).powu(12);
        let expected = Decimal::from(12_000u64) * r * growth / (growth - Decimal::ONE);
        assert_eq!(annuity_installment(12_000, r, 12)?, to_money(expected, "test")?);
        assert_eq!(annuity_installment(12_000, r, 12)?, 1_066);
        Ok(())
    }

    #[test]
    fn test_annuity_installment_huge_rate_does_not_overflow() -> anyhow::Result<()> {
        // 1000% a year over 30 years: (1 + r)^n would overflow, the discount form does not.
        let installment = annuity_installment(100_000_000, monthly_rate(dec!(1000)), 360)?;
        let interest_only = to_money(Decimal::from(100_000_000u64) * monthly_rate(dec!(1000)), "test")?;
        assert!(installment >= interest_only);
        assert!(installment - interest_only <= 1);
        Ok(())
    }

    #[test]
    fn test_equal_principal_summary() -> anyhow::Result<()> {
        let summary =
            compute_summary(&loan(120_000_000, dec!(12), 12, PaymentMethod::EqualPrincipal))?;

        assert_eq!(summary.monthly_payment, 10_000_000 + 1_200_000);
        // Interest on balances 120M, 110M, ..., 10M at 1%.
        assert_eq!(summary.total_interest, 7_800_000);
        assert_eq!(summary.total_payment, 127_800_000);
        Ok(())
    }

    #[test]
    fn test_equal_principal_zero_rate() -> anyhow::Result<()> {
        let summary =
            compute_summary(&loan(100_000_000, dec!(0), 10, PaymentMethod::EqualPrincipal))?;
        assert_eq!(summary.monthly_payment, 10_000_000);
        assert_eq!(summary.total_interest, 0);
        Ok(())
    }

    #[test]
    fn test_interest_only_balloon_summary() -> anyhow::Result<()> {
        let summary =
            compute_summary(&loan(50_000_000, dec!(9), 6, PaymentMethod::InterestOnlyBalloon))?;
        assert_eq!(
            summary,
            LoanSummary {
                monthly_payment: 375_000,
                total_payment: 52_250_000,
                total_interest: 2_250_000,
            }
        );
        Ok(())
    }

    #[rstest]
    #[case(PaymentMethod::Annuity)]
    #[case(PaymentMethod::EqualPrincipal)]
    #[case(PaymentMethod::InterestOnlyBalloon)]
    fn test_single_period_pays_principal_plus_one_interest(#[case] method: PaymentMethod) {
        let summary = compute_summary(&loan(10_000_000, dec!(12), 1, method)).unwrap();
        assert_eq!(summary.total_interest, 100_000);
        assert_eq!(summary.total_payment, 10_100_000);
    }

    #[rstest]
    #[case(loan(0, dec!(10), 12, PaymentMethod::Annuity), "principal")]
    #[case(loan(1_000, dec!(10), 0, PaymentMethod::EqualPrincipal), "term_months")]
    #[case(loan(1_000, dec!(-1), 12, PaymentMethod::InterestOnlyBalloon), "annual_rate_percent")]
    fn test_invalid_parameters_are_rejected(#[case] input: LoanParameters, #[case] field: &str) {
        let err = compute_summary(&input).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_summary_is_deterministic() {
        let input = loan(357_250_000, dec!(11.25), 240, PaymentMethod::Annuity);
        assert_eq!(compute_summary(&input).unwrap(), compute_summary(&input).unwrap());
    }

    #[test]
    fn test_compare_payment_methods() -> anyhow::Result<()> {
        let comparison = compare_payment_methods(120_000_000, dec!(12), 12)?;

        assert_eq!(comparison.principal, 120_000_000);
        assert_eq!(comparison.equal_principal.total_interest, 7_800_000);
        assert_eq!(comparison.interest_only_balloon.total_interest, 14_400_000);
        assert!(comparison.annuity.total_interest > comparison.equal_principal.total_interest);
        assert!(comparison.annuity.total_interest < comparison.interest_only_balloon.total_interest);
        assert_eq!(comparison.cheapest(), PaymentMethod::EqualPrincipal);
        Ok(())
    }

    #[test]
    fn test_compare_zero_rate_prefers_annuity_on_tie() -> anyhow::Result<()> {
        let comparison = compare_payment_methods(60_000_000, dec!(0), 6)?;
        assert_eq!(comparison.cheapest(), PaymentMethod::Annuity);
        Ok(())
    }

    #[test]
    fn test_compare_propagates_validation() {
        assert!(compare_payment_methods(0, dec!(5), 12).unwrap_err().is_validation());
    }
}
