use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LoanError;
use crate::LoanResult;

/// A currency amount in whole units. VND has no minor unit, so every amount
/// the engine hands out is an integer.
pub type Money = u64;

/// How the principal is paid back over the term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Equal total payment every period; the interest/principal split shifts over time.
    #[default]
    Annuity,
    /// Equal principal every period; interest and therefore the payment decline.
    EqualPrincipal,
    /// Interest only until the last period, which also retires the whole principal.
    InterestOnlyBalloon,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Annuity,
        PaymentMethod::EqualPrincipal,
        PaymentMethod::InterestOnlyBalloon,
    ];

    /// The selector value the web form sends for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Annuity => "ANNUITY",
            PaymentMethod::EqualPrincipal => "EQUAL_PRINCIPAL",
            PaymentMethod::InterestOnlyBalloon => "INTEREST_ONLY_BALLOON",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                LoanError::invalid("payment_method", format!("unknown payment method {s:?}"))
            })
    }
}

/// Input parameters for a single amortization computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// The amount borrowed, in whole currency units.
    pub principal: Money,
    /// The nominal annual interest rate as a percentage (e.g., 10.5 for 10.5%).
    pub annual_rate_percent: Decimal,
    /// The number of monthly periods.
    pub term_months: u32,
    /// Repayment method; annuity when omitted.
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl LoanParameters {
    pub fn new(
        principal: Money,
        annual_rate_percent: Decimal,
        term_months: u32,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
            payment_method,
        }
    }

    /// Checks the constraints every computation relies on.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> LoanResult<()> {
        if self.principal == 0 {
            return Err(LoanError::invalid("principal", "must be greater than zero"));
        }
        if self.term_months == 0 {
            return Err(LoanError::invalid("term_months", "must be at least one month"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanError::invalid("annual_rate_percent", "cannot be negative"));
        }
        Ok(())
    }

    pub fn monthly_rate(&self) -> Decimal {
        crate::engine::monthly_rate(self.annual_rate_percent)
    }
}

/// Headline figures for a loan.
///
/// For [`PaymentMethod::EqualPrincipal`] `monthly_payment` is the first
/// period's payment; later payments are lower. Use the schedule when exact
/// per-period amounts matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    /// The payment shown as the headline monthly amount.
    pub monthly_payment: Money,
    /// Everything paid over the term, principal and interest.
    pub total_payment: Money,
    /// The interest part of `total_payment`.
    pub total_interest: Money,
}

/// One period of a repayment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based period number.
    pub period_index: u32,
    /// The portion of the payment that reduces the principal.
    pub principal_payment: Money,
    /// The portion of the payment that covers interest.
    pub interest_payment: Money,
    /// Principal plus interest for this period.
    pub total_payment: Money,
    /// The balance left after this period's payment.
    pub remaining_principal: Money,
}

/// Rounds a non-negative decimal amount half-up to a whole currency unit.
pub(crate) fn to_money(value: Decimal, context: &str) -> LoanResult<Money> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| LoanError::overflow(context))
}

/// One period of interest on `balance`, rounded to a whole unit.
pub(crate) fn interest_on(balance: Money, monthly_rate: Decimal) -> LoanResult<Money> {
    if monthly_rate.is_zero() {
        return Ok(0);
    }
    let interest = Decimal::from(balance)
        .checked_mul(monthly_rate)
        .ok_or_else(|| LoanError::overflow("period interest"))?;
    to_money(interest, "period interest")
}
