//! Period-by-period repayment schedules.
//!
//! Every schedule is built through [`Projection`], which owns the running
//! balance and forces the final period to retire whatever is left. That is
//! where rounding drift ends up, so the principal components always sum to
//! the original principal and the last remaining balance is exactly zero.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::engine::annuity_installment;
use crate::error::LoanError;
use crate::types::{
    LoanParameters, LoanSummary, Money, PaymentMethod, ScheduleEntry, interest_on,
};
use crate::LoanResult;

/// Builds the full repayment schedule, one entry per month.
///
/// The result always has exactly `term_months` entries and is identical for
/// identical parameters. Callers that only show a prefix should slice the
/// returned vector rather than alter it.
///
/// # Errors
///
/// Returns [`LoanError::InvalidInput`] for invalid parameters and
/// [`LoanError::Overflow`] when an amount cannot be represented.
pub fn generate_schedule(params: &LoanParameters) -> LoanResult<Vec<ScheduleEntry>> {
    params.validate()?;
    let rate = params.monthly_rate();

    let schedule = match params.payment_method {
        PaymentMethod::Annuity => annuity_schedule(params.principal, rate, params.term_months)?,
        PaymentMethod::EqualPrincipal => {
            equal_principal_schedule(params.principal, rate, params.term_months)?
        }
        PaymentMethod::InterestOnlyBalloon => {
            balloon_schedule(params.principal, rate, params.term_months)?
        }
    };

    debug!(
        method = %params.payment_method,
        periods = schedule.len(),
        %rate,
        "generated repayment schedule"
    );
    Ok(schedule)
}

/// Derives the summary figures from a schedule.
///
/// `monthly_payment` is the first period's total for equal-principal and
/// annuity schedules and the first period's interest for balloon schedules.
///
/// # Errors
///
/// Returns an error for an empty schedule or when the totals overflow.
pub fn summarize(method: PaymentMethod, schedule: &[ScheduleEntry]) -> LoanResult<LoanSummary> {
    let first = schedule
        .first()
        .ok_or_else(|| LoanError::invalid("schedule", "cannot summarize an empty schedule"))?;

    let mut total_payment: Money = 0;
    let mut total_interest: Money = 0;
    for entry in schedule {
        total_payment = total_payment
            .checked_add(entry.total_payment)
            .ok_or_else(|| LoanError::overflow("total payment"))?;
        total_interest = total_interest
            .checked_add(entry.interest_payment)
            .ok_or_else(|| LoanError::overflow("total interest"))?;
    }

    let monthly_payment = match method {
        PaymentMethod::Annuity | PaymentMethod::EqualPrincipal => first.total_payment,
        PaymentMethod::InterestOnlyBalloon => first.interest_payment,
    };

    Ok(LoanSummary {
        monthly_payment,
        total_payment,
        total_interest,
    })
}

/// Running state while a schedule is being laid out.
struct Projection {
    balance: Money,
    term_months: u32,
    entries: Vec<ScheduleEntry>,
}

impl Projection {
    fn new(principal: Money, term_months: u32) -> Self {
        Self {
            balance: principal,
            term_months,
            entries: Vec::with_capacity(term_months as usize),
        }
    }

    fn next_period(&self) -> u32 {
        self.entries.len() as u32 + 1
    }

    fn is_final_period(&self) -> bool {
        self.next_period() == self.term_months
    }

    /// Records one period. The principal part never exceeds the balance, and
    /// in the final period it is replaced by the whole remaining balance.
    fn record(&mut self, principal_payment: Money, interest_payment: Money) -> LoanResult<()> {
        let principal_payment = if self.is_final_period() {
            self.balance
        } else {
            principal_payment.min(self.balance)
        };
        self.balance -= principal_payment;

        let total_payment = principal_payment
            .checked_add(interest_payment)
            .ok_or_else(|| LoanError::overflow("period payment"))?;
        let entry = ScheduleEntry {
            period_index: self.next_period(),
            principal_payment,
            interest_payment,
            total_payment,
            remaining_principal: self.balance,
        };
        trace!(?entry, "scheduled period");
        self.entries.push(entry);
        Ok(())
    }

    fn finish(self) -> Vec<ScheduleEntry> {
        self.entries
    }
}

// Level installment; the principal part grows as interest on the shrinking
// balance falls.
fn annuity_schedule(
    principal: Money,
    monthly_rate: Decimal,
    term_months: u32,
) -> LoanResult<Vec<ScheduleEntry>> {
    let installment = annuity_installment(principal, monthly_rate, term_months)?;
    let mut projection = Projection::new(principal, term_months);

    for _ in 0..term_months {
        let interest = interest_on(projection.balance, monthly_rate)?;
        projection.record(installment.saturating_sub(interest), interest)?;
    }

    Ok(projection.finish())
}

fn equal_principal_schedule(
    principal: Money,
    monthly_rate: Decimal,
    term_months: u32,
) -> LoanResult<Vec<ScheduleEntry>> {
    let fixed_principal = principal / Money::from(term_months);
    let mut projection = Projection::new(principal, term_months);

    for _ in 0..term_months {
        let interest = interest_on(projection.balance, monthly_rate)?;
        projection.record(fixed_principal, interest)?;
    }

    Ok(projection.finish())
}

// Interest only; the final period's forced payoff carries the whole principal.
fn balloon_schedule(
    principal: Money,
    monthly_rate: Decimal,
    term_months: u32,
) -> LoanResult<Vec<ScheduleEntry>> {
    let mut projection = Projection::new(principal, term_months);

    for _ in 0..term_months {
        let interest = interest_on(projection.balance, monthly_rate)?;
        projection.record(0, interest)?;
    }

    Ok(projection.finish())
}
