//! The hosting-side loan calculator: current form values plus on-demand quotes.
//!
//! A form keeps one [`LoanCalculator`], feeds it every edit and asks for a
//! fresh [`LoanQuote`] after each change. Nothing is cached, so a quote always
//! reflects the parameters at the moment it was requested.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::summary_from_schedule;
use crate::error::LoanError;
use crate::format::AmountFormat;
use crate::schedule::generate_schedule;
use crate::types::{LoanParameters, LoanSummary, Money, PaymentMethod, ScheduleEntry};
use crate::LoanResult;

/// Longest term the loan form offers.
pub const DEFAULT_MAX_TERM_MONTHS: u32 = 360;

/// Number of schedule rows the form shows by default.
pub const DEFAULT_PREVIEW_PERIODS: usize = 5;

/// Calculator settings, usually loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Separators used to read and render amounts and rates.
    pub amount_format: AmountFormat,
    /// Longest term the form accepts, in months.
    pub max_term_months: u32,
    /// Schedule rows shown before the table is expanded.
    pub preview_periods: usize,
    /// Values a fresh form starts from.
    pub initial: LoanParameters,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            amount_format: AmountFormat::default(),
            max_term_months: DEFAULT_MAX_TERM_MONTHS,
            preview_periods: DEFAULT_PREVIEW_PERIODS,
            initial: LoanParameters::new(100_000_000, dec!(10), 12, PaymentMethod::Annuity),
        }
    }
}

impl CalculatorConfig {
    /// Parses and validates a JSON config; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::Config`] for malformed JSON and
    /// [`LoanError::InvalidInput`] for settings that cannot work.
    pub fn from_json(json: &str) -> LoanResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LoanResult<()> {
        self.amount_format.validate()?;
        if self.max_term_months == 0 {
            return Err(LoanError::invalid("max_term_months", "must be at least one month"));
        }
        self.initial.validate().map_err(|err| match err {
            LoanError::InvalidInput { field, reason } => LoanError::InvalidInput {
                field: format!("initial.{field}"),
                reason,
            },
            other => other,
        })?;
        if self.initial.term_months > self.max_term_months {
            return Err(LoanError::invalid(
                "initial.term_months",
                format!("exceeds the {} month cap", self.max_term_months),
            ));
        }
        Ok(())
    }
}

/// A computed loan: the parameters it was built from, the headline figures
/// and the full schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    /// The form values the quote was computed from.
    pub parameters: LoanParameters,
    /// Headline figures derived from `schedule`.
    pub summary: LoanSummary,
    /// One entry per month, in order.
    pub schedule: Vec<ScheduleEntry>,
}

/// Headline figures rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedSummary {
    /// Grouped monthly payment, e.g. `8.791.589`.
    pub monthly_payment: String,
    /// Grouped sum of every payment.
    pub total_payment: String,
    /// Grouped sum of every interest payment.
    pub total_interest: String,
    /// Annual rate with the locale decimal mark and a `%` suffix.
    pub annual_rate: String,
}

impl LoanQuote {
    /// The first `periods` rows, or the whole schedule if it is shorter.
    pub fn preview(&self, periods: usize) -> &[ScheduleEntry] {
        &self.schedule[..periods.min(self.schedule.len())]
    }

    pub fn formatted(&self, format: &AmountFormat) -> FormattedSummary {
        FormattedSummary {
            monthly_payment: format.format(self.summary.monthly_payment),
            total_payment: format.format(self.summary.total_payment),
            total_interest: format.format(self.summary.total_interest),
            annual_rate: format.format_rate(self.parameters.annual_rate_percent),
        }
    }
}

/// Holds the values currently entered in a loan form.
#[derive(Debug, Clone)]
pub struct LoanCalculator {
    config: CalculatorConfig,
    params: LoanParameters,
}

impl Default for LoanCalculator {
    fn default() -> Self {
        Self::new(CalculatorConfig::default())
    }
}

impl LoanCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        let params = config.initial.clone();
        Self { config, params }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn parameters(&self) -> &LoanParameters {
        &self.params
    }

    pub fn preview_len(&self) -> usize {
        self.config.preview_periods
    }

    pub fn set_principal(&mut self, principal: Money) {
        self.params.principal = principal;
    }

    /// Parses the amount box. On failure the previous principal is kept.
    pub fn set_principal_text(&mut self, text: &str) -> LoanResult<Money> {
        let principal = self.config.amount_format.parse(text)?;
        self.params.principal = principal;
        Ok(principal)
    }

    pub fn set_rate(&mut self, annual_rate_percent: Decimal) {
        self.params.annual_rate_percent = annual_rate_percent;
    }

    /// Parses the rate box. On failure the previous rate is kept.
    pub fn set_rate_text(&mut self, text: &str) -> LoanResult<Decimal> {
        let rate = self.config.amount_format.parse_rate(text)?;
        self.params.annual_rate_percent = rate;
        Ok(rate)
    }

    /// Sets the term, rejecting zero and anything past the configured cap.
    pub fn set_term_months(&mut self, term_months: u32) -> LoanResult<()> {
        if term_months == 0 || term_months > self.config.max_term_months {
            return Err(LoanError::invalid(
                "term_months",
                format!("must be between 1 and {}", self.config.max_term_months),
            ));
        }
        self.params.term_months = term_months;
        Ok(())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.params.payment_method = method;
    }

    /// Applies the selector value (`ANNUITY`, `EQUAL_PRINCIPAL`, ...).
    pub fn set_payment_method_text(&mut self, text: &str) -> LoanResult<PaymentMethod> {
        let method = text.parse::<PaymentMethod>()?;
        self.params.payment_method = method;
        Ok(method)
    }

    /// Recomputes the summary and schedule for the current values, including
    /// the selected payment method.
    ///
    /// # Errors
    ///
    /// Returns the engine's validation error when the current values cannot
    /// produce a loan, so the form can hide the schedule instead of showing
    /// meaningless figures.
    pub fn quote(&self) -> LoanResult<LoanQuote> {
        let parameters = self.params.clone();
        let schedule = generate_schedule(&parameters)?;
        let summary = summary_from_schedule(&parameters, &schedule)?;
        debug!(
            method = %parameters.payment_method,
            monthly_payment = summary.monthly_payment,
            "quoted loan"
        );
        Ok(LoanQuote {
            parameters,
            summary,
            schedule,
        })
    }
}
