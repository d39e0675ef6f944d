//! `vn_amortization` computes consumer loan repayments for a VND loan marketplace.
//!
//! It supports three repayment methods:
//! - **Annuity**: a fixed total payment every month; the interest share shrinks
//!   as the balance falls.
//! - **Equal principal**: a fixed principal share every month plus interest on
//!   the declining balance, so payments fall over time.
//! - **Interest-only balloon**: interest every month and the whole principal in
//!   the last one.
//!
//! All amounts are whole VND (`u64`). Intermediate math runs on
//! [`rust_decimal::Decimal`], amounts are rounded half-up, and the last period
//! absorbs any rounding drift so the principal always adds back up exactly.
//!
//! ## Usage
//!
//! ```rust
//! use vn_amortization::{
//!     compute_summary, format_amount, generate_schedule, parse_amount, LoanParameters,
//!     PaymentMethod,
//! };
//! use rust_decimal_macros::dec;
//!
//! fn main() -> Result<(), vn_amortization::LoanError> {
//!     let params = LoanParameters::new(
//!         parse_amount("100.000.000")?,
//!         dec!(10),
//!         12,
//!         PaymentMethod::Annuity,
//!     );
//!
//!     let summary = compute_summary(&params)?;
//!     println!("Monthly payment: {}", format_amount(summary.monthly_payment));
//!     println!("Total interest:  {}", format_amount(summary.total_interest));
//!
//!     for entry in generate_schedule(&params)?.iter().take(5) {
//!         println!(
//!             "#{:<3} principal {:>12} interest {:>10} balance {:>12}",
//!             entry.period_index,
//!             format_amount(entry.principal_payment),
//!             format_amount(entry.interest_payment),
//!             format_amount(entry.remaining_principal),
//!         );
//!     }
//!
//!     assert_eq!(format_amount(summary.monthly_payment), "8.791.589");
//!     Ok(())
//! }
//! ```

pub mod calculator;
pub mod engine;
pub mod error;
pub mod format;
pub mod schedule;
pub mod types;

pub use calculator::{CalculatorConfig, FormattedSummary, LoanCalculator, LoanQuote};
pub use engine::{
    annuity_installment, compare_payment_methods, compute_summary, monthly_rate,
    summary_from_schedule, LoanComparison,
};
pub use error::LoanError;
pub use format::{format_amount, parse_amount, AmountFormat};
pub use schedule::{generate_schedule, summarize};
pub use types::{LoanParameters, LoanSummary, Money, PaymentMethod, ScheduleEntry};

pub type LoanResult<T> = Result<T, LoanError>;
