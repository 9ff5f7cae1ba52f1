//! General functions related to finance.
//!
//! Loans are amortised with level (equal) periodic payments. Degenerate loan terms (a zero
//! interest rate, a zero lifetime or zero payments per year) are rejected with an error rather
//! than producing infinite or NaN payments.
use crate::units::{Dimensionless, Money};
use anyhow::{Result, ensure};

/// Check that the terms of a loan allow it to be amortised
fn check_loan_terms(rate: Dimensionless, lifetime: u32, payments_per_year: u32) -> Result<()> {
    ensure!(
        rate.is_finite() && rate > Dimensionless(0.0),
        "Interest rate must be a finite number greater than zero (got {})",
        rate.value()
    );
    ensure!(lifetime > 0, "Loan lifetime cannot be zero");
    ensure!(payments_per_year > 0, "Payments per year cannot be zero");

    Ok(())
}

/// Calculates the capital recovery factor (CRF) for a number of periods and a periodic rate.
///
/// The CRF is the fraction of the principal which must be paid each period to fully repay it by
/// the end of the final period. The caller is responsible for checking that the rate is non-zero.
fn capital_recovery_factor(periods: f64, periodic_rate: Dimensionless) -> Dimensionless {
    let discount = (Dimensionless(1.0) + periodic_rate).powf(-periods);
    periodic_rate / (Dimensionless(1.0) - discount)
}

/// Calculates the fixed periodic payment which fully amortises `principal`.
///
/// # Arguments
///
/// * `principal` - The initial amount owed
/// * `rate` - Annual interest rate (e.g. 0.05 for 5%)
/// * `lifetime` - Number of years over which the loan is repaid
/// * `payments_per_year` - Number of payments made each year
///
/// # Returns
///
/// The payment made each period, or an error if the rate, lifetime or payments per year are
/// zero.
pub fn level_payment(
    principal: Money,
    rate: Dimensionless,
    lifetime: u32,
    payments_per_year: u32,
) -> Result<Money> {
    check_loan_terms(rate, lifetime, payments_per_year)?;

    let periodic_rate = rate / Dimensionless(payments_per_year as f64);
    let periods = lifetime as f64 * payments_per_year as f64;

    Ok(principal * capital_recovery_factor(periods, periodic_rate))
}

/// Calculates the principal still owed after `age` years of level payments.
///
/// The result is floored at zero, so loans older than their lifetime are fully repaid.
///
/// # Arguments
///
/// * `principal` - The initial amount owed
/// * `age` - Number of years for which payments have been made
/// * `rate` - Annual interest rate
/// * `lifetime` - Number of years over which the loan is repaid
/// * `payments_per_year` - Number of payments made each year
pub fn remaining_principal(
    principal: Money,
    age: u32,
    rate: Dimensionless,
    lifetime: u32,
    payments_per_year: u32,
) -> Result<Money> {
    let payment = level_payment(principal, rate, lifetime, payments_per_year)?;
    let periodic_rate = rate / Dimensionless(payments_per_year as f64);
    let payments_made = age as f64 * payments_per_year as f64;

    let growth = (Dimensionless(1.0) + periodic_rate).powf(payments_made);
    let accrued = principal * growth;
    let paid = payment * ((growth - Dimensionless(1.0)) / periodic_rate);
    let remaining = accrued - paid;

    Ok(if remaining > Money(0.0) {
        remaining
    } else {
        Money(0.0)
    })
}

/// Calculates [`remaining_principal`] for parallel slices of principals and ages.
///
/// All loans share the same rate, lifetime and payment frequency.
pub fn remaining_principals(
    principals: &[Money],
    ages: &[u32],
    rate: Dimensionless,
    lifetime: u32,
    payments_per_year: u32,
) -> Result<Vec<Money>> {
    ensure!(
        principals.len() == ages.len(),
        "Got {} principals but {} ages",
        principals.len(),
        ages.len()
    );

    principals
        .iter()
        .zip(ages)
        .map(|(&principal, &age)| {
            remaining_principal(principal, age, rate, lifetime, payments_per_year)
        })
        .collect()
}
