//! Solvers for the amortizing-loan equation
//!
//! PV = (PMT / i) · (1 − (1 + i)^−n)
//!
//! where `i` is the monthly decimal rate (APR / 100 / 12) and `n` the number
//! of monthly payments. Each `solve_*` function takes the three known
//! variables and returns the fourth. None of them hold state between calls.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LoanCalcError;
use crate::types::{Money, Rate};
use crate::LoanCalcResult;

const RATE_TOLERANCE: Decimal = dec!(0.00001);
const MAX_RATE_ITERATIONS: u32 = 100;
const RATE_DECIMAL_PLACES: u32 = 5;
const MONTHS_PER_YEAR: Decimal = dec!(12);
const CENTS_PER_UNIT: Decimal = dec!(100);
const LN_2: Decimal = dec!(0.6931471805599453094172321215);
const SERIES_CUTOFF: Decimal = dec!(0.00000000000000000000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Stopping rule for the Newton-Raphson rate solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Converged once |f(x) / f'(x)| falls below this.
    pub tolerance: Decimal,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: RATE_TOLERANCE,
            max_iterations: MAX_RATE_ITERATIONS,
        }
    }
}

/// Result of solving for the interest rate.
///
/// `monthly_rate` is the solver's root rounded to five decimal places.
/// `annual_rate_percent` is derived from that rounded value (× 12 × 100), so
/// the two always agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    pub monthly_rate: Rate,
    pub annual_rate_percent: Rate,
    pub iterations: u32,
}

impl RateSolution {
    fn from_monthly(monthly_rate: Rate, iterations: u32) -> LoanCalcResult<Self> {
        let annual_rate_percent = monthly_rate
            .checked_mul(MONTHS_PER_YEAR * dec!(100))
            .ok_or_else(|| out_of_range("annual rate"))?;
        Ok(Self {
            monthly_rate,
            annual_rate_percent,
            iterations,
        })
    }
}

/// Result of solving for the payment amount.
///
/// `first_payment` is only set for a zero-rate loan whose principal does not
/// split into equal cents. It absorbs the leftover cents, and every later
/// installment equals `regular_payment`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentSolution {
    pub regular_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_payment: Option<Money>,
}

impl PaymentSolution {
    /// Amount of the first installment.
    pub fn first_payment_amount(&self) -> Money {
        self.first_payment.unwrap_or(self.regular_payment)
    }

    pub fn is_uneven(&self) -> bool {
        self.first_payment.is_some()
    }

    /// Sum of all `number_of_payments` installments.
    pub fn total(&self, number_of_payments: u32) -> LoanCalcResult<Money> {
        if number_of_payments == 0 {
            return Ok(Decimal::ZERO);
        }
        self.regular_payment
            .checked_mul(Decimal::from(number_of_payments - 1))
            .and_then(|rest| rest.checked_add(self.first_payment_amount()))
            .ok_or_else(|| out_of_range("total of payments"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monthly decimal rate from an annual percentage (4.5 -> 0.00375).
pub fn monthly_rate(annual_rate_percent: Rate) -> Rate {
    annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
}

fn require_non_negative(field: &str, value: Decimal) -> LoanCalcResult<()> {
    if value < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: field.into(),
            reason: format!("{field} must be >= 0 (got {value})"),
        });
    }
    Ok(())
}

fn require_payments(number_of_payments: u32) -> LoanCalcResult<()> {
    if number_of_payments == 0 {
        return Err(LoanCalcError::InvalidInput {
            field: "number_of_payments".into(),
            reason: "Number of payments must be > 0".into(),
        });
    }
    Ok(())
}

fn out_of_range(context: &str) -> LoanCalcError {
    LoanCalcError::DomainError(format!("{context} exceeds the representable decimal range"))
}

/// (1 + rate)^n by binary exponentiation. `None` on overflow.
fn compound(rate: Rate, n: u32) -> Option<Decimal> {
    let mut base = Decimal::ONE.checked_add(rate)?;
    let mut exp = n;
    let mut result = Decimal::ONE;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(base)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(result)
}

/// Natural log for x > 0. Scales x into [0.5, 2] by powers of two, then
/// ln(v) = 2·atanh((v − 1) / (v + 1)).
fn ln(x: Decimal) -> Option<Decimal> {
    if x <= Decimal::ZERO {
        return None;
    }
    let mut val = x;
    let mut k: i64 = 0;
    while val > dec!(2) {
        val /= dec!(2);
        k += 1;
    }
    while val < dec!(0.5) {
        val *= dec!(2);
        k -= 1;
    }
    let u = (val - Decimal::ONE) / (val + Decimal::ONE);
    Some(two_atanh(u) + Decimal::from(k) * LN_2)
}

/// 2·(y + y³/3 + y⁵/5 + ...) for |y| <= 1/3.
fn two_atanh(y: Decimal) -> Decimal {
    let y2 = y * y;
    let mut term = y;
    let mut sum = y;
    for k in 1u32..=60 {
        term *= y2;
        let next = term / Decimal::from(2 * k + 1);
        sum += next;
        if next.abs() < SERIES_CUTOFF {
            break;
        }
    }
    sum * dec!(2)
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// Loan amount that `number_of_payments` payments of `payment_amount` repay.
pub fn solve_principal(
    annual_rate_percent: Rate,
    number_of_payments: u32,
    payment_amount: Money,
) -> LoanCalcResult<Money> {
    require_non_negative("annual_rate_percent", annual_rate_percent)?;
    require_non_negative("payment_amount", payment_amount)?;
    require_payments(number_of_payments)?;

    let i = monthly_rate(annual_rate_percent);
    let n = Decimal::from(number_of_payments);

    if i.is_zero() {
        return n
            .checked_mul(payment_amount)
            .ok_or_else(|| out_of_range("principal"));
    }

    let factor = compound(i, number_of_payments).ok_or_else(|| out_of_range("(1 + i)^n"))?;
    let annuity = payment_amount
        .checked_div(i)
        .ok_or_else(|| out_of_range("payment / monthly rate"))?;

    Ok(annuity * (Decimal::ONE - Decimal::ONE / factor))
}

/// Monthly rate at which `number_of_payments` payments of `payment_amount`
/// repay `principal`, using the default solver settings.
pub fn solve_annual_rate(
    principal: Money,
    number_of_payments: u32,
    payment_amount: Money,
) -> LoanCalcResult<RateSolution> {
    solve_annual_rate_with(
        &SolverConfig::default(),
        principal,
        number_of_payments,
        payment_amount,
    )
}

/// Newton-Raphson on
///
/// f(x) = P·x·(1+x)^n / ((1+x)^n − 1) − PMT
///
/// starting from x₀ = 2·(n·PMT − P) / (n·P), stopping once the step is below
/// `config.tolerance`.
pub fn solve_annual_rate_with(
    config: &SolverConfig,
    principal: Money,
    number_of_payments: u32,
    payment_amount: Money,
) -> LoanCalcResult<RateSolution> {
    require_non_negative("principal", principal)?;
    require_non_negative("payment_amount", payment_amount)?;
    require_payments(number_of_payments)?;

    if principal.is_zero() {
        return Err(LoanCalcError::DomainError(
            "Cannot solve for a rate on a zero principal".into(),
        ));
    }

    let n = Decimal::from(number_of_payments);
    let total_paid = n
        .checked_mul(payment_amount)
        .ok_or_else(|| out_of_range("total of payments"))?;

    if total_paid < principal {
        return Err(LoanCalcError::DomainError(format!(
            "Total of payments {total_paid} is less than the principal {principal}; \
             the implied rate would be negative"
        )));
    }
    if total_paid == principal {
        debug!("payments sum to the principal exactly, rate is zero");
        return RateSolution::from_monthly(Decimal::ZERO, 0);
    }

    let mut x = dec!(2)
        .checked_mul(total_paid - principal)
        .zip(n.checked_mul(principal))
        .and_then(|(excess, scale)| excess.checked_div(scale))
        .ok_or_else(|| out_of_range("initial rate guess"))?;
    let mut last_step = Decimal::ZERO;
    debug!(initial_guess = %x, "solving for monthly rate");

    for iteration in 1..=config.max_iterations {
        let next = newton_step(x, principal, number_of_payments, payment_amount)
            .and_then(|step| x.checked_sub(step).map(|next| (step, next)));
        let (step, next) = match next {
            Some(pair) => pair,
            None => {
                warn!(iteration, rate = %x, "rate solver left the domain of f(x)");
                return Err(LoanCalcError::ConvergenceFailure {
                    function: "solve_annual_rate".into(),
                    iterations: iteration,
                    last_delta: last_step,
                });
            }
        };
        x = next;
        last_step = step;
        debug!(iteration, rate = %x, step = %step, "newton step");

        if step.abs() < config.tolerance {
            let monthly = x.round_dp_with_strategy(
                RATE_DECIMAL_PLACES,
                RoundingStrategy::MidpointAwayFromZero,
            );
            return RateSolution::from_monthly(monthly, iteration);
        }
    }

    warn!(
        iterations = config.max_iterations,
        rate = %x,
        "rate solver did not converge"
    );
    Err(LoanCalcError::ConvergenceFailure {
        function: "solve_annual_rate".into(),
        iterations: config.max_iterations,
        last_delta: last_step,
    })
}

/// f(x) / f'(x), or `None` where either is undefined or overflows.
///
/// f'(x) = P·(x+1)^(n−1)·(x·(x+1)^n + (x+1)^n − n·x − x − 1) / ((x+1)^n − 1)²
fn newton_step(
    x: Rate,
    principal: Money,
    number_of_payments: u32,
    payment_amount: Money,
) -> Option<Decimal> {
    if Decimal::ONE + x <= Decimal::ZERO {
        return None;
    }
    let n = Decimal::from(number_of_payments);
    let growth = compound(x, number_of_payments)?;
    let growth_prev = compound(x, number_of_payments - 1)?;
    let denom = growth.checked_sub(Decimal::ONE)?;

    let f = principal
        .checked_mul(x)?
        .checked_mul(growth)?
        .checked_div(denom)?
        .checked_sub(payment_amount)?;

    let bracket = x
        .checked_mul(growth)?
        .checked_add(growth)?
        .checked_sub(n.checked_mul(x)?)?
        .checked_sub(x)?
        .checked_sub(Decimal::ONE)?;
    let df = principal
        .checked_mul(growth_prev)?
        .checked_mul(bracket)?
        .checked_div(denom.checked_mul(denom)?)?;

    if df.is_zero() {
        return None;
    }
    f.checked_div(df)
}

/// Whole payments of `payment_amount` needed to repay `principal`, rounded
/// down. A final partial payment, if any, is not counted.
pub fn solve_number_of_payments(
    principal: Money,
    annual_rate_percent: Rate,
    payment_amount: Money,
) -> LoanCalcResult<u32> {
    require_non_negative("principal", principal)?;
    require_non_negative("annual_rate_percent", annual_rate_percent)?;
    require_non_negative("payment_amount", payment_amount)?;

    let i = monthly_rate(annual_rate_percent);

    let periods = if i.is_zero() {
        if payment_amount.is_zero() {
            return Err(LoanCalcError::DomainError(
                "A zero payment never repays the loan".into(),
            ));
        }
        principal
            .checked_div(payment_amount)
            .ok_or_else(|| out_of_range("principal / payment"))?
    } else {
        let annuity = payment_amount
            .checked_div(i)
            .ok_or_else(|| out_of_range("payment / monthly rate"))?;
        let headroom = annuity - principal;
        if headroom <= Decimal::ZERO {
            return Err(LoanCalcError::DomainError(format!(
                "Payment {payment_amount} does not exceed the monthly interest on \
                 {principal} at {annual_rate_percent}% APR; the loan never amortizes"
            )));
        }
        let log_arg = annuity
            .checked_div(headroom)
            .ok_or_else(|| out_of_range("payment / (payment - interest)"))?;
        let numerator = ln(log_arg).ok_or_else(|| {
            LoanCalcError::DomainError(format!("Logarithm undefined for {log_arg}"))
        })?;
        let denominator = ln(Decimal::ONE + i).ok_or_else(|| {
            LoanCalcError::DomainError("Logarithm undefined for 1 + monthly rate".into())
        })?;
        numerator
            .checked_div(denominator)
            .ok_or_else(|| LoanCalcError::DivisionByZero {
                context: "ln(1 + monthly rate)".into(),
            })?
    };

    debug!(periods = %periods, "unrounded number of payments");
    periods.floor().to_u32().ok_or_else(|| {
        LoanCalcError::DomainError(format!("{periods} payments is beyond the supported range"))
    })
}

/// Fixed installment that repays `principal` over `number_of_payments`.
///
/// At a zero rate the principal is split in whole cents and any leftover
/// cents are folded into the first payment, so the installments sum to the
/// principal exactly. At a nonzero rate the annuity formula is returned
/// unrounded.
pub fn solve_payment_amount(
    principal: Money,
    annual_rate_percent: Rate,
    number_of_payments: u32,
) -> LoanCalcResult<PaymentSolution> {
    require_non_negative("principal", principal)?;
    require_non_negative("annual_rate_percent", annual_rate_percent)?;
    require_payments(number_of_payments)?;

    let i = monthly_rate(annual_rate_percent);
    if i.is_zero() {
        return split_in_cents(principal, number_of_payments);
    }

    let factor = compound(i, number_of_payments).ok_or_else(|| out_of_range("(1 + i)^n"))?;
    let payment = principal
        .checked_mul(i)
        .and_then(|v| v.checked_mul(factor))
        .ok_or_else(|| out_of_range("payment numerator"))?
        .checked_div(factor - Decimal::ONE)
        .ok_or_else(|| LoanCalcError::DivisionByZero {
            context: "payment annuity factor".into(),
        })?;

    Ok(PaymentSolution {
        regular_payment: payment,
        first_payment: None,
    })
}

fn split_in_cents(principal: Money, number_of_payments: u32) -> LoanCalcResult<PaymentSolution> {
    let total_cents = principal
        .checked_mul(CENTS_PER_UNIT)
        .ok_or_else(|| out_of_range("principal in cents"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .ok_or_else(|| out_of_range("principal in cents"))?;

    let n = i128::from(number_of_payments);
    let regular_cents = total_cents / n;
    let leftover_cents = total_cents % n;
    debug!(regular_cents = %regular_cents, leftover_cents = %leftover_cents, "zero-rate split");

    Ok(PaymentSolution {
        regular_payment: Decimal::from_i128_with_scale(regular_cents, 2),
        first_payment: (leftover_cents != 0)
            .then(|| Decimal::from_i128_with_scale(regular_cents + leftover_cents, 2)),
    })
}

/// Balance still owed after `number_of_payments` payments of `payment_amount`.
pub fn remaining_balance(
    principal: Money,
    annual_rate_percent: Rate,
    number_of_payments: u32,
    payment_amount: Money,
) -> LoanCalcResult<Money> {
    let i = monthly_rate(annual_rate_percent);
    let n = Decimal::from(number_of_payments);
    if i.is_zero() {
        return n
            .checked_mul(payment_amount)
            .map(|paid| principal - paid)
            .ok_or_else(|| out_of_range("total of payments"));
    }
    let factor = compound(i, number_of_payments).ok_or_else(|| out_of_range("(1 + i)^n"))?;
    let grown = principal
        .checked_mul(factor)
        .ok_or_else(|| out_of_range("balance"))?;
    let paid = payment_amount
        .checked_mul(factor - Decimal::ONE)
        .and_then(|v| v.checked_div(i))
        .ok_or_else(|| out_of_range("accumulated payments"))?;
    Ok(grown - paid)
}
