use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::loan_math::{self, SolverConfig};
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money, Rate, Unknown};
use crate::error::LoanCalcError;
use crate::LoanCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A fully resolved loan: the three inputs plus the solved value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub solved_for: Unknown,
    pub principal: Money,
    pub annual_rate_percent: Rate,
    pub monthly_rate: Rate,
    pub number_of_payments: u32,
    /// Regular installment. See `first_payment` for an uneven zero-rate split.
    pub payment_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_payment: Option<Money>,
    pub total_paid: Money,
    pub total_interest: Money,
}

fn total_of_payments(payment: Money, number_of_payments: u32) -> LoanCalcResult<Money> {
    payment
        .checked_mul(Decimal::from(number_of_payments))
        .ok_or_else(|| {
            LoanCalcError::DomainError(format!(
                "{number_of_payments} payments of {payment} exceed the representable decimal range"
            ))
        })
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Solve whichever of the four loan variables `terms` leaves unset.
pub fn calculate_loan(
    terms: &LoanTerms,
    config: &SolverConfig,
) -> LoanCalcResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let unknown = terms.unknown()?;
    debug!(?unknown, "dispatching loan calculation");

    let (output, methodology) = match unknown {
        Unknown::PaymentAmount => {
            let principal = terms.principal.unwrap_or_default();
            let rate = terms.annual_rate_percent.unwrap_or_default();
            let n = terms.number_of_payments.unwrap_or_default();
            let solution = loan_math::solve_payment_amount(principal, rate, n)?;

            let methodology = if let Some(first) = solution.first_payment {
                warnings.push(format!(
                    "Principal does not divide evenly into {n} payments: first payment is {first}, \
                     then {} thereafter",
                    solution.regular_payment
                ));
                "Zero-rate split in whole cents, remainder folded into the first payment"
            } else if loan_math::monthly_rate(rate).is_zero() {
                "Zero-rate split in whole cents"
            } else {
                "Annuity payment: PMT = P·i·(1+i)^n / ((1+i)^n − 1)"
            };

            let total_paid = solution.total(n)?;
            // a zero-rate split repays the principal rounded to the cent
            let financed = if loan_math::monthly_rate(rate).is_zero() {
                principal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            } else {
                principal
            };
            if financed != principal {
                warnings.push(format!(
                    "Principal {principal} rounded to {financed} to split into whole cents"
                ));
            }
            (
                LoanOutput {
                    solved_for: unknown,
                    principal,
                    annual_rate_percent: rate,
                    monthly_rate: loan_math::monthly_rate(rate),
                    number_of_payments: n,
                    payment_amount: solution.regular_payment,
                    first_payment: solution.first_payment,
                    total_paid,
                    total_interest: total_paid - financed,
                },
                methodology,
            )
        }
        Unknown::AnnualRate => {
            let principal = terms.principal.unwrap_or_default();
            let n = terms.number_of_payments.unwrap_or_default();
            let payment = terms.payment_amount.unwrap_or_default();
            let solution = loan_math::solve_annual_rate_with(config, principal, n, payment)?;

            if solution.iterations > 0 {
                warnings.push(format!(
                    "Monthly rate rounded to 5 decimal places after {} Newton-Raphson iterations",
                    solution.iterations
                ));
            }

            let total_paid = total_of_payments(payment, n)?;
            (
                LoanOutput {
                    solved_for: unknown,
                    principal,
                    annual_rate_percent: solution.annual_rate_percent,
                    monthly_rate: solution.monthly_rate,
                    number_of_payments: n,
                    payment_amount: payment,
                    first_payment: None,
                    total_paid,
                    total_interest: total_paid - principal,
                },
                "Newton-Raphson on the annuity payment equation for the monthly rate",
            )
        }
        Unknown::NumberOfPayments => {
            let principal = terms.principal.unwrap_or_default();
            let rate = terms.annual_rate_percent.unwrap_or_default();
            let payment = terms.payment_amount.unwrap_or_default();
            let n = loan_math::solve_number_of_payments(principal, rate, payment)?;

            let residual = loan_math::remaining_balance(principal, rate, n, payment)?;
            if residual > Decimal::ZERO {
                warnings.push(format!(
                    "{n} full payments leave a residual balance of {}",
                    residual.round_dp(2)
                ));
            }

            let total_paid = total_of_payments(payment, n)?;
            (
                LoanOutput {
                    solved_for: unknown,
                    principal,
                    annual_rate_percent: rate,
                    monthly_rate: loan_math::monthly_rate(rate),
                    number_of_payments: n,
                    payment_amount: payment,
                    first_payment: None,
                    total_paid,
                    total_interest: total_paid - principal,
                },
                "n = ln(PMT/i ÷ (PMT/i − P)) / ln(1+i), truncated to whole payments",
            )
        }
        Unknown::Principal => {
            let rate = terms.annual_rate_percent.unwrap_or_default();
            let n = terms.number_of_payments.unwrap_or_default();
            let payment = terms.payment_amount.unwrap_or_default();
            let principal = loan_math::solve_principal(rate, n, payment)?;

            let total_paid = total_of_payments(payment, n)?;
            (
                LoanOutput {
                    solved_for: unknown,
                    principal,
                    annual_rate_percent: rate,
                    monthly_rate: loan_math::monthly_rate(rate),
                    number_of_payments: n,
                    payment_amount: payment,
                    first_payment: None,
                    total_paid,
                    total_interest: total_paid - principal,
                },
                "Present value of an annuity: PV = (PMT/i)·(1 − (1+i)^−n)",
            )
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, terms, warnings, elapsed, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_payment_uneven_split() {
        let terms = LoanTerms::for_payment(dec!(1000), dec!(0), 3);
        let out = calculate_loan(&terms, &SolverConfig::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.solved_for, Unknown::PaymentAmount);
        assert_eq!(r.payment_amount, dec!(333.33));
        assert_eq!(r.first_payment, Some(dec!(333.34)));
        assert_eq!(r.total_paid, dec!(1000));
        assert_eq!(r.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_calculate_payment_sub_cent_principal() {
        let terms = LoanTerms::for_payment(dec!(10.005), dec!(0), 2);
        let out = calculate_loan(&terms, &SolverConfig::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.principal, dec!(10.005));
        assert_eq!(r.total_paid, dec!(10.01));
        assert_eq!(r.total_interest, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("rounded to 10.01")));
    }

    #[test]
    fn test_calculate_rate_reports_annual_percent() {
        let terms = LoanTerms::for_rate(dec!(10000), 60, dec!(188.71));
        let out = calculate_loan(&terms, &SolverConfig::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.monthly_rate, dec!(0.00417));
        assert_eq!(r.annual_rate_percent, dec!(5.004));
        assert!(r.total_interest > dec!(1322));
    }

    #[test]
    fn test_calculate_term_warns_on_residual() {
        let terms = LoanTerms::for_term(dec!(1000), dec!(0), dec!(333));
        let out = calculate_loan(&terms, &SolverConfig::default()).unwrap();
        assert_eq!(out.result.number_of_payments, 3);
        assert!(out.warnings[0].contains("residual balance of 1"));
    }

    #[test]
    fn test_calculate_principal() {
        let terms = LoanTerms::for_principal(dec!(0), 12, dec!(100));
        let out = calculate_loan(&terms, &SolverConfig::default()).unwrap();
        assert_eq!(out.result.principal, dec!(1200));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_calculate_propagates_domain_error() {
        let terms = LoanTerms::for_term(dec!(10000), dec!(5), dec!(40));
        let err = calculate_loan(&terms, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, LoanCalcError::DomainError(_)));
    }

    #[test]
    fn test_metadata_populated() {
        let terms = LoanTerms::for_payment(dec!(1200), dec!(0), 12);
        let out = calculate_loan(&terms, &SolverConfig::default()).unwrap();
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["principal"], "1200");
    }
}
