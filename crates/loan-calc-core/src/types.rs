use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::LoanCalcResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%) unless the name says `percent`.
pub type Rate = Decimal;

/// The loan variable a calculation solves for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unknown {
    Principal,
    AnnualRate,
    NumberOfPayments,
    PaymentAmount,
}

impl Unknown {
    pub fn label(&self) -> &'static str {
        match self {
            Unknown::Principal => "Principal",
            Unknown::AnnualRate => "APR",
            Unknown::NumberOfPayments => "Number of Payments",
            Unknown::PaymentAmount => "Monthly Amount",
        }
    }
}

/// The four loan variables. Exactly one must be left unset; it is the one
/// being solved for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    /// Nominal annual rate as a percentage (4.5 = 4.5%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_percent: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_payments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<Money>,
}

impl LoanTerms {
    pub fn for_payment(
        principal: Money,
        annual_rate_percent: Rate,
        number_of_payments: u32,
    ) -> Self {
        Self {
            principal: Some(principal),
            annual_rate_percent: Some(annual_rate_percent),
            number_of_payments: Some(number_of_payments),
            payment_amount: None,
        }
    }

    pub fn for_rate(principal: Money, number_of_payments: u32, payment_amount: Money) -> Self {
        Self {
            principal: Some(principal),
            annual_rate_percent: None,
            number_of_payments: Some(number_of_payments),
            payment_amount: Some(payment_amount),
        }
    }

    pub fn for_term(principal: Money, annual_rate_percent: Rate, payment_amount: Money) -> Self {
        Self {
            principal: Some(principal),
            annual_rate_percent: Some(annual_rate_percent),
            number_of_payments: None,
            payment_amount: Some(payment_amount),
        }
    }

    pub fn for_principal(
        annual_rate_percent: Rate,
        number_of_payments: u32,
        payment_amount: Money,
    ) -> Self {
        Self {
            principal: None,
            annual_rate_percent: Some(annual_rate_percent),
            number_of_payments: Some(number_of_payments),
            payment_amount: Some(payment_amount),
        }
    }

    /// Identify the single missing field.
    pub fn unknown(&self) -> LoanCalcResult<Unknown> {
        let missing: Vec<Unknown> = [
            (self.principal.is_none(), Unknown::Principal),
            (self.annual_rate_percent.is_none(), Unknown::AnnualRate),
            (self.number_of_payments.is_none(), Unknown::NumberOfPayments),
            (self.payment_amount.is_none(), Unknown::PaymentAmount),
        ]
        .into_iter()
        .filter_map(|(is_missing, field)| is_missing.then_some(field))
        .collect();

        match missing.as_slice() {
            [single] => Ok(*single),
            [] => Err(LoanCalcError::InvalidInput {
                field: "loan_terms".into(),
                reason: "All four values supplied; leave exactly one unset to solve for it".into(),
            }),
            _ => Err(LoanCalcError::InvalidInput {
                field: "loan_terms".into(),
                reason: format!(
                    "{} values missing; exactly three of principal, annual_rate_percent, \
                     number_of_payments and payment_amount are required",
                    missing.len()
                ),
            }),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_single_missing_field() {
        let terms = LoanTerms::for_rate(dec!(10000), 60, dec!(188.71));
        assert_eq!(terms.unknown().unwrap(), Unknown::AnnualRate);
    }

    #[test]
    fn test_unknown_rejects_fully_specified_terms() {
        let terms = LoanTerms {
            principal: Some(dec!(1000)),
            annual_rate_percent: Some(dec!(5)),
            number_of_payments: Some(12),
            payment_amount: Some(dec!(85.61)),
        };
        assert!(matches!(
            terms.unknown(),
            Err(LoanCalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unknown_rejects_two_missing_fields() {
        let terms = LoanTerms {
            principal: Some(dec!(1000)),
            ..Default::default()
        };
        let err = terms.unknown().unwrap_err();
        assert!(err.to_string().contains("3 values missing"));
    }

    #[test]
    fn test_loan_terms_deserialize_with_missing_field() {
        let json = r#"{"principal": "1200", "annual_rate_percent": "0", "number_of_payments": 12}"#;
        let terms: LoanTerms = serde_json::from_str(json).unwrap();
        assert_eq!(terms.unknown().unwrap(), Unknown::PaymentAmount);
        assert_eq!(terms.principal, Some(dec!(1200)));
    }
}
