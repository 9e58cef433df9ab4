pub mod calculator;
pub mod error;
pub mod loan_math;
pub mod types;

pub use error::LoanCalcError;
pub use types::*;

/// Standard result type for all loan calculations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
