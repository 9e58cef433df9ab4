use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::calculator;
use loan_calc_core::loan_math::SolverConfig;
use loan_calc_core::LoanTerms;

use crate::input;

/// Arguments for solving the monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan amount (e.g. 50000.00)
    #[arg(long)]
    pub principal: Decimal,

    /// Annual percentage rate (e.g. 4.5 for 4.5%)
    #[arg(long, alias = "apr")]
    pub rate: Decimal,

    /// Number of monthly payments
    #[arg(long, alias = "months")]
    pub payments: u32,
}

/// Arguments for solving the annual rate
#[derive(Args)]
pub struct RateArgs {
    /// Loan amount (e.g. 50000.00)
    #[arg(long)]
    pub principal: Decimal,

    /// Number of monthly payments
    #[arg(long, alias = "months")]
    pub payments: u32,

    /// Monthly payment amount (e.g. 1741.11)
    #[arg(long, alias = "monthly-amount")]
    pub payment: Decimal,
}

/// Arguments for solving the number of payments
#[derive(Args)]
pub struct TermArgs {
    /// Loan amount (e.g. 50000.00)
    #[arg(long)]
    pub principal: Decimal,

    /// Annual percentage rate (e.g. 4.5 for 4.5%)
    #[arg(long, alias = "apr")]
    pub rate: Decimal,

    /// Monthly payment amount (e.g. 1741.11)
    #[arg(long, alias = "monthly-amount")]
    pub payment: Decimal,
}

/// Arguments for solving the principal
#[derive(Args)]
pub struct PrincipalArgs {
    /// Annual percentage rate (e.g. 4.5 for 4.5%)
    #[arg(long, alias = "apr")]
    pub rate: Decimal,

    /// Number of monthly payments
    #[arg(long, alias = "months")]
    pub payments: u32,

    /// Monthly payment amount (e.g. 1741.11)
    #[arg(long, alias = "monthly-amount")]
    pub payment: Decimal,
}

/// Arguments for solving whichever value a JSON document leaves out
#[derive(Args)]
pub struct SolveArgs {
    /// Path to JSON loan terms with exactly one field omitted (or pipe on stdin)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payment(
    args: PaymentArgs,
    config: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    solve(
        &LoanTerms::for_payment(args.principal, args.rate, args.payments),
        config,
    )
}

pub fn run_rate(
    args: RateArgs,
    config: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    solve(
        &LoanTerms::for_rate(args.principal, args.payments, args.payment),
        config,
    )
}

pub fn run_term(
    args: TermArgs,
    config: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    solve(
        &LoanTerms::for_term(args.principal, args.rate, args.payment),
        config,
    )
}

pub fn run_principal(
    args: PrincipalArgs,
    config: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    solve(
        &LoanTerms::for_principal(args.rate, args.payments, args.payment),
        config,
    )
}

pub fn run_solve(
    args: SolveArgs,
    config: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.input {
        input::file::read_terms(path)?
    } else if let Some(terms) = input::stdin::read_stdin_terms()? {
        terms
    } else {
        return Err("--input <file.json> or stdin required to solve from loan terms".into());
    };
    solve(&terms, config)
}

fn solve(
    terms: &LoanTerms,
    config: &SolverConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let result = calculator::calculate_loan(terms, config)?;
    Ok(serde_json::to_value(result)?)
}
