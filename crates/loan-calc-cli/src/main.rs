mod commands;
mod display;
mod input;
mod logging;
mod output;
mod session;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;
use std::process;

use commands::loan::{PaymentArgs, PrincipalArgs, RateArgs, SolveArgs, TermArgs};
use loan_calc_core::loan_math::SolverConfig;

/// Fixed-rate loan calculator
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Fixed-rate loan calculator",
    long_about = "Solve for the monthly payment, annual rate, number of payments or \
                  principal of a fixed-rate, monthly-amortizing loan given the other \
                  three values. Runs an interactive menu when no subcommand is given."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, default_value = "json", global = true, env = "LOANCALC_OUTPUT")]
    output: OutputFormat,

    /// Log solver progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Newton-Raphson iteration cap for the rate solver
    #[arg(
        long,
        default_value_t = 100,
        global = true,
        env = "LOANCALC_MAX_ITERATIONS"
    )]
    max_iterations: u32,

    /// Newton-Raphson convergence tolerance for the rate solver
    #[arg(
        long,
        default_value = "0.00001",
        global = true,
        env = "LOANCALC_TOLERANCE"
    )]
    tolerance: Decimal,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the monthly payment
    Payment(PaymentArgs),
    /// Solve for the annual percentage rate
    Rate(RateArgs),
    /// Solve for the number of monthly payments
    Term(TermArgs),
    /// Solve for the principal
    Principal(PrincipalArgs),
    /// Solve whichever value is missing from JSON loan terms
    Solve(SolveArgs),
    /// Run the interactive menu
    Interactive,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let config = SolverConfig {
        tolerance: cli.tolerance,
        max_iterations: cli.max_iterations,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> =
        match cli.command.unwrap_or(Commands::Interactive) {
            Commands::Payment(args) => commands::loan::run_payment(args, &config),
            Commands::Rate(args) => commands::loan::run_rate(args, &config),
            Commands::Term(args) => commands::loan::run_term(args, &config),
            Commands::Principal(args) => commands::loan::run_principal(args, &config),
            Commands::Solve(args) => commands::loan::run_solve(args, &config),
            Commands::Interactive => match session::run_interactive(config) {
                Ok(()) => process::exit(0),
                Err(e) => {
                    eprintln!("{}: {}", "error".red().bold(), e);
                    process::exit(1);
                }
            },
            Commands::Version => {
                println!("loancalc {}", env!("CARGO_PKG_VERSION"));
                return;
            }
        };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
