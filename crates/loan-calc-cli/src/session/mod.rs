//! Interactive menu session
//!
//! Collects three known loan values, solves for the fourth and optionally
//! keeps a summary line in memory until the session ends.

pub mod prompt;

use std::io::{self, BufRead, Write};
use tracing::{debug, info};

use loan_calc_core::calculator;
use loan_calc_core::loan_math::SolverConfig;
use loan_calc_core::{LoanTerms, Unknown};

use crate::display;
use prompt::{AmountField, Prompter};

const MENU_RULE: &str =
    "+---------------------------------------------------------------------+";

/// Run a session on the process's stdin and stdout.
pub fn run_interactive(config: SolverConfig) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(stdin.lock(), stdout.lock(), config).run()
}

/// Menu entry -> value to solve for.
fn menu_target(choice: u8) -> Option<Unknown> {
    match choice {
        1 => Some(Unknown::PaymentAmount),
        2 => Some(Unknown::AnnualRate),
        3 => Some(Unknown::NumberOfPayments),
        4 => Some(Unknown::Principal),
        _ => None,
    }
}

pub struct Session<R, W> {
    prompter: Prompter<R, W>,
    config: SolverConfig,
    saved_results: Vec<String>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, out: W, config: SolverConfig) -> Self {
        Self {
            prompter: Prompter::new(input, out),
            config,
            saved_results: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn saved_results(&self) -> &[String] {
        &self.saved_results
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.prompter.into_output()
    }

    /// Loop over the main menu until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        info!("session started");
        loop {
            self.print_main_menu()?;
            let Some(choice) = self.prompter.menu_choice()? else {
                break;
            };
            debug!(choice, "menu selection");

            if choice == 0 {
                break;
            }
            if choice == 5 {
                self.print_saved_results()?;
                continue;
            }
            if let Some(unknown) = menu_target(choice) {
                if !self.calculate(unknown)? {
                    break;
                }
            }
        }

        writeln!(
            self.prompter.out(),
            "\n Thank you for using Finance Calculator {}.\n Application Terminated.",
            env!("CARGO_PKG_VERSION")
        )?;
        info!(saved = self.saved_results.len(), "session ended");
        Ok(())
    }

    fn print_main_menu(&mut self) -> io::Result<()> {
        let title = format!("Finance Calculator {}", env!("CARGO_PKG_VERSION"));
        let out = self.prompter.out();
        writeln!(out, "\n{MENU_RULE}")?;
        writeln!(out, "| {title:<68}|")?;
        writeln!(out, "{MENU_RULE}\n")?;
        writeln!(out, " Please select one of the following options:\n")?;
        writeln!(out, " 1\tCalculate Monthly Amount")?;
        writeln!(out, " 2\tCalculate APR")?;
        writeln!(out, " 3\tCalculate Number of Payments")?;
        writeln!(out, " 4\tCalculate Principal Amount")?;
        writeln!(out, " 5\tPrint All Saved Results")?;
        writeln!(out, " 0\tTo Exit the Application\n")?;
        Ok(())
    }

    /// Returns `false` if input ended part way through.
    fn calculate(&mut self, unknown: Unknown) -> io::Result<bool> {
        writeln!(self.prompter.out(), "\n Calculating {} . . .", unknown.label())?;

        let Some(terms) = self.collect_terms(unknown)? else {
            return Ok(false);
        };

        let output = match calculator::calculate_loan(&terms, &self.config) {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "calculation rejected");
                writeln!(
                    self.prompter.out(),
                    "\n Unable to calculate {}: {}",
                    unknown.label(),
                    e
                )?;
                return Ok(true);
            }
        };

        let result = output.result;
        writeln!(self.prompter.out(), "\n {}", display::result_message(&result))?;
        if unknown != Unknown::PaymentAmount {
            for warning in &output.warnings {
                writeln!(self.prompter.out(), " Note: {}", warning)?;
            }
        }

        match self.prompter.confirm_save()? {
            Some(true) => self.saved_results.push(display::summary_line(&result)),
            Some(false) => {}
            None => return Ok(false),
        }
        Ok(true)
    }

    /// Prompt for the three known values, in menu order.
    fn collect_terms(&mut self, unknown: Unknown) -> io::Result<Option<LoanTerms>> {
        let p = &mut self.prompter;
        let terms = match unknown {
            Unknown::PaymentAmount => {
                let Some(apr) = p.amount(AmountField::Apr)? else {
                    return Ok(None);
                };
                let Some(months) = p.payment_count()? else {
                    return Ok(None);
                };
                let Some(principal) = p.amount(AmountField::Principal)? else {
                    return Ok(None);
                };
                LoanTerms::for_payment(principal, apr, months)
            }
            Unknown::AnnualRate => {
                let Some(monthly) = p.amount(AmountField::MonthlyAmount)? else {
                    return Ok(None);
                };
                let Some(months) = p.payment_count()? else {
                    return Ok(None);
                };
                let Some(principal) = p.amount(AmountField::Principal)? else {
                    return Ok(None);
                };
                LoanTerms::for_rate(principal, months, monthly)
            }
            Unknown::NumberOfPayments => {
                let Some(monthly) = p.amount(AmountField::MonthlyAmount)? else {
                    return Ok(None);
                };
                let Some(apr) = p.amount(AmountField::Apr)? else {
                    return Ok(None);
                };
                let Some(principal) = p.amount(AmountField::Principal)? else {
                    return Ok(None);
                };
                LoanTerms::for_term(principal, apr, monthly)
            }
            Unknown::Principal => {
                let Some(monthly) = p.amount(AmountField::MonthlyAmount)? else {
                    return Ok(None);
                };
                let Some(apr) = p.amount(AmountField::Apr)? else {
                    return Ok(None);
                };
                let Some(months) = p.payment_count()? else {
                    return Ok(None);
                };
                LoanTerms::for_principal(apr, months, monthly)
            }
        };
        Ok(Some(terms))
    }

    fn print_saved_results(&mut self) -> io::Result<()> {
        let out = self.prompter.out();
        writeln!(out)?;
        if self.saved_results.is_empty() {
            writeln!(out, " No saved results yet.\n")?;
        }
        for (i, line) in self.saved_results.iter().enumerate() {
            writeln!(out, "Result {}:\n{}\n", i + 1, line)?;
        }
        self.prompter
            .wait_for_enter("Press Enter to return to the Main Menu")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_session(input: &str) -> (Vec<String>, String) {
        let mut session = Session::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            SolverConfig::default(),
        );
        session.run().unwrap();
        let saved = session.saved_results().to_vec();
        let out = String::from_utf8(session.into_output()).unwrap();
        (saved, out)
    }

    #[test]
    fn test_payment_saved_and_listed() {
        // option 1: APR, months, principal; save; list; enter; exit
        let (saved, out) = run_session("1\n0\n12\n1200\ny\n5\n\n0\n");
        assert!(out.contains("Calculated Monthly Amount: $100.00"));
        assert_eq!(saved.len(), 1);
        assert!(out.contains("Result 1:\nAPR: 0.0000%\tNumber of Months: 12\tPrincipal: $1,200.00"));
        assert!(out.contains("Application Terminated."));
    }

    #[test]
    fn test_uneven_payment_with_invalid_entries() {
        let (saved, out) = run_session("1\nabc\n-1\n0\n3\n1000\nn\n0\n");
        assert!(out.contains("Please enter a valid APR"));
        assert!(out.contains("Please enter a positive value"));
        assert!(out.contains("$333.34 for the first payment, and $333.33 thereafter."));
        assert!(saved.is_empty());
    }

    #[test]
    fn test_rate_calculation() {
        // option 2: monthly amount, months, principal
        let (saved, out) = run_session("2\n188.71\n60\n10000\ny\n0\n");
        assert!(out.contains("Calculated APR: 5.0040%"));
        assert_eq!(
            saved,
            vec!["Monthly Amount: $188.71\tNumber of Months: 60\tPrincipal: $10,000.00\tCalculated APR: 5.0040%"]
        );
    }

    #[test]
    fn test_term_calculation_with_residual_note() {
        // option 3: monthly amount, APR, principal
        let (_, out) = run_session("3\n333\n0\n1000\nn\n0\n");
        assert!(out.contains("Calculated Number of Payments: 3"));
        assert!(out.contains("Note: 3 full payments leave a residual balance of 1"));
    }

    #[test]
    fn test_principal_calculation() {
        // option 4: monthly amount, APR, months
        let (_, out) = run_session("4\n100\n0\n12\nn\n0\n");
        assert!(out.contains("Calculated Principal: $1,200.00"));
    }

    #[test]
    fn test_domain_error_keeps_session_running() {
        let (_, out) = run_session("3\n40\n5\n10000\n0\n");
        assert!(out.contains("Unable to calculate Number of Payments"));
        assert!(out.contains("never amortizes"));
        assert!(out.contains("Application Terminated."));
    }

    #[test]
    fn test_out_of_range_amount_keeps_session_running() {
        let (_, out) = run_session("2\n50000000000000000000000000000\n1\n1\n4\n100\n0\n12\nn\n0\n");
        assert!(out.contains("Unable to calculate APR"));
        assert!(out.contains("representable decimal range"));
        assert!(out.contains("Calculated Principal: $1,200.00"));
    }

    #[test]
    fn test_invalid_menu_selection() {
        let (_, out) = run_session("9\nx\n0\n");
        assert_eq!(out.matches("Invalid selection").count(), 2);
    }

    #[test]
    fn test_end_of_input_mid_calculation() {
        let (saved, out) = run_session("2\n188.71\n");
        assert!(saved.is_empty());
        assert!(out.contains("Application Terminated."));
    }

    #[test]
    fn test_empty_saved_results() {
        let (_, out) = run_session("5\n\n0\n");
        assert!(out.contains("No saved results yet."));
    }
}
