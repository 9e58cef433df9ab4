//! Line-oriented prompts with retry on invalid entry
//!
//! Every reader returns `Ok(None)` once input is exhausted so the session can
//! shut down cleanly instead of spinning on EOF.

use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Why a typed entry was rejected at the shell boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("not a number")]
    NotANumber,
    #[error("value must not be negative")]
    Negative,
    #[error("value must be greater than zero")]
    NotPositive,
    #[error("value is too large")]
    TooLarge,
    #[error("selection out of range")]
    OutOfRange,
}

/// Decimal inputs the calculator asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    MonthlyAmount,
    Principal,
    Apr,
}

impl AmountField {
    fn prompt(&self) -> &'static str {
        match self {
            AmountField::MonthlyAmount => "Please enter the Monthly Amount: ",
            AmountField::Principal => "Please enter the Principal Amount: ",
            AmountField::Apr => "Please enter the APR (#.####): ",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AmountField::MonthlyAmount => "Monthly Amount",
            AmountField::Principal => "Principal Amount",
            AmountField::Apr => "APR",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            AmountField::MonthlyAmount => {
                " Omit any special characters, such as \"$\" or \",\".\n\n \
                 For example, \"1741.11\" is a valid input for $1,741.11."
            }
            AmountField::Principal => {
                " Omit any special characters, such as \",\" or \"$\".\n\n \
                 For example, \"50000.00\" is a valid input for $50,000.00."
            }
            AmountField::Apr => {
                " Omit any special characters, such as \"%\".\n\n \
                 For example, \"4.5\" is a valid input for 4.5%."
            }
        }
    }
}

pub fn parse_amount(text: &str) -> Result<Decimal, InputError> {
    let value = Decimal::from_str(text.trim()).map_err(|_| InputError::NotANumber)?;
    if value < Decimal::ZERO {
        return Err(InputError::Negative);
    }
    Ok(value)
}

pub fn parse_payment_count(text: &str) -> Result<u32, InputError> {
    let value: i64 = text.trim().parse().map_err(|_| InputError::NotANumber)?;
    if value <= 0 {
        return Err(InputError::NotPositive);
    }
    u32::try_from(value).map_err(|_| InputError::TooLarge)
}

pub fn parse_menu_choice(text: &str) -> Result<u8, InputError> {
    let value: u8 = text.trim().parse().map_err(|_| InputError::NotANumber)?;
    if value > 5 {
        return Err(InputError::OutOfRange);
    }
    Ok(value)
}

/// Owns the session's input and output streams.
pub struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Show `prompt` and read one trimmed line.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn menu_choice(&mut self) -> io::Result<Option<u8>> {
        loop {
            let Some(line) = self.read_line(" \tSelection: ")? else {
                return Ok(None);
            };
            match parse_menu_choice(&line) {
                Ok(choice) => return Ok(Some(choice)),
                Err(e) => {
                    debug!(input = %line, error = %e, "rejected menu selection");
                    writeln!(
                        self.out,
                        "\n Invalid selection. Please enter a value between 0 and 5.\n"
                    )?;
                }
            }
        }
    }

    pub fn amount(&mut self, field: AmountField) -> io::Result<Option<Decimal>> {
        loop {
            let Some(line) = self.read_line(&format!("\n {}", field.prompt()))? else {
                return Ok(None);
            };
            match parse_amount(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(InputError::Negative) => {
                    writeln!(self.out, "\n Invalid entry. Please enter a positive value.")?;
                }
                Err(e) => {
                    debug!(input = %line, error = %e, "rejected amount");
                    writeln!(
                        self.out,
                        "\n Invalid entry. Please enter a valid {}.\n{}",
                        field.name(),
                        field.hint()
                    )?;
                }
            }
        }
    }

    pub fn payment_count(&mut self) -> io::Result<Option<u32>> {
        loop {
            let Some(line) = self.read_line("\n Please enter the Number of Months: ")? else {
                return Ok(None);
            };
            match parse_payment_count(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(InputError::NotPositive) => {
                    writeln!(self.out, "\n Invalid entry. Please enter a positive value.")?;
                }
                Err(e) => {
                    debug!(input = %line, error = %e, "rejected payment count");
                    writeln!(
                        self.out,
                        "\n Invalid entry. Please enter a valid Number of Months.\n \
                         Omit any special characters, such as \",\".\n\n \
                         For example, \"48\" is a valid input for 48 months."
                    )?;
                }
            }
        }
    }

    /// Y/N question, case-insensitive.
    pub fn confirm_save(&mut self) -> io::Result<Option<bool>> {
        loop {
            let Some(line) = self.read_line("\n Would you like to save these results (Y/N)? ")?
            else {
                return Ok(None);
            };
            if line.eq_ignore_ascii_case("y") {
                return Ok(Some(true));
            }
            if line.eq_ignore_ascii_case("n") {
                return Ok(Some(false));
            }
            writeln!(
                self.out,
                "\n Invalid entry. Please enter \"Y\" to save the results or \"N\" to discard them."
            )?;
        }
    }

    pub fn wait_for_enter(&mut self, message: &str) -> io::Result<()> {
        self.read_line(&format!("{message}\n"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 1741.11 "), Ok(dec!(1741.11)));
        assert_eq!(parse_amount("0"), Ok(Decimal::ZERO));
        assert_eq!(parse_amount("-5"), Err(InputError::Negative));
        assert_eq!(parse_amount("$1,741.11"), Err(InputError::NotANumber));
    }

    #[test]
    fn test_parse_payment_count() {
        assert_eq!(parse_payment_count("48"), Ok(48));
        assert_eq!(parse_payment_count("0"), Err(InputError::NotPositive));
        assert_eq!(parse_payment_count("-3"), Err(InputError::NotPositive));
        assert_eq!(parse_payment_count("4.5"), Err(InputError::NotANumber));
        assert_eq!(parse_payment_count("99999999999"), Err(InputError::TooLarge));
    }

    #[test]
    fn test_parse_menu_choice() {
        assert_eq!(parse_menu_choice("0"), Ok(0));
        assert_eq!(parse_menu_choice("5"), Ok(5));
        assert_eq!(parse_menu_choice("6"), Err(InputError::OutOfRange));
        assert_eq!(parse_menu_choice("one"), Err(InputError::NotANumber));
    }

    #[test]
    fn test_amount_retries_until_valid() {
        let mut p = prompter("abc\n-2\n4.5\n");
        assert_eq!(p.amount(AmountField::Apr).unwrap(), Some(dec!(4.5)));
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Please enter a valid APR"));
        assert!(out.contains("Please enter a positive value"));
    }

    #[test]
    fn test_payment_count_eof_returns_none() {
        let mut p = prompter("");
        assert_eq!(p.payment_count().unwrap(), None);
    }

    #[test]
    fn test_confirm_save_case_insensitive() {
        let mut p = prompter("maybe\nY\n");
        assert_eq!(p.confirm_save().unwrap(), Some(true));
        let mut p = prompter("n\n");
        assert_eq!(p.confirm_save().unwrap(), Some(false));
    }
}
