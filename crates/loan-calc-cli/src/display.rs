//! Human-readable formatting for loan values
//!
//! Currency renders as `$#,##0.00`, annual rates as a percentage with four
//! decimals and payment counts as plain integers.

use loan_calc_core::calculator::LoanOutput;
use loan_calc_core::{Money, Rate, Unknown};
use rust_decimal::RoundingStrategy;

/// Format a monetary amount, e.g. `$12,345.67`.
pub fn format_currency(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded < Money::ZERO { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Format an annual rate given as a percentage number, e.g. `4.5` -> `4.5000%`.
pub fn format_rate_percent(annual_rate_percent: Rate) -> String {
    let rounded =
        annual_rate_percent.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.4}%")
}

pub fn format_count(n: u32) -> String {
    n.to_string()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One-line answer shown right after a calculation.
pub fn result_message(output: &LoanOutput) -> String {
    match output.solved_for {
        Unknown::PaymentAmount => match output.first_payment {
            Some(first) => format!(
                "Calculated Monthly Amount: {} for the first payment, and {} thereafter.",
                format_currency(first),
                format_currency(output.payment_amount)
            ),
            None => format!(
                "Calculated Monthly Amount: {}",
                format_currency(output.payment_amount)
            ),
        },
        Unknown::AnnualRate => format!(
            "Calculated APR: {}",
            format_rate_percent(output.annual_rate_percent)
        ),
        Unknown::NumberOfPayments => format!(
            "Calculated Number of Payments: {}",
            format_count(output.number_of_payments)
        ),
        Unknown::Principal => format!(
            "Calculated Principal: {}",
            format_currency(output.principal)
        ),
    }
}

/// Tab-separated line stored in the session's saved results. The three
/// inputs come first, the solved value last.
pub fn summary_line(output: &LoanOutput) -> String {
    let apr = format!("APR: {}", format_rate_percent(output.annual_rate_percent));
    let months = format!("Number of Months: {}", format_count(output.number_of_payments));
    let principal = format!("Principal: {}", format_currency(output.principal));
    let monthly = format!("Monthly Amount: {}", format_currency(output.payment_amount));

    match output.solved_for {
        Unknown::PaymentAmount => {
            let calculated = match output.first_payment {
                Some(first) => format!(
                    "Calculated Monthly Amount: {} first, {} thereafter",
                    format_currency(first),
                    format_currency(output.payment_amount)
                ),
                None => format!(
                    "Calculated Monthly Amount: {}",
                    format_currency(output.payment_amount)
                ),
            };
            [apr, months, principal, calculated].join("\t")
        }
        Unknown::AnnualRate => [
            monthly,
            months,
            principal,
            format!(
                "Calculated APR: {}",
                format_rate_percent(output.annual_rate_percent)
            ),
        ]
        .join("\t"),
        Unknown::NumberOfPayments => [
            apr,
            monthly,
            principal,
            format!(
                "Calculated Number of Payments: {}",
                format_count(output.number_of_payments)
            ),
        ]
        .join("\t"),
        Unknown::Principal => [
            apr,
            months,
            monthly,
            format!("Calculated Principal: {}", format_currency(output.principal)),
        ]
        .join("\t"),
    }
}
