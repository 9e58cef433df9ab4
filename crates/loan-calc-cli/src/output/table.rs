use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use super::{plain_value, result_object};
use crate::display::{format_currency, format_rate_percent};

/// Result fields in display order, with their labels.
const FIELDS: [(&str, &str); 9] = [
    ("solved_for", "Solved For"),
    ("principal", "Loan Amount (PV)"),
    ("annual_rate_percent", "Annual Interest Rate"),
    ("monthly_rate", "Monthly Rate (i)"),
    ("number_of_payments", "Number of Payments (n)"),
    ("payment_amount", "Payment Amount (PMT)"),
    ("first_payment", "First Payment"),
    ("total_paid", "Total Paid"),
    ("total_interest", "Total Interest"),
];

/// Format a loan calculation as a two-column table using the tabled crate.
pub fn print_table(value: &Value) {
    let Value::Object(result) = result_object(value) else {
        println!("{}", plain_value(value));
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, label) in FIELDS {
        if let Some(val) = result.get(key) {
            if !val.is_null() {
                builder.push_record([label.to_string(), format_field(key, val)]);
            }
        }
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn format_field(key: &str, value: &Value) -> String {
    let text = plain_value(value);
    let Ok(amount) = Decimal::from_str(&text) else {
        return text;
    };
    match key {
        "principal" | "payment_amount" | "first_payment" | "total_paid" | "total_interest" => {
            format_currency(amount)
        }
        "annual_rate_percent" => format_rate_percent(amount),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_field_currency_and_rate() {
        assert_eq!(format_field("principal", &json!("10000")), "$10,000.00");
        assert_eq!(format_field("annual_rate_percent", &json!("5.004")), "5.0040%");
        assert_eq!(format_field("number_of_payments", &json!(60)), "60");
        assert_eq!(format_field("solved_for", &json!("annual_rate")), "annual_rate");
    }
}
