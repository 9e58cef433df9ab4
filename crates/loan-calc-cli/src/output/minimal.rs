use serde_json::Value;

use super::{plain_value, result_object};

/// Print just the solved value.
///
/// An uneven zero-rate split prints the first payment and the regular
/// payment separated by a space.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    let result = result_object(value);

    let key = match result.get("solved_for").and_then(Value::as_str) {
        Some("principal") => "principal",
        Some("annual_rate") => "annual_rate_percent",
        Some("number_of_payments") => "number_of_payments",
        Some("payment_amount") => "payment_amount",
        _ => return plain_value(result),
    };

    let answer = result.get(key).map(plain_value).unwrap_or_default();
    match result.get("first_payment") {
        Some(first) if key == "payment_amount" && !first.is_null() => {
            format!("{} {}", plain_value(first), answer)
        }
        _ => answer,
    }
}
