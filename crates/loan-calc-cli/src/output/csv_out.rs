use serde_json::Value;
use std::io;

use super::{plain_value, result_object};

/// Write the loan result as two-column CSV to stdout, followed by one
/// `warning` row per warning.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_rows(&mut wtr, value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;

    match result_object(value) {
        Value::Object(result) => {
            for (key, val) in result {
                wtr.write_record([key.as_str(), &plain_value(val)])?;
            }
        }
        other => wtr.write_record(["result", &plain_value(other)])?,
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        for w in warnings {
            wtr.write_record(["warning", &plain_value(w)])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
