use loan_calc_core::LoanTerms;
use std::fs;
use std::path::Path;

/// Load loan terms from a JSON document with exactly one value omitted, e.g.
/// `{"principal": "25000", "annual_rate_percent": "4.5", "number_of_payments": 60}`.
pub fn read_terms(path: &str) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(format!("Loan terms file not found: {}", path.display()).into());
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid loan terms in '{}': {}", path.display(), e).into())
}
