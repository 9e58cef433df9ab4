use assert_cmd::Command;
use predicates::prelude::*;

fn loancalc() -> Command {
    let mut cmd = Command::cargo_bin("loancalc").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("LOANCALC_OUTPUT")
        .env_remove("LOANCALC_MAX_ITERATIONS")
        .env_remove("LOANCALC_TOLERANCE");
    cmd
}

// ===========================================================================
// Flag-driven subcommands
// ===========================================================================

#[test]
fn test_payment_minimal_even_split() {
    loancalc()
        .args([
            "--output", "minimal", "payment",
            "--principal", "1200",
            "--rate", "0",
            "--payments", "12",
        ])
        .assert()
        .success()
        .stdout("100.00\n");
}

#[test]
fn test_payment_minimal_uneven_split() {
    loancalc()
        .args([
            "--output", "minimal", "payment",
            "--principal", "1000",
            "--rate", "0",
            "--payments", "3",
        ])
        .assert()
        .success()
        .stdout("333.34 333.33\n");
}

#[test]
fn test_rate_json_envelope() {
    loancalc()
        .args(["rate", "--principal", "10000", "--payments", "60", "--payment", "188.71"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"solved_for\": \"annual_rate\""))
        .stdout(predicate::str::contains("\"monthly_rate\": \"0.00417\""))
        .stdout(predicate::str::contains("5.004"))
        .stdout(predicate::str::contains("\"methodology\""));
}

#[test]
fn test_term_minimal() {
    loancalc()
        .args([
            "--output", "minimal", "term",
            "--principal", "10000",
            "--rate", "5",
            "--payment", "200",
        ])
        .assert()
        .success()
        .stdout("56\n");
}

#[test]
fn test_principal_table() {
    loancalc()
        .args([
            "--output", "table", "principal",
            "--rate", "0",
            "--payments", "12",
            "--payment", "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loan Amount (PV)"))
        .stdout(predicate::str::contains("$1,200.00"));
}

#[test]
fn test_payment_csv() {
    loancalc()
        .args([
            "--output", "csv", "payment",
            "--principal", "1200",
            "--apr", "0",
            "--months", "12",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("field,value"))
        .stdout(predicate::str::contains("payment_amount,100.00"));
}

#[test]
fn test_output_format_from_env() {
    loancalc()
        .env("LOANCALC_OUTPUT", "minimal")
        .args(["principal", "--rate", "0", "--payments", "12", "--payment", "100"])
        .assert()
        .success()
        .stdout("1200\n");
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn test_term_never_amortizes_fails() {
    loancalc()
        .args(["term", "--principal", "10000", "--rate", "5", "--payment", "40"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("never amortizes"));
}

#[test]
fn test_rate_iteration_cap_fails() {
    loancalc()
        .args([
            "--max-iterations", "1",
            "rate",
            "--principal", "10000",
            "--payments", "60",
            "--payment", "188.71",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_out_of_range_payment_exits_with_error() {
    loancalc()
        .args([
            "rate",
            "--principal", "1",
            "--payments", "1",
            "--payment", "50000000000000000000000000000",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("representable decimal range"));
}

#[test]
fn test_unparseable_amount_rejected_by_parser() {
    loancalc()
        .args(["payment", "--principal", "$1,000", "--rate", "0", "--payments", "3"])
        .assert()
        .failure();
}

// ===========================================================================
// JSON solve
// ===========================================================================

#[test]
fn test_solve_from_stdin() {
    loancalc()
        .args(["--output", "minimal", "solve"])
        .write_stdin(
            r#"{"annual_rate_percent": "0", "number_of_payments": 12, "payment_amount": "100"}"#,
        )
        .assert()
        .success()
        .stdout("1200\n");
}

#[test]
fn test_solve_from_file() {
    let path = std::env::temp_dir().join(format!("loancalc-terms-{}.json", std::process::id()));
    let terms = r#"{"principal": "1000", "annual_rate_percent": "0", "payment_amount": "333"}"#;
    std::fs::write(&path, terms).unwrap();

    loancalc()
        .args(["--output", "minimal", "solve", "--input"])
        .arg(&path)
        .assert()
        .success()
        .stdout("3\n");

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_solve_rejects_two_missing_values() {
    loancalc()
        .arg("solve")
        .write_stdin(r#"{"principal": "1000", "number_of_payments": 12}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 values missing"));
}

// ===========================================================================
// Interactive session
// ===========================================================================

#[test]
fn test_interactive_save_and_list() {
    loancalc()
        .write_stdin("1\n0\n12\n1200\ny\n5\n\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Calculate Monthly Amount"))
        .stdout(predicate::str::contains("Calculated Monthly Amount: $100.00"))
        .stdout(predicate::str::contains("Result 1:"))
        .stdout(predicate::str::contains("Application Terminated."));
}

#[test]
fn test_interactive_ends_on_eof() {
    loancalc()
        .arg("interactive")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Application Terminated."));
}

#[test]
fn test_version() {
    loancalc()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("loancalc "));
}
