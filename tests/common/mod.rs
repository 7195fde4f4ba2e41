//! Shared helpers for integration tests: a seeded synthetic churn corpus.
//!
//! The generator draws attribute values uniformly and labels each row with a
//! Bernoulli draw whose probability follows the business rules churn data
//! actually exhibits (month-to-month contracts, support-call volume, late
//! payments, low satisfaction, expensive plans), so learnability is real.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const PAYMENTS: [&str; 3] = ["Credit card", "Bank transfer", "Electronic check"];
const INTERNET: [&str; 2] = ["Fiber optic", "DSL"];
const YES_NO: [&str; 2] = ["Yes", "No"];

/// Generate a labelled churn CSV with `n_rows` rows.
pub fn churn_csv(n_rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::new();

    out.push_str(
        "customer_id,age,gender,subscription_length_months,monthly_charge,total_charges,\
         contract_type,payment_method,paperless_billing,tech_support,internet_service_type,\
         satisfaction_score,number_customer_service_calls,late_payment_count,churn\n",
    );

    for id in 1..=n_rows {
        let age: i32 = rng.gen_range(18..80);
        let gender = if rng.gen_bool(0.5) { "M" } else { "F" };
        let subscription: i32 = rng.gen_range(1..60);
        let monthly_charge: f64 = rng.gen_range(20.0..150.0);
        let total_charges: f64 = rng.gen_range(50.0..5000.0);
        let contract = CONTRACTS[rng.gen_range(0..CONTRACTS.len())];
        let payment = PAYMENTS[rng.gen_range(0..PAYMENTS.len())];
        let paperless = YES_NO[rng.gen_range(0..YES_NO.len())];
        let tech_support = YES_NO[rng.gen_range(0..YES_NO.len())];
        let internet = INTERNET[rng.gen_range(0..INTERNET.len())];
        let satisfaction: i32 = rng.gen_range(1..11);
        let service_calls: i32 = rng.gen_range(0..20);
        let late_payments: i32 = rng.gen_range(0..5);

        let mut churn_probability: f64 = 0.1;
        if contract == "Month-to-month" {
            churn_probability += 0.3;
        }
        if service_calls > 5 {
            churn_probability += 0.2;
        }
        if late_payments > 0 {
            churn_probability += 0.15;
        }
        if satisfaction < 5 {
            churn_probability += 0.25;
        }
        if monthly_charge > 80.0 {
            churn_probability += 0.1;
        }
        if tech_support == "No" {
            churn_probability += 0.05;
        }
        let churn = if rng.gen_bool(churn_probability.min(1.0)) {
            "Yes"
        } else {
            "No"
        };

        let _ = writeln!(
            out,
            "{},{},{},{},{:.2},{:.2},{},{},{},{},{},{},{},{},{}",
            id,
            age,
            gender,
            subscription,
            monthly_charge,
            total_charges,
            contract,
            payment,
            paperless,
            tech_support,
            internet,
            satisfaction,
            service_calls,
            late_payments,
            churn
        );
    }

    out
}

/// Write a synthetic dataset to the temp directory and return its path.
pub fn write_churn_dataset(name: &str, n_rows: usize, seed: u64) -> PathBuf {
    write_temp(&format!("{}_{}_{}.csv", name, n_rows, seed), &churn_csv(n_rows, seed))
}

/// Write content to a named temp file. Staged through a unique sibling and
/// renamed into place so parallel tests never observe a partial file.
pub fn write_temp(file_name: &str, content: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let dir = std::env::temp_dir();
    let path = dir.join(format!("churn_classifiers_test_{}", file_name));
    let staged = dir.join(format!(
        "churn_classifiers_test_{}.{}.{}.part",
        file_name,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&staged, content).expect("failed to write test fixture");
    std::fs::rename(&staged, &path).expect("failed to move test fixture into place");
    path
}
