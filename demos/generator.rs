//! This example generates a SmallBank request log for a number of accounts
//! supplied as a command-line argument.
//!
//! The log can then be replayed with the `smallbank` binary.
//!
//! Example (100 accounts):
//! ```bash
//! cargo run --example generator 100 > data/100_accounts.csv
//! ```
//! ### Maths
//! Based on the constants, the ending state of every account can be derived.
//!
//! Let N = number of accounts and i = account index (`acct{i}`, 1-based).
//!
//! **Step 1: Setup** (per account)
//! `create` with savings 100·i and checkings 50·i, `depositChecking` 10·i,
//! `transactSavings` -20·i, `writeCheck` 5·i, then a `writeCheck` of
//! 1 000 000·i which is always rejected.
//! • Savings = 80·i
//! • Checkings = 55·i
//!
//! **Step 2: Payments ring**
//! Every account pays 7·i to the next one (`acct{N}` pays `acct1`), in index order.
//! • Checkings of acct1 = 55 – 7 + 7·N = 48 + 7·N
//! • Checkings of acct{i}, i ≥ 2 = 55·i – 7·i + 7·(i – 1) = 55·i – 7
//!
//! **Step 3: Amalgamate**
//! Odd accounts move their savings into checkings.
//!
//! **Final State for account i:**
//! - **Odd i:** savings = 0, checkings = (step 2 checkings) + 80·i
//! - **Even i:** savings = 80·i, checkings = step 2 checkings
//!
//! A final `query` per account reports these balances; exactly N requests are rejected.
//!

use csv::WriterBuilder;
use std::{env, error::Error};

// Base amounts; these will be scaled by the account index.
const BASE_SAVINGS: u64 = 100;
const BASE_CHECKINGS: u64 = 50;
const BASE_DEPOSIT: u64 = 10;
const BASE_WITHDRAWAL: u64 = 20;
const BASE_CHECK: u64 = 5;
const BASE_BOUNCED_CHECK: u64 = 1_000_000;
const BASE_PAYMENT: u64 = 7;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: cargo run --example generator <num_accounts>");
        std::process::exit(1);
    }

    let num_accounts: u64 = match args[1].parse() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("Error: <num_accounts> must be a positive integer.");
            std::process::exit(1);
        }
    };

    let account = |i: u64| format!("acct{}", i);
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .from_writer(std::io::stdout());

    for i in 1..=num_accounts {
        let id = account(i);
        wtr.write_record([
            "create",
            id.as_str(),
            (BASE_SAVINGS * i).to_string().as_str(),
            (BASE_CHECKINGS * i).to_string().as_str(),
        ])?;
        wtr.write_record([
            "depositChecking",
            id.as_str(),
            (BASE_DEPOSIT * i).to_string().as_str(),
        ])?;
        wtr.write_record([
            "transactSavings",
            id.as_str(),
            format!("-{}", BASE_WITHDRAWAL * i).as_str(),
        ])?;
        wtr.write_record([
            "writeCheck",
            id.as_str(),
            (BASE_CHECK * i).to_string().as_str(),
        ])?;
        wtr.write_record([
            "writeCheck",
            id.as_str(),
            (BASE_BOUNCED_CHECK * i).to_string().as_str(),
        ])?;
    }

    for i in 1..=num_accounts {
        let next = i % num_accounts + 1;
        wtr.write_record([
            "sendPayment",
            account(i).as_str(),
            account(next).as_str(),
            (BASE_PAYMENT * i).to_string().as_str(),
        ])?;
    }

    for i in (1..=num_accounts).step_by(2) {
        wtr.write_record(["amalgamate", account(i).as_str()])?;
    }

    for i in 1..=num_accounts {
        wtr.write_record(["query", account(i).as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
