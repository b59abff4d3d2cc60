// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use atm_engine::{Account, AtmConfig, Operation, TransactionProcessor};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// ATM Engine - Replay a CSV of ATM requests
///
/// Opens accounts, applies withdrawals, deposits and balance inquiries in
/// file order, then writes the final account states to stdout.
#[derive(Parser, Debug)]
#[command(name = "atm-engine")]
#[command(about = "Replays ATM requests from a CSV file", long_about = None)]
struct Args {
    /// Path to CSV file with requests
    ///
    /// Expected format: action,account,amount,limit
    /// Example: cargo run -- requests.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Only dispense multiples of this note value (e.g. 10.00)
    #[arg(long, value_name = "AMOUNT")]
    note_denomination: Option<Decimal>,

    /// Smallest deposit accepted
    #[arg(long, value_name = "AMOUNT")]
    minimum_deposit: Option<Decimal>,
}

impl Args {
    fn config(&self) -> AtmConfig {
        let mut config = match self.note_denomination {
            Some(denomination) => AtmConfig::with_note_denomination(denomination),
            None => AtmConfig::default(),
        };
        if let Some(minimum) = self.minimum_deposit {
            config.minimum_deposit = minimum;
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let processor = match process_requests(BufReader::new(file), args.config()) {
        Ok(processor) => processor,
        Err(e) => {
            eprintln!("Error processing requests: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_accounts(&processor, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `action, account, amount, limit`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    action: String,
    account: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    limit: Option<Decimal>,
}

/// A parsed row.
#[derive(Debug, PartialEq, Eq)]
enum Request {
    Open {
        account: String,
        balance: Decimal,
        limit: Decimal,
    },
    Execute {
        operation: Operation,
        account: String,
        amount: Decimal,
    },
}

impl CsvRecord {
    /// Returns `None` for unknown actions or missing required fields.
    fn into_request(self) -> Option<Request> {
        let operation = match self.action.to_lowercase().as_str() {
            "open" => {
                return Some(Request::Open {
                    account: self.account,
                    balance: self.amount?,
                    limit: self.limit?,
                });
            }
            "withdraw" | "withdrawal" => Operation::Withdraw,
            "deposit" => Operation::Deposit,
            "balance" | "inquire" => Operation::Inquire,
            _ => return None,
        };
        let amount = match operation {
            Operation::Inquire => Decimal::ZERO,
            _ => self.amount?,
        };
        Some(Request::Execute {
            operation,
            account: self.account,
            amount,
        })
    }
}

/// Process requests from a CSV reader.
///
/// Rows are streamed, so input size is not bounded by memory. Malformed rows
/// and rejected requests are logged and skipped.
///
/// # CSV Format
///
/// Expected columns: `action, account, amount, limit`
/// - `action`: open, withdraw, deposit or balance
/// - `account`: account identifier
/// - `amount`: decimal amount (opening balance for `open`, unused for `balance`);
///   an `open` row without a readable amount is skipped
/// - `limit`: withdrawal limit, only read for `open`
///
/// # Example
///
/// ```csv
/// action,account,amount,limit
/// open,12345,1000.00,500.00
/// withdraw,12345,100.00,
/// balance,12345,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_requests<R: Read>(
    reader: R,
    config: AtmConfig,
) -> Result<TransactionProcessor, csv::Error> {
    let processor = TransactionProcessor::with_config(config);
    debug!(config = ?processor.config(), "replaying requests");

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row, error = %e, "skipping malformed row");
                continue;
            }
        };

        let Some(request) = record.into_request() else {
            warn!(row, "skipping invalid request");
            continue;
        };

        match request {
            Request::Open {
                account,
                balance,
                limit,
            } => {
                if let Err(e) = processor.register_account(account, balance, limit) {
                    warn!(row, error = %e, "open failed");
                }
            }
            Request::Execute {
                operation,
                account,
                amount,
            } => match processor.execute(operation, &account, amount) {
                Ok(balance) if operation == Operation::Inquire => {
                    info!(row, account = %account, %balance, "balance inquiry");
                }
                Ok(_) => {}
                Err(e) => warn!(row, error = %e, "request failed"),
            },
        }
    }

    Ok(processor)
}

/// Write account states to a CSV writer, ordered by account id.
///
/// # CSV Format
///
/// Columns: `account, balance, withdraw_limit, entries`
///
/// ```csv
/// account,balance,withdraw_limit,entries
/// 12345,900.00,500.00,1
/// ```
pub fn write_accounts<W: Write>(processor: &TransactionProcessor, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    let mut accounts: Vec<Arc<Account>> = processor
        .accounts()
        .map(|entry| Arc::clone(entry.value()))
        .collect();
    accounts.sort_by(|a, b| a.id().cmp(b.id()));

    for account in &accounts {
        wtr.serialize(account.as_ref())?;
    }

    wtr.flush()?;
    Ok(())
}
