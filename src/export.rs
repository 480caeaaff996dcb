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

//! CSV export of transaction history.
//!
//! Renders an already-fetched, size-bounded result set with a fixed column
//! order: `Date, Amount, Balance, Description, Type`. The `csv` writer quotes
//! fields containing the delimiter or newlines, so free-text descriptions
//! cannot break the row structure.

use crate::transaction::{Transaction, TransactionKind};
use serde::Serialize;
use std::io::Write;

/// Hard cap on exported rows; larger requests are clamped, not rejected.
pub const EXPORT_LIMIT_MAX: usize = 100_000;

/// One output row. Headers come from the field names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow {
    date: String,
    amount: String,
    balance: String,
    description: String,
    #[serde(rename = "Type")]
    kind: &'static str,
}

impl From<&Transaction> for CsvRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.created_at.to_rfc3339(),
            amount: tx.amount.to_string(),
            balance: tx.balance.to_string(),
            description: tx.description.clone().unwrap_or_default(),
            kind: match tx.kind {
                TransactionKind::Credit => "CREDIT",
                TransactionKind::Debit => "DEBIT",
            },
        }
    }
}

/// Writes `transactions` as CSV, header row included.
///
/// # Errors
///
/// Returns a CSV error if writing to the underlying writer fails.
pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    for tx in transactions {
        wtr.serialize(CsvRow::from(tx))?;
    }

    // An empty export still gets its header row.
    if transactions.is_empty() {
        wtr.write_record(["Date", "Amount", "Balance", "Description", "Type"])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::WalletId;

    fn tx(amount: &str, balance: &str, description: Option<&str>) -> Transaction {
        Transaction::new(
            WalletId::generate(),
            amount.parse().unwrap(),
            balance.parse().unwrap(),
            description.map(str::to_string),
        )
    }

    fn render(transactions: &[Transaction]) -> String {
        let mut buf = Vec::new();
        write_csv(transactions, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_and_column_order() {
        let out = render(&[tx("100.5", "100.5", Some("salary"))]);
        let mut lines = out.lines();
        assert_eq!(lines.next().unwrap(), "Date,Amount,Balance,Description,Type");
        let row = lines.next().unwrap();
        assert!(row.ends_with("100.5,100.5,salary,CREDIT"));
    }

    #[test]
    fn debit_rows_are_typed() {
        let out = render(&[tx("-30.25", "70.25", None)]);
        assert!(out.contains("-30.25,70.25,,DEBIT"));
    }

    #[test]
    fn description_with_delimiter_is_quoted() {
        let out = render(&[tx("5", "5", Some("rent, utilities"))]);
        assert!(out.contains("\"rent, utilities\""));
    }

    #[test]
    fn description_with_newline_is_quoted() {
        let out = render(&[tx("5", "5", Some("line one\nline two"))]);
        assert!(out.contains("\"line one\nline two\""));
    }

    #[test]
    fn empty_export_still_has_header() {
        let out = render(&[]);
        assert_eq!(out.trim_end(), "Date,Amount,Balance,Description,Type");
    }
}
