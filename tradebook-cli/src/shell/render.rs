//! Plain-text tables for the terminal.

use std::io::{self, Write};
use tradebook::{Account, Position, Trade};
use tradebook_core::inventory::TableCount;

/// Writes `rows` under `headers`, each column padded to its widest cell.
pub fn table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    writeln!(out, "({} rows)", rows.len())
}

pub fn accounts<W: Write>(out: &mut W, accounts: &[Account]) -> io::Result<()> {
    let rows: Vec<Vec<String>> = accounts
        .iter()
        .map(|a| {
            vec![
                a.username().to_string(),
                a.account_number().to_string(),
                format!("{:.2}", a.cash_balance()),
                a.name().to_string(),
            ]
        })
        .collect();
    table(out, &["username", "account_number", "cash_balance", "name"], &rows)
}

pub fn positions<W: Write>(out: &mut W, positions: &[Position]) -> io::Result<()> {
    let rows: Vec<Vec<String>> = positions
        .iter()
        .map(|p| {
            vec![
                p.account().to_string(),
                p.symbol().to_string(),
                p.quantity().to_string(),
            ]
        })
        .collect();
    table(out, &["account", "symbol", "quantity"], &rows)
}

pub fn trades<W: Write>(out: &mut W, trades: &[Trade]) -> io::Result<()> {
    let rows: Vec<Vec<String>> = trades
        .iter()
        .map(|t| {
            vec![
                t.trade_id().to_string(),
                t.trade_type().to_string(),
                t.symbol().to_string(),
                t.shares().to_string(),
                format!("{:.2}", t.price()),
                format!("{:.2}", t.amount()),
            ]
        })
        .collect();
    table(out, &["trade_id", "type", "symbol", "shares", "price", "amount"], &rows)
}

pub fn inventory<W: Write>(out: &mut W, counts: &[TableCount]) -> io::Result<()> {
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|c| vec![c.table.to_string(), c.rows.to_string()])
        .collect();
    table(out, &["table", "rows"], &rows)
}
