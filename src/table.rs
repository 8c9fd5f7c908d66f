//! Fixed-width text tables for the REPL listings.

use chrono::{Months, NaiveDate};
use std::fmt::Write;

use crate::balance::Balance;
use crate::ledger::{Loan, LoanPayment, User};

const PADDING: &str = "    ";

/// Fits `text` into exactly `width` characters, padding with spaces or
/// truncating with a trailing `...`.
pub fn format_text(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        if width < 3 {
            text.chars().take(width).collect()
        } else {
            let mut out: String = text.chars().take(width - 3).collect();
            out.push_str("...");
            out
        }
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Calendar month of a counter value, e.g. `2024-03` when month 0 is in
/// January 2024 and `month` is 2.
pub fn month_label(start_date: NaiveDate, month: u32) -> String {
    match start_date.checked_add_months(Months::new(month)) {
        Some(date) => date.format("%Y-%m").to_string(),
        None => format!("month {}", month),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

// writes one `| a | b | ... |` line, each cell fitted to the header width
fn row(out: &mut String, widths: &[usize], cells: &[String]) {
    out.push_str(PADDING);
    out.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        let _ = write!(out, " {} |", format_text(cell, width));
    }
    out.push('\n');
}

fn table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    let mut out = String::new();
    row(
        &mut out,
        &widths,
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
    );
    for cells in rows {
        row(&mut out, &widths, &cells);
    }
    out
}

pub fn users_table(users: &[User]) -> String {
    table(
        &["S/N", "Username            "],
        users
            .iter()
            .enumerate()
            .map(|(i, user)| vec![format!("{:03}", i), user.name.clone()]),
    )
}

pub fn loans_table(loans: &[Loan], start_date: NaiveDate) -> String {
    table(
        &[
            "S/N",
            "Loan Name           ",
            "Creator     ",
            "Principal   ",
            "Rate    ",
            "Policy     ",
            "Created",
            "Finished",
        ],
        loans.iter().enumerate().map(|(i, loan)| {
            vec![
                format!("{:03}", i),
                loan.name.clone(),
                loan.creator.clone(),
                format!("{:.2}", loan.principal),
                format!("{}", loan.interest_rate),
                loan.policy().to_string(),
                month_label(start_date, loan.month_created),
                yes_no(loan.is_finished()).to_string(),
            ]
        }),
    )
}

pub fn payments_table(payments: &[LoanPayment], start_date: NaiveDate) -> String {
    table(
        &[
            "ID ",
            "Loan Name           ",
            "Payer       ",
            "Payment Amount",
            "Month  ",
        ],
        payments.iter().map(|payment| {
            vec![
                format!("{:03}", payment.id),
                payment.loan_name.clone(),
                payment.payer.clone(),
                format!("{:.2}", payment.amount),
                month_label(start_date, payment.month_created),
            ]
        }),
    )
}

/// Balance of one loan as shown in the balances listing.
#[derive(Clone, PartialEq, Debug)]
pub struct BalanceRow {
    pub loan_name: String,
    pub balance: Balance,
    pub pending: f64,
}

pub fn balances_table(rows: &[BalanceRow]) -> String {
    table(
        &[
            "S/N",
            "Loan Name           ",
            "Loan Balance  ",
            "Pending     ",
            "Finished",
        ],
        rows.iter().enumerate().map(|(i, row)| {
            vec![
                format!("{:03}", i),
                row.loan_name.clone(),
                format!("{:.2}", row.balance.balance),
                format!("{:.2}", row.pending),
                yes_no(row.balance.is_finished).to_string(),
            ]
        }),
    )
}
