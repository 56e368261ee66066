//! Expense row operations
//!
//! Reads come back as `RawRecord`: each column is lifted out in whatever
//! storage class SQLite actually holds, so the normalizer sees the same
//! mixed encodings real databases accumulate. New writes always store the
//! amount as fixed-point text.

use rusqlite::params;
use rusqlite::types::ValueRef;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{NewExpense, RawAccount, RawAmount, RawFlag, RawRecord};

const SELECT_RAW: &str = "SELECT e.id, e.amount, e.description, e.category, e.date, \
            e.is_synced_from_bank, a.name, a.account_type \
     FROM expenses e LEFT JOIN accounts a ON a.id = e.account_id";

impl Database {
    /// Insert a validated expense. The amount is stored as fixed-point text.
    pub fn insert_expense(&self, expense: &NewExpense) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (account_id, amount, description, category, date, is_synced_from_bank)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                expense.account_id,
                expense.amount.to_string(),
                expense.description.trim(),
                expense.category.trim(),
                expense.date.trim(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch all expense rows in their raw stored encodings, newest first.
    pub fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY e.date DESC, e.id DESC", SELECT_RAW))?;

        let records = stmt
            .query_map([], row_to_raw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Fetch a single expense row by id, or `Error::NotFound`.
    pub fn fetch_record_by_id(&self, id: i64) -> Result<RawRecord> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE e.id = ?", SELECT_RAW))?;

        let mut rows = stmt.query_map(params![id], row_to_raw)?;
        match rows.next() {
            Some(row) => Ok(row?),
            None => Err(Error::NotFound(format!("expense {}", id))),
        }
    }
}

/// Map a joined row to `RawRecord`, preserving each column's storage class.
fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    let amount = match row.get_ref(1)? {
        ValueRef::Text(bytes) => Some(RawAmount::Fixed(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
        ValueRef::Integer(v) => Some(RawAmount::Cents(v)),
        ValueRef::Real(v) => Some(RawAmount::Float(v)),
        _ => None,
    };

    let flag = match row.get_ref(5)? {
        ValueRef::Integer(v) => Some(RawFlag::Int(v)),
        ValueRef::Text(bytes) => Some(RawFlag::Text(
            String::from_utf8_lossy(bytes).into_owned(),
        )),
        _ => None,
    };

    let account_name: Option<String> = row.get(6)?;
    let account_type: Option<String> = row.get(7)?;
    let account = if account_name.is_some() || account_type.is_some() {
        Some(RawAccount {
            name: account_name,
            account_type,
        })
    } else {
        None
    };

    Ok(RawRecord {
        id: row.get(0)?,
        amount,
        description: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
        account,
        is_synced_from_bank: flag,
    })
}
