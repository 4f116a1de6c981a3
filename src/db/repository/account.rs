use rusqlite::{params, Connection, OptionalExtension};

use super::map_constraint;
use crate::db::{format_timestamp, parse_timestamp, DatabaseError};
use crate::models::Account;

pub fn insert_account(conn: &Connection, account: &Account) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO account (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![
            account.username,
            account.password_hash,
            format_timestamp(&account.created_at),
        ],
    )
    .map_err(|e| map_constraint(e, "Username exists"))?;
    Ok(())
}

pub fn get_account(conn: &Connection, username: &str) -> Result<Option<Account>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT username, password_hash, created_at FROM account WHERE username = ?1",
            params![username],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(username, password_hash, created_at)| {
        Ok(Account {
            username,
            password_hash,
            created_at: parse_timestamp("account.created_at", &created_at)?,
        })
    })
    .transpose()
}

pub fn account_exists(conn: &Connection, username: &str) -> Result<bool, DatabaseError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM account WHERE username = ?1)",
        params![username],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}
