//! Repository layer for users and accounts

use super::models::{Account, AccountType, User, UserStatus};
use crate::ledger::models::NewTransaction;
use crate::ledger::reference::generate_transaction_reference;
use crate::ledger::repository::TransactionRepository;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("User is disabled: {0}")]
    UserDisabled(i64),

    #[error("Initial deposit must not be negative")]
    InvalidInitialDeposit,
}

/// User repository for account-owner lookups
pub struct UserRepository;

impl UserRepository {
    /// Get user by ID
    pub async fn get_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT user_id, username, email, status, created_at
               FROM users_tb WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|r| User {
            user_id: r.get("user_id"),
            username: r.get("username"),
            email: r.get("email"),
            status: UserStatus::from(r.get::<i16, _>("status")),
            created_at: r.get("created_at"),
        }))
    }

    /// Create a new user
    pub async fn create(pool: &PgPool, username: &str, email: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"INSERT INTO users_tb (username, email) VALUES ($1, $2) RETURNING user_id"#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(row.get("user_id"))
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    let account_type =
        AccountType::try_from(row.get::<i16, _>("account_type")).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "account_type".into(),
                source: e.into(),
            }
        })?;

    Ok(Account {
        account_id: row.get("account_id"),
        user_id: row.get("user_id"),
        account_type,
        account_number: row.get("account_number"),
        balance: row.get("balance"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const ACCOUNT_COLUMNS: &str = "account_id, user_id, account_type, account_number, \
                               balance, is_active, created_at, updated_at";

fn generate_account_number() -> String {
    let mut rng = rand::thread_rng();
    (0..10)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

/// Account repository. Balance writes happen only through
/// [`AccountRepository::apply_balance_delta`], always inside a transaction
/// owned by the transfer executor or onboarding.
pub struct AccountRepository;

impl AccountRepository {
    /// Get account by ID
    pub async fn get_by_id(pool: &PgPool, account_id: Uuid) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts_tb WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_optional(pool)
        .await?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    /// Get account by ID with a row lock, inside the caller's transaction.
    ///
    /// The lock serializes concurrent balance checks against the same
    /// account: two transfers can never both pass a check against the same
    /// pre-mutation balance.
    pub async fn get_by_id_for_update(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        account_id: Uuid,
    ) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts_tb WHERE account_id = $1 FOR UPDATE"
        ))
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    /// All accounts owned by a user, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Account>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts_tb WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }

    /// Account IDs owned by a user, for history scoping
    pub async fn ids_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows = sqlx::query("SELECT account_id FROM accounts_tb WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.iter().map(|r| r.get("account_id")).collect())
    }

    /// Whether the account exists and is owned by the given user
    pub async fn belongs_to(
        pool: &PgPool,
        account_id: Uuid,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            "SELECT 1 AS one FROM accounts_tb WHERE account_id = $1 AND user_id = $2",
        )
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    /// Adjust a balance by a signed delta inside the caller's transaction.
    pub async fn apply_balance_delta(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE accounts_tb SET balance = balance + $1, updated_at = now() \
             WHERE account_id = $2",
        )
        .bind(delta)
        .bind(account_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Open a new account for a user.
    ///
    /// A positive initial deposit is credited and recorded as a COMPLETED
    /// DEPOSIT ledger entry in the same store transaction as the account row
    /// itself, so a half-initialized account is never visible.
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        account_type: AccountType,
        initial_deposit: Decimal,
    ) -> Result<Account, AccountError> {
        if initial_deposit < Decimal::ZERO {
            return Err(AccountError::InvalidInitialDeposit);
        }

        let user = UserRepository::get_by_id(pool, user_id)
            .await?
            .ok_or(AccountError::UserNotFound(user_id))?;
        if !user.is_active() {
            return Err(AccountError::UserDisabled(user_id));
        }

        let account_number = Self::unused_account_number(pool).await?;
        let account_id = Uuid::new_v4();

        let mut tx = pool.begin().await?;

        let row = sqlx::query(
            r#"INSERT INTO accounts_tb (account_id, user_id, account_type, account_number, balance)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING created_at, updated_at"#,
        )
        .bind(account_id)
        .bind(user_id)
        .bind(i16::from(account_type))
        .bind(&account_number)
        .bind(initial_deposit)
        .fetch_one(&mut *tx)
        .await?;

        if initial_deposit > Decimal::ZERO {
            let entry = NewTransaction::deposit(
                generate_transaction_reference(),
                initial_deposit,
                account_id,
                Some("Initial deposit".to_string()),
            );
            let transaction_id = TransactionRepository::insert(&mut tx, &entry).await?;
            TransactionRepository::mark_completed(&mut tx, transaction_id).await?;
        }

        tx.commit().await?;

        Ok(Account {
            account_id,
            user_id,
            account_type,
            account_number,
            balance: initial_deposit,
            is_active: true,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Pick an account number not yet taken. The unique constraint remains
    /// the final authority; a lost race surfaces as a store error.
    async fn unused_account_number(pool: &PgPool) -> Result<String, sqlx::Error> {
        loop {
            let candidate = generate_account_number();
            let taken =
                sqlx::query("SELECT 1 AS one FROM accounts_tb WHERE account_number = $1")
                    .bind(&candidate)
                    .fetch_optional(pool)
                    .await?
                    .is_some();
            if !taken {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_account_number_shape() {
        for _ in 0..100 {
            let n = generate_account_number();
            assert_eq!(n.len(), 10);
            assert!(n.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
