//! Ledger write path

use super::models::{NewTransaction, TransactionStatus};
use sqlx::{PgPool, Postgres, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },
}

/// Write access to ledger entries. Inserts and completion updates run inside
/// the caller's store transaction so they commit with the balance mutations
/// they describe.
pub struct TransactionRepository;

impl TransactionRepository {
    /// Insert a new ledger entry inside the caller's transaction.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        new: &NewTransaction,
    ) -> Result<Uuid, sqlx::Error> {
        let transaction_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO transactions_tb
                (transaction_id, reference, amount, description, tx_type, status,
                 processing_fee, sender_account_id, receiver_account_id,
                 external_account_number, external_routing_number, external_bank_name,
                 metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(transaction_id)
        .bind(&new.reference)
        .bind(new.amount)
        .bind(&new.description)
        .bind(i16::from(new.tx_type))
        .bind(i16::from(new.status))
        .bind(new.processing_fee)
        .bind(new.sender_account_id)
        .bind(new.receiver_account_id)
        .bind(&new.external_account_number)
        .bind(&new.external_routing_number)
        .bind(&new.external_bank_name)
        .bind(&new.metadata)
        .execute(&mut **tx)
        .await?;

        Ok(transaction_id)
    }

    /// Flip an in-flight entry to COMPLETED with a processing timestamp.
    pub async fn mark_completed(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        transaction_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE transactions_tb SET status = $1, processed_at = now() \
             WHERE transaction_id = $2",
        )
        .bind(i16::from(TransactionStatus::Completed))
        .bind(transaction_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Status-update contract for the out-of-band settlement collaborator.
    ///
    /// Transitions are forward-only; anything else is rejected without
    /// touching the row. Terminal transitions stamp `processed_at`.
    pub async fn transition_status(
        pool: &PgPool,
        reference: &str,
        next: TransactionStatus,
    ) -> Result<(), LedgerError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query("SELECT status FROM transactions_tb WHERE reference = $1 FOR UPDATE")
            .bind(reference)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| LedgerError::NotFound(reference.to_string()))?;

        let current = TransactionStatus::try_from(row.get::<i16, _>("status")).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "status".into(),
                source: e.into(),
            }
        })?;

        if !current.can_transition_to(next) {
            return Err(LedgerError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        sqlx::query(
            "UPDATE transactions_tb \
             SET status = $1, \
                 processed_at = CASE WHEN $2 THEN now() ELSE processed_at END \
             WHERE reference = $3",
        )
        .bind(i16::from(next))
        .bind(next.is_terminal())
        .bind(reference)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
