//! Ledger read path: paginated history and reference lookup
//!
//! Pure reads over the same pool the executor writes through. Access control
//! is the HTTP layer's job: callers pass only account ids the requester is
//! allowed to see.

use super::models::{
    AccountParty, Transaction, TransactionStatus, TransactionType, TransactionWithDetails,
};
use crate::account::AccountType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Optional narrowing of a history query. The date range is closed and only
/// applied when both ends are present.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilters {
    pub tx_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

/// One page of history, newest first
#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionWithDetails>,
    pub total_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

impl TransactionPage {
    pub fn empty(page: i64) -> Self {
        Self {
            transactions: Vec::new(),
            total_count: 0,
            current_page: page.max(1),
            total_pages: 0,
        }
    }
}

fn total_pages(total_count: i64, limit: i64) -> i64 {
    (total_count + limit - 1) / limit
}

const DETAIL_SELECT: &str = r#"
SELECT t.transaction_id, t.reference, t.amount, t.description, t.tx_type, t.status,
       t.processing_fee, t.sender_account_id, t.receiver_account_id,
       t.external_account_number, t.external_routing_number, t.external_bank_name,
       t.metadata, t.created_at, t.processed_at,
       sa.account_number AS sender_account_number, sa.account_type AS sender_account_type,
       su.username AS sender_name, su.email AS sender_email,
       ra.account_number AS receiver_account_number, ra.account_type AS receiver_account_type,
       ru.username AS receiver_name, ru.email AS receiver_email
FROM transactions_tb t
LEFT JOIN accounts_tb sa ON sa.account_id = t.sender_account_id
LEFT JOIN users_tb su ON su.user_id = sa.user_id
LEFT JOIN accounts_tb ra ON ra.account_id = t.receiver_account_id
LEFT JOIN users_tb ru ON ru.user_id = ra.user_id
"#;

const FILTER_CLAUSE: &str = r#"
WHERE (t.sender_account_id = ANY($1) OR t.receiver_account_id = ANY($1))
  AND ($2::smallint IS NULL OR t.tx_type = $2)
  AND ($3::smallint IS NULL OR t.status = $3)
  AND ($4::timestamptz IS NULL OR $5::timestamptz IS NULL
       OR (t.created_at >= $4 AND t.created_at <= $5))
  AND ($6::numeric IS NULL OR t.amount >= $6)
  AND ($7::numeric IS NULL OR t.amount <= $7)
"#;

fn decode_enum_column<T>(raw: i16, index: &str) -> Result<T, sqlx::Error>
where
    T: TryFrom<i16, Error = String>,
{
    T::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: e.into(),
    })
}

fn party_from_row(row: &PgRow, prefix: &str) -> Result<Option<AccountParty>, sqlx::Error> {
    let account_id: Option<Uuid> = row.get(format!("{prefix}_account_id").as_str());
    let Some(account_id) = account_id else {
        return Ok(None);
    };
    let account_number: Option<String> = row.get(format!("{prefix}_account_number").as_str());
    let Some(account_number) = account_number else {
        // Dangling account reference; the entry is still valid on its own.
        return Ok(None);
    };

    let account_type: AccountType = decode_enum_column(
        row.get::<i16, _>(format!("{prefix}_account_type").as_str()),
        "account_type",
    )?;

    Ok(Some(AccountParty {
        account_id,
        account_number,
        account_type,
        owner_name: row.get(format!("{prefix}_name").as_str()),
        owner_email: row.get(format!("{prefix}_email").as_str()),
    }))
}

fn details_from_row(row: &PgRow) -> Result<TransactionWithDetails, sqlx::Error> {
    let tx_type: TransactionType = decode_enum_column(row.get::<i16, _>("tx_type"), "tx_type")?;
    let status: TransactionStatus = decode_enum_column(row.get::<i16, _>("status"), "status")?;

    let transaction = Transaction {
        transaction_id: row.get("transaction_id"),
        reference: row.get("reference"),
        amount: row.get("amount"),
        description: row.get("description"),
        tx_type,
        status,
        processing_fee: row.get("processing_fee"),
        sender_account_id: row.get("sender_account_id"),
        receiver_account_id: row.get("receiver_account_id"),
        external_account_number: row.get("external_account_number"),
        external_routing_number: row.get("external_routing_number"),
        external_bank_name: row.get("external_bank_name"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        processed_at: row.get("processed_at"),
    };

    Ok(TransactionWithDetails {
        sender_account: party_from_row(row, "sender")?,
        receiver_account: party_from_row(row, "receiver")?,
        transaction,
    })
}

/// Read-side queries over the ledger
pub struct LedgerQuery;

impl LedgerQuery {
    /// History of entries where any of the given accounts is sender OR
    /// receiver, newest first, with 1-based pages.
    pub async fn history(
        pool: &PgPool,
        account_ids: Vec<Uuid>,
        page: i64,
        limit: i64,
        filters: &TransactionFilters,
    ) -> Result<TransactionPage, sqlx::Error> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        if account_ids.is_empty() {
            return Ok(TransactionPage::empty(page));
        }

        let tx_type = filters.tx_type.map(i16::from);
        let status = filters.status.map(i16::from);

        let count_sql = format!("SELECT COUNT(*) AS total FROM transactions_tb t {FILTER_CLAUSE}");
        let total_count: i64 = sqlx::query(&count_sql)
            .bind(&account_ids)
            .bind(tx_type)
            .bind(status)
            .bind(filters.start_date)
            .bind(filters.end_date)
            .bind(filters.min_amount)
            .bind(filters.max_amount)
            .fetch_one(pool)
            .await?
            .get("total");

        let page_sql = format!(
            "{DETAIL_SELECT} {FILTER_CLAUSE} ORDER BY t.created_at DESC LIMIT $8 OFFSET $9"
        );
        let rows = sqlx::query(&page_sql)
            .bind(&account_ids)
            .bind(tx_type)
            .bind(status)
            .bind(filters.start_date)
            .bind(filters.end_date)
            .bind(filters.min_amount)
            .bind(filters.max_amount)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let transactions = rows
            .iter()
            .map(details_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            transactions,
            total_count,
            current_page: page,
            total_pages: total_pages(total_count, limit),
        })
    }

    /// Exact lookup by the shareable reference. `None` when absent; reads
    /// never mutate, so repeated calls return identical data.
    pub async fn find_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<TransactionWithDetails>, sqlx::Error> {
        let sql = format!("{DETAIL_SELECT} WHERE t.reference = $1");
        let row = sqlx::query(&sql)
            .bind(reference)
            .fetch_optional(pool)
            .await?;

        row.map(|r| details_from_row(&r)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(0, 20), 0);
    }
}
