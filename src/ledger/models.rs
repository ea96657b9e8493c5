//! Ledger entry models

use crate::account::AccountType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of money movement recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    InternalTransfer = 1,
    ExternalTransfer = 2,
    Deposit = 3,
    Withdrawal = 4,
    Fee = 5,
    Interest = 6,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::InternalTransfer => "INTERNAL_TRANSFER",
            TransactionType::ExternalTransfer => "EXTERNAL_TRANSFER",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Fee => "FEE",
            TransactionType::Interest => "INTEREST",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INTERNAL_TRANSFER" => Ok(TransactionType::InternalTransfer),
            "EXTERNAL_TRANSFER" => Ok(TransactionType::ExternalTransfer),
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "FEE" => Ok(TransactionType::Fee),
            "INTEREST" => Ok(TransactionType::Interest),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl TryFrom<i16> for TransactionType {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(TransactionType::InternalTransfer),
            2 => Ok(TransactionType::ExternalTransfer),
            3 => Ok(TransactionType::Deposit),
            4 => Ok(TransactionType::Withdrawal),
            5 => Ok(TransactionType::Fee),
            6 => Ok(TransactionType::Interest),
            other => Err(format!("Invalid transaction type column value: {}", other)),
        }
    }
}

impl From<TransactionType> for i16 {
    fn from(val: TransactionType) -> i16 {
        val as i16
    }
}

/// Processing state of a ledger entry. Transitions only move forward:
/// PENDING -> PROCESSING -> COMPLETED | FAILED | CANCELLED, with no exit
/// from terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
    Cancelled = 5,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed | TransactionStatus::Cancelled
        )
    }

    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        match self {
            TransactionStatus::Pending => next != TransactionStatus::Pending,
            TransactionStatus::Processing => {
                next != TransactionStatus::Pending && next != TransactionStatus::Processing
            }
            _ => false,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "PROCESSING" => Ok(TransactionStatus::Processing),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "FAILED" => Ok(TransactionStatus::Failed),
            "CANCELLED" => Ok(TransactionStatus::Cancelled),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl TryFrom<i16> for TransactionStatus {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(TransactionStatus::Pending),
            2 => Ok(TransactionStatus::Processing),
            3 => Ok(TransactionStatus::Completed),
            4 => Ok(TransactionStatus::Failed),
            5 => Ok(TransactionStatus::Cancelled),
            other => Err(format!("Invalid transaction status column value: {}", other)),
        }
    }
}

impl From<TransactionStatus> for i16 {
    fn from(val: TransactionStatus) -> i16 {
        val as i16
    }
}

/// Immutable audit record of one money movement.
///
/// Internal transfers carry both account ids; external transfers carry the
/// sender plus the off-system bank coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub reference: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub processing_fee: Decimal,
    pub sender_account_id: Option<Uuid>,
    pub receiver_account_id: Option<Uuid>,
    pub external_account_number: Option<String>,
    pub external_routing_number: Option<String>,
    pub external_bank_name: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Fields for a new ledger entry; id and timestamps are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub reference: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub processing_fee: Decimal,
    pub sender_account_id: Option<Uuid>,
    pub receiver_account_id: Option<Uuid>,
    pub external_account_number: Option<String>,
    pub external_routing_number: Option<String>,
    pub external_bank_name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NewTransaction {
    /// Deposit entry crediting one account from outside the system.
    pub fn deposit(
        reference: String,
        amount: Decimal,
        receiver_account_id: Uuid,
        description: Option<String>,
    ) -> Self {
        Self {
            reference,
            amount,
            description,
            tx_type: TransactionType::Deposit,
            status: TransactionStatus::Processing,
            processing_fee: Decimal::ZERO,
            sender_account_id: None,
            receiver_account_id: Some(receiver_account_id),
            external_account_number: None,
            external_routing_number: None,
            external_bank_name: None,
            metadata: None,
        }
    }
}

/// Counterparty details embedded in history rows
#[derive(Debug, Clone, Serialize)]
pub struct AccountParty {
    pub account_id: Uuid,
    pub account_number: String,
    pub account_type: AccountType,
    pub owner_name: String,
    pub owner_email: String,
}

/// A ledger entry enriched with sender/receiver account and owner details
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub sender_account: Option<AccountParty>,
    pub receiver_account: Option<AccountParty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trips() {
        for t in [
            TransactionType::InternalTransfer,
            TransactionType::ExternalTransfer,
            TransactionType::Deposit,
            TransactionType::Withdrawal,
            TransactionType::Fee,
            TransactionType::Interest,
        ] {
            assert_eq!(t.to_string().parse::<TransactionType>().unwrap(), t);
            assert_eq!(TransactionType::try_from(i16::from(t)).unwrap(), t);
        }
        assert!("REFUND".parse::<TransactionType>().is_err());
        assert!(TransactionType::try_from(0i16).is_err());
    }

    #[test]
    fn test_serde_screaming_names() {
        assert_eq!(
            serde_json::to_string(&TransactionType::InternalTransfer).unwrap(),
            r#""INTERNAL_TRANSFER""#
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Pending).unwrap(),
            r#""PENDING""#
        );
    }

    #[test]
    fn test_status_moves_forward_only() {
        use TransactionStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        // No re-entry, no exit from terminal states
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states() {
        use TransactionStatus::*;
        assert!(!Pending.is_terminal());
        assert!(!Processing.is_terminal());
        assert!(Completed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(Cancelled.is_terminal());
    }
}
