use super::validation::ValidationErrors;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Which side of a transfer a failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSide {
    Sender,
    Receiver,
}

impl fmt::Display for TransferSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferSide::Sender => write!(f, "Sender"),
            TransferSide::Receiver => write!(f, "Receiver"),
        }
    }
}

/// Failures surfaced by the transfer executor.
///
/// Everything except `Database` and `DuplicateReference` is an expected
/// business outcome: callers branch on the variant, nothing is thrown past
/// the public contract.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0} account not found")]
    AccountNotFound(TransferSide),

    #[error("{0} account is inactive")]
    AccountInactive(TransferSide),

    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    #[error("Insufficient funds. Required: ${required:.2} (including ${fee:.2} fee)")]
    InsufficientFunds { required: Decimal, fee: Decimal },

    #[error("Could not allocate a unique transaction reference")]
    DuplicateReference,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TransferError {
    /// Recoverable business-rule failure, as opposed to a store fault.
    pub fn is_business(&self) -> bool {
        !matches!(
            self,
            TransferError::Database(_) | TransferError::DuplicateReference
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_insufficient_funds_message_names_amounts() {
        let err = TransferError::InsufficientFunds {
            required: dec!(102.99),
            fee: dec!(2.99),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds. Required: $102.99 (including $2.99 fee)"
        );
    }

    #[test]
    fn test_business_classification() {
        assert!(TransferError::SameAccountTransfer.is_business());
        assert!(TransferError::AccountNotFound(TransferSide::Receiver).is_business());
        assert!(!TransferError::DuplicateReference.is_business());
        assert!(!TransferError::Database(sqlx::Error::RowNotFound).is_business());
    }
}
