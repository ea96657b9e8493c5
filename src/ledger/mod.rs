//! The transaction ledger: immutable audit records of every money movement

pub mod models;
pub mod query;
pub mod reference;
pub mod repository;

pub use models::{
    NewTransaction, Transaction, TransactionStatus, TransactionType, TransactionWithDetails,
};
pub use query::{LedgerQuery, TransactionFilters, TransactionPage};
pub use reference::generate_transaction_reference;
pub use repository::{LedgerError, TransactionRepository};
