//! corebank - Ledger Transfer Service
//!
//! Account-to-account money movement on a PostgreSQL ledger.
//!
//! # Modules
//!
//! - [`account`] - Users, bank accounts, onboarding, the Postgres pool
//! - [`ledger`] - Transaction records, references, history queries
//! - [`transfer`] - Validation, fee rules, and the atomic transfer executor
//! - [`notify`] - Best-effort customer notifications
//! - [`gateway`] - HTTP API surface (axum)
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing bootstrap

pub mod account;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod notify;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountType, Database};
pub use ledger::{Transaction, TransactionStatus, TransactionType};
pub use transfer::{TransferError, TransferReceipt, TransferService};
