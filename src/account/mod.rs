//! Users, bank accounts and the PostgreSQL store handle

pub mod db;
pub mod models;
pub mod repository;

pub use db::Database;
pub use models::{Account, AccountType, User, UserStatus};
pub use repository::{AccountError, AccountRepository, UserRepository};
