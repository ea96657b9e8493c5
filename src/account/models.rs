//! Data models for account owners and bank accounts

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account owner status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum UserStatus {
    Disabled = 0,
    Active = 1,
}

impl From<i16> for UserStatus {
    fn from(v: i16) -> Self {
        match v {
            0 => UserStatus::Disabled,
            _ => UserStatus::Active,
        }
    }
}

/// Account owner
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Bank account category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    Checking = 1,
    Savings = 2,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Checking => write!(f, "CHECKING"),
            AccountType::Savings => write!(f, "SAVINGS"),
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CHECKING" | "1" => Ok(AccountType::Checking),
            "SAVINGS" | "2" => Ok(AccountType::Savings),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl TryFrom<i16> for AccountType {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(AccountType::Checking),
            2 => Ok(AccountType::Savings),
            other => Err(format!("Invalid account type column value: {}", other)),
        }
    }
}

impl From<AccountType> for i16 {
    fn from(val: AccountType) -> i16 {
        val as i16
    }
}

/// Bank account. The balance is only ever mutated by the transfer executor
/// (and onboarding), inside a single store transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_id: Uuid,
    pub user_id: i64,
    pub account_type: AccountType,
    pub account_number: String,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Last four digits of the external-facing account number.
    pub fn last_four(&self) -> &str {
        let n = &self.account_number;
        &n[n.len().saturating_sub(4)..]
    }

    /// Masked account number for notices and display.
    pub fn masked_number(&self) -> String {
        format!("****{}", self.last_four())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn account(number: &str) -> Account {
        Account {
            account_id: Uuid::new_v4(),
            user_id: 1,
            account_type: AccountType::Checking,
            account_number: number.to_string(),
            balance: dec!(100.00),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_status_from_i16() {
        assert_eq!(UserStatus::from(0), UserStatus::Disabled);
        assert_eq!(UserStatus::from(1), UserStatus::Active);
        assert_eq!(UserStatus::from(99), UserStatus::Active); // default to Active
    }

    #[test]
    fn test_account_type_conversions() {
        assert_eq!("CHECKING".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert_eq!("savings".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert!("money-market".parse::<AccountType>().is_err());

        assert_eq!(AccountType::try_from(2i16).unwrap(), AccountType::Savings);
        assert!(AccountType::try_from(7i16).is_err());
        assert_eq!(i16::from(AccountType::Checking), 1);
    }

    #[test]
    fn test_account_type_serde_names() {
        let json = serde_json::to_string(&AccountType::Checking).unwrap();
        assert_eq!(json, r#""CHECKING""#);
    }

    #[test]
    fn test_masked_number() {
        assert_eq!(account("1234567890").masked_number(), "****7890");
        assert_eq!(account("7890").last_four(), "7890");
        assert_eq!(account("90").masked_number(), "****90");
    }
}
