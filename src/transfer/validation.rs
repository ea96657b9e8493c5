//! Request validation and fee rules
//!
//! Shape-level checks run before any store access and collect every violated
//! field, not just the first. Balance sufficiency is re-checked by the
//! executor under a row lock; the pure rules live here so both layers share
//! one definition.

use rust_decimal::{Decimal, dec};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Single-transfer limits. Product rules, not store capacity.
pub const MIN_TRANSFER_AMOUNT: Decimal = dec!(0.01);
pub const MAX_INTERNAL_TRANSFER: Decimal = dec!(50000);
pub const MAX_EXTERNAL_TRANSFER: Decimal = dec!(10000);
pub const MAX_DESCRIPTION_LEN: usize = 255;
pub const MAX_BANK_NAME_LEN: usize = 100;

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every violated field of a request, collected before anything is mutated
#[derive(Debug, Clone, Default, Error, Serialize)]
#[error("Invalid request: {}", summary(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// True iff the balance covers the amount plus the fee. Pure.
pub fn validate_transfer_amount(balance: Decimal, amount: Decimal, fee: Decimal) -> bool {
    balance >= amount + fee
}

/// Processing fee schedule. Internal transfers are free; external transfers
/// pay a tiered flat fee with the upper bound of each band inclusive.
pub fn calculate_transfer_fee(amount: Decimal, is_external: bool) -> Decimal {
    if !is_external {
        return Decimal::ZERO;
    }

    if amount <= dec!(1000) {
        dec!(2.99)
    } else if amount <= dec!(5000) {
        dec!(4.99)
    } else {
        dec!(9.99)
    }
}

fn check_account_id(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    required_msg: &str,
) -> Option<Uuid> {
    if value.trim().is_empty() {
        errors.push(field, required_msg);
        return None;
    }
    match Uuid::parse_str(value.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, "Must be a valid account id");
            None
        }
    }
}

fn check_amount(errors: &mut ValidationErrors, amount: Decimal, max: Decimal, max_msg: &str) {
    if amount <= Decimal::ZERO {
        errors.push("amount", "Amount must be positive");
    } else if amount < MIN_TRANSFER_AMOUNT {
        errors.push("amount", "Minimum transfer amount is $0.01");
    } else if amount > max {
        errors.push("amount", max_msg);
    }
}

fn check_description(errors: &mut ValidationErrors, description: &Option<String>) {
    if let Some(d) = description {
        if d.len() > MAX_DESCRIPTION_LEN {
            errors.push("description", "Description must be less than 255 characters");
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Transfer between two accounts held by this system
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTransferRequest {
    pub sender_account_id: String,
    pub receiver_account_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// An internal transfer request with every field checked and ids parsed
#[derive(Debug, Clone)]
pub struct ValidatedInternalTransfer {
    pub sender_account_id: Uuid,
    pub receiver_account_id: Uuid,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl InternalTransferRequest {
    pub fn validate(&self) -> Result<ValidatedInternalTransfer, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let sender = check_account_id(
            &mut errors,
            "senderAccountId",
            &self.sender_account_id,
            "Sender account is required",
        );
        let receiver = check_account_id(
            &mut errors,
            "receiverAccountId",
            &self.receiver_account_id,
            "Receiver account is required",
        );
        check_amount(
            &mut errors,
            self.amount,
            MAX_INTERNAL_TRANSFER,
            "Maximum transfer amount is $50,000",
        );
        check_description(&mut errors, &self.description);

        match (sender, receiver) {
            (Some(sender_account_id), Some(receiver_account_id)) if errors.is_empty() => {
                Ok(ValidatedInternalTransfer {
                    sender_account_id,
                    receiver_account_id,
                    amount: self.amount,
                    description: self.description.clone(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Transfer from a system account to an external bank account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTransferRequest {
    pub sender_account_id: String,
    pub amount: Decimal,
    pub external_account_number: String,
    pub external_routing_number: String,
    pub external_bank_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An external transfer request with every field checked and the id parsed
#[derive(Debug, Clone)]
pub struct ValidatedExternalTransfer {
    pub sender_account_id: Uuid,
    pub amount: Decimal,
    pub external_account_number: String,
    pub external_routing_number: String,
    pub external_bank_name: String,
    pub description: Option<String>,
}

impl ExternalTransferRequest {
    pub fn validate(&self) -> Result<ValidatedExternalTransfer, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let sender = check_account_id(
            &mut errors,
            "senderAccountId",
            &self.sender_account_id,
            "Sender account is required",
        );
        check_amount(
            &mut errors,
            self.amount,
            MAX_EXTERNAL_TRANSFER,
            "Maximum external transfer amount is $10,000",
        );

        let account_number = self.external_account_number.trim();
        if !is_digits(account_number) {
            errors.push(
                "externalAccountNumber",
                "Account number must contain only digits",
            );
        } else if account_number.len() < 8 {
            errors.push(
                "externalAccountNumber",
                "Account number must be at least 8 digits",
            );
        } else if account_number.len() > 17 {
            errors.push(
                "externalAccountNumber",
                "Account number must be less than 18 digits",
            );
        }

        let routing_number = self.external_routing_number.trim();
        if !is_digits(routing_number) {
            errors.push(
                "externalRoutingNumber",
                "Routing number must contain only digits",
            );
        } else if routing_number.len() != 9 {
            errors.push(
                "externalRoutingNumber",
                "Routing number must be exactly 9 digits",
            );
        }

        let bank_name = self.external_bank_name.trim();
        if bank_name.is_empty() {
            errors.push("externalBankName", "Bank name is required");
        } else if bank_name.len() > MAX_BANK_NAME_LEN {
            errors.push(
                "externalBankName",
                "Bank name must be less than 100 characters",
            );
        }

        check_description(&mut errors, &self.description);

        match sender {
            Some(sender_account_id) if errors.is_empty() => Ok(ValidatedExternalTransfer {
                sender_account_id,
                amount: self.amount,
                external_account_number: account_number.to_string(),
                external_routing_number: routing_number.to_string(),
                external_bank_name: bank_name.to_string(),
                description: self.description.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_transfer_amount_table() {
        assert!(validate_transfer_amount(dec!(100), dec!(100), dec!(0)));
        assert!(!validate_transfer_amount(dec!(100), dec!(100.01), dec!(0)));
        assert!(!validate_transfer_amount(dec!(100), dec!(90), dec!(10.01)));
        assert!(validate_transfer_amount(dec!(100), dec!(90), dec!(10)));
    }

    #[test]
    fn test_fee_tier_boundaries() {
        assert_eq!(calculate_transfer_fee(dec!(1000), true), dec!(2.99));
        assert_eq!(calculate_transfer_fee(dec!(1000.01), true), dec!(4.99));
        assert_eq!(calculate_transfer_fee(dec!(5000), true), dec!(4.99));
        assert_eq!(calculate_transfer_fee(dec!(5000.01), true), dec!(9.99));
        assert_eq!(calculate_transfer_fee(dec!(0.01), true), dec!(2.99));
    }

    #[test]
    fn test_internal_transfers_are_free() {
        for amount in [dec!(0.01), dec!(1000), dec!(5000.01), dec!(50000)] {
            assert_eq!(calculate_transfer_fee(amount, false), Decimal::ZERO);
        }
    }

    fn internal_request(amount: Decimal) -> InternalTransferRequest {
        InternalTransferRequest {
            sender_account_id: Uuid::new_v4().to_string(),
            receiver_account_id: Uuid::new_v4().to_string(),
            amount,
            description: None,
        }
    }

    #[test]
    fn test_internal_request_accepts_bounds() {
        assert!(internal_request(dec!(0.01)).validate().is_ok());
        assert!(internal_request(dec!(50000)).validate().is_ok());
    }

    #[test]
    fn test_internal_request_rejects_out_of_range_amounts() {
        for amount in [dec!(0), dec!(-5), dec!(0.001), dec!(50000.01)] {
            let err = internal_request(amount).validate().unwrap_err();
            assert_eq!(err.errors.len(), 1);
            assert_eq!(err.errors[0].field, "amount");
        }
    }

    #[test]
    fn test_internal_request_collects_every_violation() {
        let req = InternalTransferRequest {
            sender_account_id: "".to_string(),
            receiver_account_id: "not-a-uuid".to_string(),
            amount: dec!(-1),
            description: Some("x".repeat(256)),
        };
        let err = req.validate().unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "senderAccountId",
                "receiverAccountId",
                "amount",
                "description"
            ]
        );
        // The rendered message enumerates all of them
        let msg = err.to_string();
        assert!(msg.contains("Sender account is required"));
        assert!(msg.contains("Amount must be positive"));
    }

    fn external_request() -> ExternalTransferRequest {
        ExternalTransferRequest {
            sender_account_id: Uuid::new_v4().to_string(),
            amount: dec!(100),
            external_account_number: "12345678".to_string(),
            external_routing_number: "123456789".to_string(),
            external_bank_name: "First National".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_external_request_valid() {
        assert!(external_request().validate().is_ok());
    }

    #[test]
    fn test_external_request_amount_cap() {
        let mut req = external_request();
        req.amount = dec!(10000);
        assert!(req.validate().is_ok());
        req.amount = dec!(10000.01);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_external_account_number_rules() {
        let mut req = external_request();
        req.external_account_number = "1234567".to_string(); // 7 digits
        assert!(req.validate().is_err());

        req.external_account_number = "123456789012345678".to_string(); // 18 digits
        assert!(req.validate().is_err());

        req.external_account_number = "12345abc".to_string();
        let err = req.validate().unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "externalAccountNumber"));

        req.external_account_number = "12345678901234567".to_string(); // 17 digits
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_external_routing_number_rules() {
        let mut req = external_request();
        req.external_routing_number = "12345678".to_string();
        assert!(req.validate().is_err());
        req.external_routing_number = "1234567890".to_string();
        assert!(req.validate().is_err());
        req.external_routing_number = "12345678x".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_external_bank_name_rules() {
        let mut req = external_request();
        req.external_bank_name = "  ".to_string();
        assert!(req.validate().is_err());
        req.external_bank_name = "b".repeat(101);
        assert!(req.validate().is_err());
    }
}
