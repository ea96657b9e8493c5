//! Transfer executor: the only code path that mutates account balances.
//!
//! Every transfer runs as one store transaction with `FOR UPDATE` row locks
//! on the accounts involved. Either every mutation commits or none does; the
//! locks serialize concurrent balance checks so two transfers can never both
//! spend the same balance. Notifications fire after commit and never affect
//! the outcome.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::Postgres;
use uuid::Uuid;

use crate::account::{Account, AccountRepository, Database, UserRepository};
use crate::ledger::models::{NewTransaction, TransactionStatus, TransactionType};
use crate::ledger::reference::generate_transaction_reference;
use crate::ledger::repository::TransactionRepository;
use crate::notify::{NotificationSender, notices};

use super::error::{TransferError, TransferSide};
use super::validation::{
    ExternalTransferRequest, InternalTransferRequest, ValidatedExternalTransfer,
    ValidatedInternalTransfer, calculate_transfer_fee, validate_transfer_amount,
};

/// Outcome of an accepted transfer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub transaction_id: Uuid,
    pub reference: String,
    pub status: TransactionStatus,
}

/// How many times a transfer is attempted when the generated reference
/// collides with an existing one. The second attempt uses a fresh reference.
const REFERENCE_ATTEMPTS: u32 = 2;

pub struct TransferService {
    db: Arc<Database>,
    notifier: Arc<dyn NotificationSender>,
}

impl TransferService {
    pub fn new(db: Arc<Database>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { db, notifier }
    }

    /// Move funds between two accounts held by this system.
    pub async fn process_internal(
        &self,
        request: InternalTransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let request = request.validate()?;

        for attempt in 0..REFERENCE_ATTEMPTS {
            match self.execute_internal(&request).await {
                Err(TransferError::Database(e)) if is_unique_violation(&e) => {
                    tracing::warn!(
                        attempt,
                        "Transaction reference collided, retrying with a fresh one"
                    );
                }
                Err(e) => return Err(e),
                Ok(receipt) => return Ok(receipt),
            }
        }

        Err(TransferError::DuplicateReference)
    }

    /// Move funds from a system account to an external bank account.
    /// Fee-bearing; settles out-of-band, so the ledger entry stays PENDING.
    pub async fn process_external(
        &self,
        request: ExternalTransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let request = request.validate()?;

        for attempt in 0..REFERENCE_ATTEMPTS {
            match self.execute_external(&request).await {
                Err(TransferError::Database(e)) if is_unique_violation(&e) => {
                    tracing::warn!(
                        attempt,
                        "Transaction reference collided, retrying with a fresh one"
                    );
                }
                Err(e) => return Err(e),
                Ok(receipt) => return Ok(receipt),
            }
        }

        Err(TransferError::DuplicateReference)
    }

    async fn execute_internal(
        &self,
        request: &ValidatedInternalTransfer,
    ) -> Result<TransferReceipt, TransferError> {
        let mut tx = self.db.pool().begin().await?;

        let sender =
            Self::lock_active_account(&mut tx, request.sender_account_id, TransferSide::Sender)
                .await?;
        let receiver =
            Self::lock_active_account(&mut tx, request.receiver_account_id, TransferSide::Receiver)
                .await?;

        if sender.account_id == receiver.account_id {
            return Err(TransferError::SameAccountTransfer);
        }

        // Balance re-checked under the row lock: request-time validation
        // cannot be trusted once concurrent transfers are in flight.
        if !validate_transfer_amount(sender.balance, request.amount, Decimal::ZERO) {
            return Err(TransferError::InsufficientFunds {
                required: request.amount,
                fee: Decimal::ZERO,
            });
        }

        let reference = generate_transaction_reference();
        let description = request
            .description
            .clone()
            .unwrap_or_else(|| format!("Transfer to {}", receiver.last_four()));

        let entry = NewTransaction {
            reference: reference.clone(),
            amount: request.amount,
            description: Some(description),
            tx_type: TransactionType::InternalTransfer,
            status: TransactionStatus::Processing,
            processing_fee: Decimal::ZERO,
            sender_account_id: Some(sender.account_id),
            receiver_account_id: Some(receiver.account_id),
            external_account_number: None,
            external_routing_number: None,
            external_bank_name: None,
            metadata: None,
        };
        let transaction_id = TransactionRepository::insert(&mut tx, &entry).await?;

        AccountRepository::apply_balance_delta(&mut tx, sender.account_id, -request.amount).await?;
        AccountRepository::apply_balance_delta(&mut tx, receiver.account_id, request.amount)
            .await?;

        TransactionRepository::mark_completed(&mut tx, transaction_id).await?;

        tx.commit().await?;

        tracing::info!(
            reference = %reference,
            amount = %request.amount,
            "Internal transfer completed"
        );

        self.dispatch_internal_notices(
            &sender,
            &receiver,
            request.amount,
            sender.balance - request.amount,
            reference.clone(),
        );

        Ok(TransferReceipt {
            transaction_id,
            reference,
            status: TransactionStatus::Completed,
        })
    }

    async fn execute_external(
        &self,
        request: &ValidatedExternalTransfer,
    ) -> Result<TransferReceipt, TransferError> {
        let fee = calculate_transfer_fee(request.amount, true);
        let total = request.amount + fee;

        let mut tx = self.db.pool().begin().await?;

        let sender =
            Self::lock_active_account(&mut tx, request.sender_account_id, TransferSide::Sender)
                .await?;

        if !validate_transfer_amount(sender.balance, request.amount, fee) {
            return Err(TransferError::InsufficientFunds {
                required: total,
                fee,
            });
        }

        let reference = generate_transaction_reference();
        let description = request
            .description
            .clone()
            .unwrap_or_else(|| format!("External transfer to {}", request.external_bank_name));

        let entry = NewTransaction {
            reference: reference.clone(),
            amount: request.amount,
            description: Some(description),
            tx_type: TransactionType::ExternalTransfer,
            status: TransactionStatus::Pending,
            processing_fee: fee,
            sender_account_id: Some(sender.account_id),
            receiver_account_id: None,
            external_account_number: Some(request.external_account_number.clone()),
            external_routing_number: Some(request.external_routing_number.clone()),
            external_bank_name: Some(request.external_bank_name.clone()),
            metadata: Some(serde_json::json!({
                "external_transfer": true,
                "estimated_completion_days": "1-2",
            })),
        };
        let transaction_id = TransactionRepository::insert(&mut tx, &entry).await?;

        // Amount plus fee leave the sender immediately; settlement of the
        // entry itself happens out-of-band.
        AccountRepository::apply_balance_delta(&mut tx, sender.account_id, -total).await?;

        tx.commit().await?;

        tracing::info!(
            reference = %reference,
            amount = %request.amount,
            fee = %fee,
            "External transfer accepted"
        );

        self.dispatch_external_notice(&sender, request.amount, sender.balance - total, reference.clone());

        Ok(TransferReceipt {
            transaction_id,
            reference,
            status: TransactionStatus::Pending,
        })
    }

    async fn lock_active_account(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        account_id: Uuid,
        side: TransferSide,
    ) -> Result<Account, TransferError> {
        let account = AccountRepository::get_by_id_for_update(tx, account_id)
            .await?
            .ok_or(TransferError::AccountNotFound(side))?;

        if !account.is_active {
            return Err(TransferError::AccountInactive(side));
        }

        Ok(account)
    }

    /// Sender debit notice + receiver credit notice, fire-and-forget.
    fn dispatch_internal_notices(
        &self,
        sender: &Account,
        receiver: &Account,
        amount: Decimal,
        sender_balance_after: Decimal,
        reference: String,
    ) {
        let db = self.db.clone();
        let notifier = self.notifier.clone();
        let sender_user_id = sender.user_id;
        let receiver_user_id = receiver.user_id;
        let sender_masked = sender.masked_number();
        let receiver_masked = receiver.masked_number();

        tokio::spawn(async move {
            match UserRepository::get_by_id(db.pool(), sender_user_id).await {
                Ok(Some(user)) => {
                    let (subject, body) = notices::debit_notice(
                        &user.username,
                        "Internal Transfer",
                        amount,
                        &sender_masked,
                        &reference,
                        sender_balance_after,
                        Some(&receiver_masked),
                    );
                    if !notifier.send(&user.email, &subject, &body).await {
                        tracing::warn!(reference = %reference, "Debit notice was not delivered");
                    }
                }
                Ok(None) => tracing::warn!("Sender user {} not found for notice", sender_user_id),
                Err(e) => tracing::warn!("Could not load sender for notice: {}", e),
            }

            match UserRepository::get_by_id(db.pool(), receiver_user_id).await {
                Ok(Some(user)) => {
                    let (subject, body) =
                        notices::credit_notice(&user.username, amount, &receiver_masked, &reference);
                    if !notifier.send(&user.email, &subject, &body).await {
                        tracing::warn!(reference = %reference, "Credit notice was not delivered");
                    }
                }
                Ok(None) => {
                    tracing::warn!("Receiver user {} not found for notice", receiver_user_id)
                }
                Err(e) => tracing::warn!("Could not load receiver for notice: {}", e),
            }
        });
    }

    /// Sender debit notice for an external transfer, fire-and-forget.
    fn dispatch_external_notice(
        &self,
        sender: &Account,
        amount: Decimal,
        sender_balance_after: Decimal,
        reference: String,
    ) {
        let db = self.db.clone();
        let notifier = self.notifier.clone();
        let sender_user_id = sender.user_id;
        let sender_masked = sender.masked_number();

        tokio::spawn(async move {
            match UserRepository::get_by_id(db.pool(), sender_user_id).await {
                Ok(Some(user)) => {
                    let (subject, body) = notices::debit_notice(
                        &user.username,
                        "External Transfer",
                        amount,
                        &sender_masked,
                        &reference,
                        sender_balance_after,
                        None,
                    );
                    if !notifier.send(&user.email, &subject, &body).await {
                        tracing::warn!(reference = %reference, "Debit notice was not delivered");
                    }
                }
                Ok(None) => tracing::warn!("Sender user {} not found for notice", sender_user_id),
                Err(e) => tracing::warn!("Could not load sender for notice: {}", e),
            }
        });
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
