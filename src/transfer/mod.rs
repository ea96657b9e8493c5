//! Transfer validation, fee rules and the atomic transfer executor

pub mod error;
pub mod service;
pub mod validation;

pub use error::{TransferError, TransferSide};
pub use service::{TransferReceipt, TransferService};
pub use validation::{
    ExternalTransferRequest, InternalTransferRequest, ValidationErrors, calculate_transfer_fee,
    validate_transfer_amount,
};
