use std::sync::Arc;

use crate::account::Database;
use crate::transfer::TransferService;

/// Shared gateway state
pub struct AppState {
    pub db: Arc<Database>,
    pub transfers: TransferService,
    /// Shared secret protecting the internal settlement endpoint.
    pub internal_secret: String,
}

impl AppState {
    pub fn new(db: Arc<Database>, transfers: TransferService, internal_secret: String) -> Self {
        Self {
            db,
            transfers,
            internal_secret,
        }
    }
}
