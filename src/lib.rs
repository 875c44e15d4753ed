// src/lib.rs

pub mod config;
pub mod error;

pub mod entities {
    pub mod paynow_orders;
}

pub mod models {
    pub mod order;
}

pub mod services {
    pub mod paynow;
}

pub mod jobs {
    pub mod order_sync;
}

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use jobs::order_sync::{OrderSyncJob, SyncReport};
