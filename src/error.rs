use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Missing required environment variable: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("PayNow API error {status}: {body}")]
    ApiStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid order {order_id}: {reason}")]
    InvalidOrder { order_id: String, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl SyncError {
    pub(crate) fn invalid_order(order_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            order_id: order_id.into(),
            reason: reason.into(),
        }
    }
}
