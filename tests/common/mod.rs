#![allow(dead_code)]

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::collections::VecDeque;
use std::sync::Mutex;

use paynow_order_sync::models::order::{PayNowCustomer, PayNowOrder};
use paynow_order_sync::services::paynow::OrderPageSource;
use paynow_order_sync::{SyncError, SyncResult};

/// Fresh in-memory SQLite database. A single connection keeps every query on
/// the same memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opt).await
}

pub fn order(id: &str, total_amount: i64) -> PayNowOrder {
    PayNowOrder {
        id: id.to_string(),
        customer: PayNowCustomer {
            minecraft_uuid: Some("069a79f4-44e9-4726-a5be-fca90e38aaf5".to_string()),
        },
        subtotal_amount: 100,
        total_amount,
        completed_at: "2024-03-05T10:22:41.000Z".to_string(),
    }
}

/// `count` orders with ids `{prefix}{start}..`, zero padded so they sort
pub fn page(prefix: &str, start: usize, count: usize) -> Vec<PayNowOrder> {
    (start..start + count)
        .map(|n| order(&format!("{}{:05}", prefix, n), 1000))
        .collect()
}

/// Replays a fixed list of page responses and records every cursor it was
/// asked for.
pub struct ScriptedSource {
    pages: Mutex<VecDeque<SyncResult<Vec<PayNowOrder>>>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<SyncResult<Vec<PayNowOrder>>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            cursors: Mutex::new(Vec::new()),
        }
    }

    pub fn from_pages(pages: Vec<Vec<PayNowOrder>>) -> Self {
        Self::new(pages.into_iter().map(Ok).collect())
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderPageSource for ScriptedSource {
    async fn fetch_page(&self, after: Option<&str>, limit: u32) -> SyncResult<Vec<PayNowOrder>> {
        assert_eq!(limit, 100);
        self.cursors.lock().unwrap().push(after.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::UnexpectedResponse("no more scripted pages".into())))
    }
}
