//! PayNow Order Sync Job
//!
//! Mirrors every completed PayNow order into `paynow_orders`:
//! 1. Ensures the table exists
//! 2. Pages through the orders endpoint with an `after` cursor
//! 3. Maps each order to an `OrderRow`
//! 4. Upserts all rows keyed on order id (last write wins)
//!
//! The job is single-shot. Nothing is persisted between runs, a re-run
//! starts from the first page again.

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Insert, TransactionTrait};
use sea_orm_migration::MigratorTrait;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::entities::paynow_orders;
use crate::error::SyncResult;
use crate::models::order::OrderRow;
use crate::services::paynow::OrderPageSource;

/// Orders requested per page. A shorter page ends the sync.
pub const PAGE_SIZE: u32 = 100;

/// Fixed pause between page requests for the PayNow rate limit
pub const PAGE_DELAY: Duration = Duration::from_millis(100);

/// Rows per INSERT, keeping 5 binds per row under driver parameter limits
pub const MAX_ROWS_PER_STATEMENT: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pages_fetched: usize,
    pub orders_processed: usize,
    pub rows_upserted: usize,
}

/// Everything pulled from the API in one run, before any write
#[derive(Debug, Default)]
pub struct CollectedOrders {
    pub rows: Vec<OrderRow>,
    pub pages_fetched: usize,
    pub orders_processed: usize,
}

pub struct OrderSyncJob<S> {
    source: S,
    page_size: u32,
    page_delay: Duration,
}

impl<S: OrderPageSource> OrderSyncJob<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: PAGE_SIZE,
            page_delay: PAGE_DELAY,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ensure the schema, then sync.
    pub async fn run(&self, db: &DatabaseConnection) -> SyncResult<SyncReport> {
        ensure_schema(db).await?;
        self.sync(db).await
    }

    /// Fetch every page, then write all rows at once. A failure while
    /// fetching or mapping leaves the database untouched.
    pub async fn sync(&self, db: &DatabaseConnection) -> SyncResult<SyncReport> {
        let collected = self.collect().await?;

        let rows_upserted = if collected.rows.is_empty() {
            debug!("No orders returned, skipping insert");
            0
        } else {
            info!("Inserting {} orders into database...", collected.rows.len());
            upsert_orders(db, &collected.rows).await?;
            info!(
                "Successfully inserted/updated {} orders",
                collected.rows.len()
            );
            collected.rows.len()
        };

        info!("Finished processing {} orders", collected.orders_processed);

        Ok(SyncReport {
            pages_fetched: collected.pages_fetched,
            orders_processed: collected.orders_processed,
            rows_upserted,
        })
    }

    /// Page through the API until a page comes back shorter than the page size.
    pub async fn collect(&self) -> SyncResult<CollectedOrders> {
        let page_size = self.page_size as usize;
        let mut collected = CollectedOrders::default();
        let mut after: Option<String> = None;

        loop {
            info!(
                "Fetching batch {}...",
                collected.orders_processed / page_size + 1
            );

            let page = self.source.fetch_page(after.as_deref(), self.page_size).await?;
            collected.pages_fetched += 1;

            for order in &page {
                collected.rows.push(OrderRow::try_from(order)?);
            }
            collected.orders_processed += page.len();

            if page.len() < page_size {
                break;
            }

            after = page.last().map(|order| order.id.clone());
            debug!(after = ?after, "Full page received, continuing");

            sleep(self.page_delay).await;
        }

        Ok(collected)
    }
}

/// Create `paynow_orders` if it does not exist yet.
pub async fn ensure_schema(db: &DatabaseConnection) -> SyncResult<()> {
    migration::Migrator::up(db, None).await?;
    Ok(())
}

/// Multi-row INSERT that overwrites every non-key column on an id conflict
pub fn build_upsert(rows: &[OrderRow]) -> Insert<paynow_orders::ActiveModel> {
    paynow_orders::Entity::insert_many(
        rows.iter().cloned().map(paynow_orders::ActiveModel::from),
    )
    .on_conflict(
        OnConflict::column(paynow_orders::Column::Id)
            .update_columns([
                paynow_orders::Column::MinecraftUuid,
                paynow_orders::Column::SubtotalCents,
                paynow_orders::Column::TotalCents,
                paynow_orders::Column::Completed,
            ])
            .to_owned(),
    )
}

/// Write all rows. Up to `MAX_ROWS_PER_STATEMENT` rows go out as one
/// statement; larger sets are chunked inside a single transaction.
pub async fn upsert_orders(db: &DatabaseConnection, rows: &[OrderRow]) -> SyncResult<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    if rows.len() <= MAX_ROWS_PER_STATEMENT {
        let affected = build_upsert(rows).exec_without_returning(db).await?;
        debug!(rows = rows.len(), affected, "Upsert executed");
        return Ok(affected);
    }

    let txn = db.begin().await?;
    let mut affected = 0;
    for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
        affected += build_upsert(chunk).exec_without_returning(&txn).await?;
    }
    txn.commit().await?;

    debug!(rows = rows.len(), affected, "Chunked upsert committed");
    Ok(affected)
}
