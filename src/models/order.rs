use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

/// Text form of `completed`, as read by the dashboards
pub const COMPLETED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Order object returned by `GET /stores/{store_id}/orders`.
/// Only the fields mirrored locally are deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayNowOrder {
    pub id: String,
    pub customer: PayNowCustomer,
    pub subtotal_amount: i64,
    pub total_amount: i64,
    pub completed_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayNowCustomer {
    #[serde(default)]
    pub minecraft_uuid: Option<String>,
}

/// Local row shape of `paynow_orders`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub order_id: String,
    pub minecraft_uuid: Option<Uuid>,
    pub subtotal_cents: i32,
    pub total_cents: i32,
    pub completed: NaiveDateTime,
}

impl OrderRow {
    pub fn completed_text(&self) -> String {
        self.completed.format(COMPLETED_FORMAT).to_string()
    }
}

impl TryFrom<&PayNowOrder> for OrderRow {
    type Error = SyncError;

    fn try_from(order: &PayNowOrder) -> SyncResult<Self> {
        let minecraft_uuid = match order.customer.minecraft_uuid.as_deref() {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|e| SyncError::invalid_order(&order.id, format!("minecraft_uuid: {}", e)))?,
            ),
            None => None,
        };

        let completed = normalize_completed_at(&order.completed_at)
            .map_err(|reason| SyncError::invalid_order(&order.id, reason))?;

        Ok(Self {
            order_id: order.id.clone(),
            minecraft_uuid,
            subtotal_cents: cents(&order.id, "subtotal_amount", order.subtotal_amount)?,
            total_cents: cents(&order.id, "total_amount", order.total_amount)?,
            completed,
        })
    }
}

fn cents(order_id: &str, field: &str, amount: i64) -> SyncResult<i32> {
    i32::try_from(amount).map_err(|_| {
        SyncError::invalid_order(order_id, format!("{} {} does not fit in INT", field, amount))
    })
}

/// Parse a remote completion timestamp into UTC, truncated to whole seconds.
///
/// RFC 3339 input with any offset is converted to UTC. Input without an
/// offset is taken as UTC.
pub fn normalize_completed_at(raw: &str) -> Result<NaiveDateTime, String> {
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc).naive_utc(),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|_| format!("completed_at '{}': {}", raw, rfc_err))?,
    };

    parsed
        .with_nanosecond(0)
        .ok_or_else(|| format!("completed_at '{}' out of range", raw))
}
