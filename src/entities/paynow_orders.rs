//! `SeaORM` Entity for paynow_orders table

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::models::order::OrderRow;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "paynow_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub minecraft_uuid: Option<Uuid>,
    pub subtotal_cents: i32,
    pub total_cents: i32,
    pub completed: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<OrderRow> for ActiveModel {
    fn from(row: OrderRow) -> Self {
        Self {
            id: Set(row.order_id),
            minecraft_uuid: Set(row.minecraft_uuid),
            subtotal_cents: Set(row.subtotal_cents),
            total_cents: Set(row.total_cents),
            completed: Set(row.completed),
        }
    }
}
