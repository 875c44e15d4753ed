use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Mirror of completed PayNow orders, read by the dashboards
        manager
            .create_table(
                Table::create()
                    .table(PaynowOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaynowOrders::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaynowOrders::MinecraftUuid).uuid().null())
                    .col(
                        ColumnDef::new(PaynowOrders::SubtotalCents)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaynowOrders::TotalCents).integer().not_null())
                    .col(ColumnDef::new(PaynowOrders::Completed).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaynowOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PaynowOrders {
    Table,
    Id,
    MinecraftUuid,
    SubtotalCents,
    TotalCents,
    Completed,
}
