use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ServiceUser {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum UserPointsLedger {
    Table,
    Id,
    UserId,
    Version,
    PointsChange,
    Points,
    Reason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserPointsHistory {
    Table,
    Id,
    UserId,
    PointsChange,
    Reason,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPointsLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPointsLedger::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserPointsLedger::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsLedger::Version)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsLedger::PointsChange)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsLedger::Points)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsLedger::Reason)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsLedger::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_points_ledger_user")
                            .from(UserPointsLedger::Table, UserPointsLedger::UserId)
                            .to(ServiceUser::Table, ServiceUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (user_id, version) 唯一，同时充当并发写入的守卫
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_user_points_ledger_user_version")
                    .table(UserPointsLedger::Table)
                    .col(UserPointsLedger::UserId)
                    .col(UserPointsLedger::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserPointsHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPointsHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserPointsHistory::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsHistory::PointsChange)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserPointsHistory::Reason)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPointsHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_points_history_user")
                            .from(UserPointsHistory::Table, UserPointsHistory::UserId)
                            .to(ServiceUser::Table, ServiceUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(UserPointsHistory::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(UserPointsLedger::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
