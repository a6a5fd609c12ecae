use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Status,
    UpdatedAt,
}

/// Indexes for the two hot scans: the admin active/history listings filter
/// on status, and the retention sweeper filters on status + updated_at.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_status")
                    .table(Complaints::Table)
                    .col(Complaints::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_status_updated_at")
                    .table(Complaints::Table)
                    .col(Complaints::Status)
                    .col(Complaints::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_complaints_status_updated_at")
                    .table(Complaints::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_complaints_status")
                    .table(Complaints::Table)
                    .to_owned(),
            )
            .await
    }
}
