use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Complaints {
    Table,
    Id,
    Title,
    Category,
    Description,
    RoomNumber,
    Location,
    ImagePath,
    Status,
    StudentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Complaints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Complaints::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Complaints::Category)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Complaints::Description).text().not_null())
                    .col(
                        ColumnDef::new(Complaints::RoomNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Complaints::Location)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Complaints::ImagePath).string())
                    .col(
                        ColumnDef::new(Complaints::Status)
                            .string_len(20)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Complaints::StudentId).integer().not_null())
                    .col(
                        ColumnDef::new(Complaints::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Complaints::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaints_student_id")
                            .from(Complaints::Table, Complaints::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_complaints_student_id")
                    .table(Complaints::Table)
                    .col(Complaints::StudentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaints::Table).to_owned())
            .await
    }
}
