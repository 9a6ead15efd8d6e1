//! Create `service` table (listings) with FK to the owning `profile`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::UserId).not_null())
                    .col(string_len(Service::Title, 100).not_null())
                    .col(text(Service::Description).not_null())
                    .col(string_len(Service::Category, 32).not_null())
                    .col(string_len(Service::City, 32).not_null())
                    .col(string_len(Service::ContactEmail, 255).not_null())
                    .col(string_len_null(Service::ContactPhone, 32))
                    .col(string_len_null(Service::ImageUrl, 512))
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_profile")
                            .from(Service::Table, Service::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Category,
    City,
    ContactEmail,
    ContactPhone,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profile { Table, Id }
