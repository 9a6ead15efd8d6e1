use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Service: newest-first paging with id tie-break
        manager
            .create_index(
                Index::create()
                    .name("idx_service_created_id")
                    .table(Service::Table)
                    .col(Service::CreatedAt)
                    .col(Service::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_category")
                    .table(Service::Table)
                    .col(Service::Category)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_city")
                    .table(Service::Table)
                    .col(Service::City)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_user")
                    .table(Service::Table)
                    .col(Service::UserId)
                    .to_owned(),
            )
            .await?;

        // Review: rating lookups per listing
        manager
            .create_index(
                Index::create()
                    .name("idx_review_service")
                    .table(Review::Table)
                    .col(Review::ServiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_request_service")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::ServiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_service_created_id", Service::Table.into_iden()),
            ("idx_service_category", Service::Table.into_iden()),
            ("idx_service_city", Service::Table.into_iden()),
            ("idx_service_user", Service::Table.into_iden()),
            ("idx_review_service", Review::Table.into_iden()),
            ("idx_request_service", ServiceRequest::Table.into_iden()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, UserId, Category, City, CreatedAt }

#[derive(DeriveIden)]
enum Review { Table, ServiceId }

#[derive(DeriveIden)]
enum ServiceRequest { Table, ServiceId }
