use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequest::Table)
                    .if_not_exists()
                    .col(uuid(ServiceRequest::Id).primary_key())
                    .col(uuid(ServiceRequest::ServiceId).not_null())
                    .col(string_len(ServiceRequest::Name, 128).not_null())
                    .col(string_len(ServiceRequest::Email, 255).not_null())
                    .col(string_len_null(ServiceRequest::Phone, 32))
                    .col(text(ServiceRequest::Message).not_null())
                    .col(timestamp_with_time_zone(ServiceRequest::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_service")
                            .from(ServiceRequest::Table, ServiceRequest::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceRequest { Table, Id, ServiceId, Name, Email, Phone, Message, CreatedAt }

#[derive(DeriveIden)]
enum Service { Table, Id }
