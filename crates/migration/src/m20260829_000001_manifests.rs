//! Creates the `manifests` table.
//!
//! One row per consolidated manifest: the embedded HBL tree lives in a JSON
//! column, the derived weight/CBM rollups in scalar columns so lists and
//! reports never decode the tree.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Manifests {
    Table,
    Id,
    Hbls,
    TotalWeight,
    TotalCbm,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Manifests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Manifests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Manifests::Hbls).json().not_null())
                    .col(
                        ColumnDef::new(Manifests::TotalWeight)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Manifests::TotalCbm).double().not_null())
                    .col(
                        ColumnDef::new(Manifests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-manifests-created_at")
                    .table(Manifests::Table)
                    .col(Manifests::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Manifests::Table).to_owned())
            .await
    }
}
