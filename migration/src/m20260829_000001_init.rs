use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    DealId,
    CustomerName,
    CurrentStage,
    TaOwner,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Versions {
    Table,
    Id,
    DealId,
    VersionNumber,
    UseCases,
    Roadblocks,
    SolutionRecommendations,
    AdditionalComments,
    EditedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DealStageEnum {
    #[sea_orm(iden = "deal_stage")]
    Table,
}

const DEAL_STAGE_VALUES: &[&str] = &[
    "DISCOVERY",
    "PROPOSAL",
    "NEGOTIATION",
    "CLOSED_WON",
    "CLOSED_LOST",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_enum_sql = format!(
            "DO $$ BEGIN IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'deal_stage') THEN CREATE TYPE deal_stage AS ENUM ({}); END IF; END $$;",
            DEAL_STAGE_VALUES
                .iter()
                .map(|v| format!("'{}'", v))
                .collect::<Vec<_>>()
                .join(", ")
        );
        manager
            .get_connection()
            .execute_unprepared(&create_enum_sql)
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deals::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(Deals::DealId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Deals::CustomerName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deals::CurrentStage)
                            .custom(DealStageEnum::Table)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deals::TaOwner).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Deals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Versions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Versions::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Versions::DealId).uuid().not_null())
                    .col(
                        ColumnDef::new(Versions::VersionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Versions::UseCases).text().not_null())
                    .col(ColumnDef::new(Versions::Roadblocks).text().not_null())
                    .col(
                        ColumnDef::new(Versions::SolutionRecommendations)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Versions::AdditionalComments).text())
                    .col(ColumnDef::new(Versions::EditedBy).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Versions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_versions_deal")
                            .from(Versions::Table, Versions::DealId)
                            .to(Deals::Table, Deals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_versions_deal")
                    .table(Versions::Table)
                    .col(Versions::DealId)
                    .to_owned(),
            )
            .await?;

        // One version number per deal, enforced by the store as well as
        // by the service's row-locked append path.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_versions_deal_number")
                    .table(Versions::Table)
                    .col(Versions::DealId)
                    .col(Versions::VersionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Versions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS deal_stage;")
            .await?;
        Ok(())
    }
}
