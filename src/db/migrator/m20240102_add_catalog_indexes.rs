use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("ix_jd_brand_ram")
                    .table(Jd::Table)
                    .col(Jd::Brand)
                    .col(Jd::Ram)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_jd_brand_cpu")
                    .table(Jd::Table)
                    .col(Jd::Brand)
                    .col(Jd::Cpu)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_jd_ram_gb")
                    .table(Jd::Table)
                    .col(Jd::RamGb)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_jd_original_id")
                    .table(Jd::Table)
                    .col(Jd::OriginalId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "ix_jd_brand_ram",
            "ix_jd_brand_cpu",
            "ix_jd_ram_gb",
            "ix_jd_original_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Jd::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Jd {
    Table,
    OriginalId,
    Brand,
    Ram,
    Cpu,
    RamGb,
}
