use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HeartRate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HeartRate::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HeartRate::Time)
                            .date_time()
                            .not_null()
                            .unique_key(),
                    )
                    // Sqlite has no unsigned types, so bpm lands in a small integer
                    .col(ColumnDef::new(HeartRate::Bpm).small_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // One device reading may carry SDNN, a daily resting rate, or both.
        manager
            .create_table(
                Table::create()
                    .table(HrvReading::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HrvReading::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HrvReading::Time)
                            .date_time()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(HrvReading::SdnnMs).double().null())
                    .col(ColumnDef::new(HrvReading::RestingBpm).small_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SleepStage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SleepStage::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SleepStage::Start)
                            .date_time()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SleepStage::End).date_time().not_null())
                    .col(ColumnDef::new(SleepStage::Kind).string_len(16).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vo2Max::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vo2Max::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Vo2Max::Time)
                            .date_time()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vo2Max::Value).double().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vo2Max::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SleepStage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HrvReading::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HeartRate::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HeartRate {
    Table,
    Id,
    Time,
    Bpm,
}

#[derive(Iden)]
enum HrvReading {
    Table,
    Id,
    Time,
    SdnnMs,
    RestingBpm,
}

#[derive(Iden)]
enum SleepStage {
    Table,
    Id,
    Start,
    End,
    Kind,
}

#[derive(Iden)]
enum Vo2Max {
    Table,
    Id,
    Time,
    Value,
}
