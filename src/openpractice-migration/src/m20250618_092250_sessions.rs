use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sessions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sessions::Start).date_time().not_null())
                    .col(ColumnDef::new(Sessions::End).date_time().not_null())
                    .col(ColumnDef::new(Sessions::Practice).string_len(64).not_null())
                    .col(ColumnDef::new(Sessions::Kcal).double().not_null())
                    .col(ColumnDef::new(Sessions::AvgBpm).small_integer().not_null())
                    .col(ColumnDef::new(Sessions::Effort).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionEvents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionEvents::SessionId).uuid().not_null())
                    .col(
                        ColumnDef::new(SessionEvents::Segment)
                            .string_len(64)
                            .not_null(),
                    )
                    // base64 exercise metadata, decoded on read
                    .col(ColumnDef::new(SessionEvents::Exercise).text().not_null())
                    .col(ColumnDef::new(SessionEvents::Start).date_time().not_null())
                    .col(ColumnDef::new(SessionEvents::End).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_events_sessions")
                            .from(SessionEvents::Table, SessionEvents::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Start,
    End,
    Practice,
    Kcal,
    AvgBpm,
    Effort,
}

#[derive(Iden)]
enum SessionEvents {
    Table,
    Id,
    SessionId,
    Segment,
    Exercise,
    Start,
    End,
}
