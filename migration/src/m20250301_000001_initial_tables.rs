use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Username).string().not_null())
                    .col(ColumnDef::new(User::HashedPassword).string().not_null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_username")
                    .table(User::Table)
                    .col(User::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(Link::ShortCode).string().not_null())
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Link::RedirectCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Link::LastRedirectAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Link::OwnerId).big_integer().null())
                    .col(ColumnDef::new(Link::Category).string().null())
                    .col(
                        ColumnDef::new(Link::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_owner_id")
                            .from(Link::Table, Link::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // short_code uniqueness is the last line of defense against the
        // check-then-insert race in code assignment
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_short_code")
                    .table(Link::Table)
                    .col(Link::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_expires_at")
                    .table(Link::Table)
                    .col(Link::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_last_redirect_at")
                    .table(Link::Table)
                    .col(Link::LastRedirectAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_id")
                    .table(Link::Table)
                    .col(Link::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_owner_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_last_redirect_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_expires_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_short_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_users_username").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    HashedPassword,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    OriginalUrl,
    ShortCode,
    CreatedAt,
    ExpiresAt,
    RedirectCount,
    LastRedirectAt,
    OwnerId,
    Category,
    IsPublic,
}
