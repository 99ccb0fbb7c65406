use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    RawMarkdown,
    Summary,
    Tags,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
    RawMarkdownAudioUrl,
    SummaryAudioUrl,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    AuthorId,
    ParentId,
    Body,
    CreatedAt,
    UpdatedAt,
}

#[derive(Clone, Copy, DeriveIden)]
enum PostLikes {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Clone, Copy, DeriveIden)]
enum Bookmarks {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Follows {
    Table,
    FollowerId,
    FolloweeId,
    CreatedAt,
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// `id`, `user_id`, `post_id`, `created_at`, one row per (user, post) pair.
fn user_post_table<T: IntoIden + Copy + 'static>(
    table: T,
    id: T,
    user_id: T,
    post_id: T,
    created_at: T,
    fk_name: &str,
) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).string().not_null().primary_key())
        .col(ColumnDef::new(user_id).string().not_null())
        .col(ColumnDef::new(post_id).string().not_null())
        .col(timestamp(created_at))
        .foreign_key(
            ForeignKey::create()
                .name(fk_name)
                .from(table, post_id)
                .to(Posts::Table, Posts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Posts::AuthorId).string().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Posts::RawMarkdown).text().not_null())
                    .col(ColumnDef::new(Posts::Summary).text().not_null())
                    .col(ColumnDef::new(Posts::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone().null())
                    .col(timestamp(Posts::CreatedAt))
                    .col(timestamp(Posts::UpdatedAt))
                    .col(ColumnDef::new(Posts::RawMarkdownAudioUrl).string().null())
                    .col(ColumnDef::new(Posts::SummaryAudioUrl).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_author_id")
                    .table(Posts::Table)
                    .col(Posts::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_published_at")
                    .table(Posts::Table)
                    .col(Posts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Comments::PostId).string().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).string().not_null())
                    .col(ColumnDef::new(Comments::ParentId).string().null())
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(timestamp(Comments::CreatedAt))
                    .col(timestamp(Comments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_post_id")
                            .from(Comments::Table, Comments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(user_post_table(
                PostLikes::Table,
                PostLikes::Id,
                PostLikes::UserId,
                PostLikes::PostId,
                PostLikes::CreatedAt,
                "fk_post_likes_post_id",
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_likes_user_post")
                    .table(PostLikes::Table)
                    .col(PostLikes::UserId)
                    .col(PostLikes::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(user_post_table(
                Bookmarks::Table,
                Bookmarks::Id,
                Bookmarks::UserId,
                Bookmarks::PostId,
                Bookmarks::CreatedAt,
                "fk_bookmarks_post_id",
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookmarks_user_post")
                    .table(Bookmarks::Table)
                    .col(Bookmarks::UserId)
                    .col(Bookmarks::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Follows::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Follows::FollowerId).string().not_null())
                    .col(ColumnDef::new(Follows::FolloweeId).string().not_null())
                    .col(timestamp(Follows::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(Follows::FollowerId)
                            .col(Follows::FolloweeId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Follows::Table.into_iden(),
            Bookmarks::Table.into_iden(),
            PostLikes::Table.into_iden(),
            Comments::Table.into_iden(),
            Posts::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
