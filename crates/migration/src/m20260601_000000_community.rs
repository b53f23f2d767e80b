//! Community board: `community_posts` with their `post_likes` (one per user
//! and post) and `post_comments`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum CommunityPosts {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    Category,
    Destination,
    Tags,
    ImageUrl,
    IsPublished,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PostLikes {
    Table,
    Id,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum PostComments {
    Table,
    Id,
    PostId,
    AuthorId,
    Content,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommunityPosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommunityPosts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommunityPosts::AuthorId).string().not_null())
                    .col(ColumnDef::new(CommunityPosts::Title).string().not_null())
                    .col(ColumnDef::new(CommunityPosts::Content).text().not_null())
                    .col(
                        ColumnDef::new(CommunityPosts::Category)
                            .string()
                            .not_null()
                            .default("general"),
                    )
                    .col(ColumnDef::new(CommunityPosts::Destination).string())
                    .col(ColumnDef::new(CommunityPosts::Tags).json().not_null())
                    .col(ColumnDef::new(CommunityPosts::ImageUrl).string())
                    .col(
                        ColumnDef::new(CommunityPosts::IsPublished)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CommunityPosts::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CommunityPosts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CommunityPosts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-community_posts-author_id")
                            .from(CommunityPosts::Table, CommunityPosts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-community_posts-category-created_at")
                    .table(CommunityPosts::Table)
                    .col(CommunityPosts::Category)
                    .col(CommunityPosts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-community_posts-author_id-created_at")
                    .table(CommunityPosts::Table)
                    .col(CommunityPosts::AuthorId)
                    .col(CommunityPosts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostLikes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostLikes::PostId).string().not_null())
                    .col(ColumnDef::new(PostLikes::UserId).string().not_null())
                    .col(
                        ColumnDef::new(PostLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_likes-post_id")
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(CommunityPosts::Table, CommunityPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_likes-user_id")
                            .from(PostLikes::Table, PostLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-post_likes-post_id-user_id-unique")
                    .table(PostLikes::Table)
                    .col(PostLikes::PostId)
                    .col(PostLikes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostComments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostComments::PostId).string().not_null())
                    .col(ColumnDef::new(PostComments::AuthorId).string().not_null())
                    .col(ColumnDef::new(PostComments::Content).text().not_null())
                    .col(
                        ColumnDef::new(PostComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_comments-post_id")
                            .from(PostComments::Table, PostComments::PostId)
                            .to(CommunityPosts::Table, CommunityPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_comments-author_id")
                            .from(PostComments::Table, PostComments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-post_comments-post_id-created_at")
                    .table(PostComments::Table)
                    .col(PostComments::PostId)
                    .col(PostComments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommunityPosts::Table).to_owned())
            .await?;
        Ok(())
    }
}
