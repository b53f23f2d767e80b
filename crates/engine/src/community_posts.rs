//! The module contains the community board posts.

use api_types::community::PostCategory;
use sea_orm::entity::prelude::*;

use crate::{ResultEngine, cities::string_list};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "community_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub destination: Option<String>,
    /// Lowercase, deduplicated.
    pub tags: Json,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub view_count: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::post_likes::Entity")]
    Likes,
    #[sea_orm(has_many = "super::post_comments::Entity")]
    Comments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::post_likes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::post_comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn category(&self) -> ResultEngine<PostCategory> {
        PostCategory::try_from(self.category.as_str()).map_err(Into::into)
    }

    pub fn tags(&self) -> Vec<String> {
        string_list(&self.tags)
    }
}
