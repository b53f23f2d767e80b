use std::collections::HashMap;

use api_types::community::{
    CommentAdded, CommentNew, CommentView, LikeToggle, PageQuery, Pagination, PostAuthor,
    PostCategory, PostLike, PostListQuery, PostNew, PostPage, PostUpdate, PostView,
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, TransactionTrait, prelude::*,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, community_posts, post_comments, post_likes, users,
    util::parse_uuid,
};

use super::{Engine, normalize_optional_text, normalize_required_name, set_if, with_tx};

const TITLE_MAX: usize = 200;
const CONTENT_MAX: usize = 5000;
const DESTINATION_MAX: usize = 100;
const COMMENT_MAX: usize = 1000;
const PAGE_SIZE: u64 = 10;
const PAGE_SIZE_MAX: u64 = 100;

fn post_not_found() -> EngineError {
    EngineError::KeyNotFound("post not exists".to_string())
}

fn check_len(field: &str, value: &str, max: usize) -> ResultEngine<()> {
    if value.chars().count() > max {
        return Err(EngineError::invalid(
            field,
            format!("must be {max} characters or less"),
        ));
    }
    Ok(())
}

fn required_text(field: &str, value: &str, max: usize) -> ResultEngine<String> {
    let text = normalize_required_name(value, field)?;
    check_len(field, &text, max)?;
    Ok(text)
}

fn destination(value: Option<&str>) -> ResultEngine<Option<String>> {
    let value = normalize_optional_text(value);
    if let Some(text) = &value {
        check_len("destination", text, DESTINATION_MAX)?;
    }
    Ok(value)
}

/// Lowercased, trimmed, without blanks or repeats, in submission order.
fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn tag_json(tags: Vec<String>) -> Json {
    Json::Array(tags.into_iter().map(Json::String).collect())
}

/// Case-insensitive `LIKE` over the text form of `column`.
fn text_like<C: ColumnTrait>(column: C, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column).cast_as(Alias::new("TEXT")))).like(pattern)
}

fn category_filter(value: Option<&str>) -> ResultEngine<Option<PostCategory>> {
    match value.map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(other) => Ok(Some(PostCategory::try_from(other)?)),
    }
}

/// One-based page and page size.
fn page_bounds(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    let limit = limit
        .filter(|l| *l > 0)
        .unwrap_or(PAGE_SIZE)
        .min(PAGE_SIZE_MAX);
    (page, limit)
}

fn post_author(user: &users::Model) -> ResultEngine<PostAuthor> {
    Ok(PostAuthor {
        id: parse_uuid(&user.id, "user")?,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    })
}

fn like_view(like: &post_likes::Model, user: Option<&users::Model>) -> ResultEngine<PostLike> {
    Ok(PostLike {
        user_id: parse_uuid(&like.user_id, "user")?,
        user_name: user.map(users::Model::full_name).unwrap_or_default(),
    })
}

fn comment_view(
    comment: &post_comments::Model,
    author: Option<&users::Model>,
) -> ResultEngine<CommentView> {
    let author = author.ok_or_else(|| {
        EngineError::MissingRelation(format!("author of comment {}", comment.id))
    })?;
    Ok(CommentView {
        id: parse_uuid(&comment.id, "comment")?,
        author: post_author(author)?,
        content: comment.content.clone(),
        created_at: comment.created_at,
    })
}

impl Engine {
    async fn post_likes(
        &self,
        db: &DatabaseTransaction,
        post_ids: Vec<String>,
    ) -> ResultEngine<HashMap<String, Vec<PostLike>>> {
        let mut grouped: HashMap<String, Vec<PostLike>> = HashMap::new();
        for (like, user) in post_likes::Entity::find()
            .filter(post_likes::Column::PostId.is_in(post_ids))
            .find_also_related(users::Entity)
            .order_by_asc(post_likes::Column::CreatedAt)
            .all(db)
            .await?
        {
            let view = like_view(&like, user.as_ref())?;
            grouped.entry(like.post_id).or_default().push(view);
        }
        Ok(grouped)
    }

    async fn post_comments(
        &self,
        db: &DatabaseTransaction,
        post_ids: Vec<String>,
    ) -> ResultEngine<HashMap<String, Vec<CommentView>>> {
        let mut grouped: HashMap<String, Vec<CommentView>> = HashMap::new();
        for (comment, author) in post_comments::Entity::find()
            .filter(post_comments::Column::PostId.is_in(post_ids))
            .find_also_related(users::Entity)
            .order_by_asc(post_comments::Column::CreatedAt)
            .all(db)
            .await?
        {
            let view = comment_view(&comment, author.as_ref())?;
            grouped.entry(comment.post_id).or_default().push(view);
        }
        Ok(grouped)
    }

    async fn post_views(
        &self,
        db: &DatabaseTransaction,
        posts: Vec<community_posts::Model>,
    ) -> ResultEngine<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let authors = posts.load_one(users::Entity, db).await?;
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let mut likes = self.post_likes(db, ids.clone()).await?;
        let mut comments = self.post_comments(db, ids).await?;

        posts
            .iter()
            .zip(authors)
            .map(|(post, author)| {
                let author = author.ok_or_else(|| {
                    EngineError::MissingRelation(format!("author of post {}", post.id))
                })?;
                let likes = likes.remove(&post.id).unwrap_or_default();
                let comments = comments.remove(&post.id).unwrap_or_default();
                Ok(PostView {
                    id: parse_uuid(&post.id, "post")?,
                    author: post_author(&author)?,
                    title: post.title.clone(),
                    content: post.content.clone(),
                    category: post.category()?,
                    destination: post.destination.clone(),
                    tags: post.tags(),
                    image_url: post.image_url.clone(),
                    like_count: likes.len() as u64,
                    comment_count: comments.len() as u64,
                    likes,
                    comments,
                    view_count: post.view_count,
                    created_at: post.created_at,
                    updated_at: post.updated_at,
                })
            })
            .collect()
    }

    async fn post_view(
        &self,
        db: &DatabaseTransaction,
        post: community_posts::Model,
    ) -> ResultEngine<PostView> {
        self.post_views(db, vec![post])
            .await?
            .pop()
            .ok_or_else(post_not_found)
    }

    async fn post_page(
        &self,
        db: &DatabaseTransaction,
        select: Select<community_posts::Entity>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ResultEngine<PostPage> {
        let (page, limit) = page_bounds(page, limit);
        let paginator = select
            .order_by_desc(community_posts::Column::CreatedAt)
            .order_by_desc(community_posts::Column::Id)
            .paginate(db, limit);
        let totals = paginator.num_items_and_pages().await?;
        let posts = paginator.fetch_page(page - 1).await?;
        Ok(PostPage {
            posts: self.post_views(db, posts).await?,
            pagination: Pagination {
                current_page: page,
                total_pages: totals.number_of_pages,
                total_posts: totals.number_of_items,
                has_next_page: page < totals.number_of_pages,
                has_prev_page: page > 1,
            },
        })
    }

    /// A published post, or `KeyNotFound`.
    async fn published_post(
        &self,
        db: &DatabaseTransaction,
        post_id: Uuid,
    ) -> ResultEngine<community_posts::Model> {
        community_posts::Entity::find_by_id(post_id.to_string())
            .one(db)
            .await?
            .filter(|post| post.is_published)
            .ok_or_else(post_not_found)
    }

    /// The post, provided `user_id` wrote it.
    async fn authored_post(
        &self,
        db: &DatabaseTransaction,
        post_id: Uuid,
        user_id: &str,
        action: &str,
    ) -> ResultEngine<community_posts::Model> {
        let post = community_posts::Entity::find_by_id(post_id.to_string())
            .one(db)
            .await?
            .ok_or_else(post_not_found)?;
        if post.author_id != user_id {
            return Err(EngineError::Forbidden(format!(
                "you can only {action} your own posts"
            )));
        }
        Ok(post)
    }

    /// Published posts, newest first, filtered and paginated.
    pub async fn list_posts(&self, query: PostListQuery) -> ResultEngine<PostPage> {
        let category = category_filter(query.category.as_deref())?;
        with_tx!(self, |db_tx| {
            let mut select = community_posts::Entity::find()
                .filter(community_posts::Column::IsPublished.eq(true));
            if let Some(category) = category {
                select = select.filter(community_posts::Column::Category.eq(category.as_str()));
            }
            if let Some(place) = normalize_optional_text(query.destination.as_deref()) {
                select = select.filter(text_like(
                    community_posts::Column::Destination,
                    format!("%{}%", place.to_lowercase()),
                ));
            }
            let tags = normalize_tags(query.tags.as_deref().unwrap_or_default().split(','));
            if !tags.is_empty() {
                let any_tag = tags.iter().fold(Condition::any(), |cond, tag| {
                    cond.add(text_like(
                        community_posts::Column::Tags,
                        format!("%\"{tag}\"%"),
                    ))
                });
                select = select.filter(any_tag);
            }
            if let Some(term) = normalize_optional_text(query.search.as_deref()) {
                let pattern = format!("%{}%", term.to_lowercase());
                select = select.filter(
                    Condition::any()
                        .add(text_like(community_posts::Column::Title, pattern.clone()))
                        .add(text_like(community_posts::Column::Content, pattern.clone()))
                        .add(text_like(community_posts::Column::Destination, pattern.clone()))
                        .add(text_like(community_posts::Column::Tags, pattern)),
                );
            }
            self.post_page(&db_tx, select, query.page, query.limit).await
        })
    }

    /// Every post written by `user_id`, published or not.
    pub async fn my_posts(&self, user_id: &str, query: PageQuery) -> ResultEngine<PostPage> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let select = community_posts::Entity::find()
                .filter(community_posts::Column::AuthorId.eq(user_id.to_string()));
            self.post_page(&db_tx, select, query.page, query.limit).await
        })
    }

    /// Return a published post and count one view.
    pub async fn post(&self, post_id: Uuid) -> ResultEngine<PostView> {
        with_tx!(self, |db_tx| {
            let post = self.published_post(&db_tx, post_id).await?;
            community_posts::Entity::update_many()
                .col_expr(
                    community_posts::Column::ViewCount,
                    Expr::col(community_posts::Column::ViewCount).add(1),
                )
                .filter(community_posts::Column::Id.eq(post.id.clone()))
                .exec(&db_tx)
                .await?;
            let mut view = self.post_view(&db_tx, post).await?;
            view.view_count += 1;
            Ok(view)
        })
    }

    /// Publish a post written by `user_id`.
    pub async fn new_post(&self, user_id: &str, new: PostNew) -> ResultEngine<PostView> {
        let title = required_text("title", &new.title, TITLE_MAX)?;
        let content = required_text("content", &new.content, CONTENT_MAX)?;
        let destination = destination(new.destination.as_deref())?;
        let now = Utc::now();
        let post = community_posts::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            author_id: ActiveValue::Set(user_id.to_string()),
            title: ActiveValue::Set(title),
            content: ActiveValue::Set(content),
            category: ActiveValue::Set(new.category.unwrap_or_default().as_str().to_string()),
            destination: ActiveValue::Set(destination),
            tags: ActiveValue::Set(tag_json(normalize_tags(&new.tags))),
            image_url: ActiveValue::Set(normalize_optional_text(new.image_url.as_deref())),
            is_published: ActiveValue::Set(true),
            view_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = post.insert(&db_tx).await?;
            self.post_view(&db_tx, model).await
        })
    }

    /// Partially update a post. Only its author may.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        user_id: &str,
        update: PostUpdate,
    ) -> ResultEngine<PostView> {
        let title = update
            .title
            .as_deref()
            .map(|v| required_text("title", v, TITLE_MAX))
            .transpose()?;
        let content = update
            .content
            .as_deref()
            .map(|v| required_text("content", v, CONTENT_MAX))
            .transpose()?;
        let place = update
            .destination
            .map(|v| destination(v.as_deref()))
            .transpose()?;
        let tags = update.tags.map(|t| tag_json(normalize_tags(&t)));

        with_tx!(self, |db_tx| {
            let post = self
                .authored_post(&db_tx, post_id, user_id, "update")
                .await?;
            let active = community_posts::ActiveModel {
                id: ActiveValue::Set(post.id),
                title: set_if(title),
                content: set_if(content),
                category: set_if(update.category.map(|c| c.as_str().to_string())),
                destination: set_if(place),
                tags: set_if(tags),
                image_url: set_if(
                    update
                        .image_url
                        .map(|v| normalize_optional_text(v.as_deref())),
                ),
                is_published: set_if(update.is_published),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            self.post_view(&db_tx, model).await
        })
    }

    /// Delete a post with its likes and comments. Only its author may.
    pub async fn delete_post(&self, post_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let post = self
                .authored_post(&db_tx, post_id, user_id, "delete")
                .await?;
            post_likes::Entity::delete_many()
                .filter(post_likes::Column::PostId.eq(post.id.clone()))
                .exec(&db_tx)
                .await?;
            post_comments::Entity::delete_many()
                .filter(post_comments::Column::PostId.eq(post.id.clone()))
                .exec(&db_tx)
                .await?;
            post.delete(&db_tx).await?;
            Ok(())
        })
    }

    /// Like the post, or take the like back when `user_id` already likes it.
    pub async fn toggle_like(
        &self,
        post_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<LikeToggle> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let post = self.published_post(&db_tx, post_id).await?;
            let existing = post
                .find_related(post_likes::Entity)
                .filter(post_likes::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?;
            let liked = match existing {
                Some(like) => {
                    like.delete(&db_tx).await?;
                    false
                }
                None => {
                    post_likes::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        post_id: ActiveValue::Set(post.id.clone()),
                        user_id: ActiveValue::Set(user_id.to_string()),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?;
                    true
                }
            };
            let likes = self
                .post_likes(&db_tx, vec![post.id.clone()])
                .await?
                .remove(&post.id)
                .unwrap_or_default();
            Ok(LikeToggle {
                liked,
                like_count: likes.len() as u64,
                likes,
            })
        })
    }

    /// Comment on a published post.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: &str,
        new: CommentNew,
    ) -> ResultEngine<CommentAdded> {
        let content = required_text("content", &new.content, COMMENT_MAX)?;
        with_tx!(self, |db_tx| {
            let author = self.require_user(&db_tx, user_id).await?;
            let post = self.published_post(&db_tx, post_id).await?;
            let comment = post_comments::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                post_id: ActiveValue::Set(post.id.clone()),
                author_id: ActiveValue::Set(author.id.clone()),
                content: ActiveValue::Set(content),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            let comment_count = post.find_related(post_comments::Entity).count(&db_tx).await?;
            Ok(CommentAdded {
                comment: comment_view(&comment, Some(&author))?,
                comment_count,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        assert_eq!(
            normalize_tags([" Food", "food ", "", "Rome", "  "]),
            ["food", "rome"]
        );
    }

    #[test]
    fn page_bounds_default_and_cap() {
        assert_eq!(page_bounds(None, None), (1, PAGE_SIZE));
        assert_eq!(page_bounds(Some(0), Some(0)), (1, PAGE_SIZE));
        assert_eq!(page_bounds(Some(3), Some(500)), (3, PAGE_SIZE_MAX));
    }

    #[test]
    fn category_all_means_no_filter() {
        assert_eq!(category_filter(Some("all")).unwrap(), None);
        assert_eq!(category_filter(None).unwrap(), None);
        assert_eq!(
            category_filter(Some(" tips ")).unwrap(),
            Some(PostCategory::Tips)
        );
        assert!(category_filter(Some("gossip")).is_err());
    }

    #[test]
    fn lengths_are_counted_in_characters() {
        assert!(check_len("title", &"é".repeat(TITLE_MAX), TITLE_MAX).is_ok());
        assert_eq!(
            check_len("title", &"a".repeat(TITLE_MAX + 1), TITLE_MAX),
            Err(EngineError::invalid("title", "must be 200 characters or less"))
        );
    }
}
