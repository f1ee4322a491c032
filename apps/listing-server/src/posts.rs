//! The `posts` resource: sea-orm entity, list field mapping and demo seed.

use chrono::{DateTime, Duration, TimeZone, Utc};
use listkit::{FieldAccess, FieldValue, Listable};
use listkit_db::{FieldKind, FieldMap};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "posts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Listable for Model {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl FieldAccess for Model {
    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name.to_ascii_lowercase().as_str() {
            "id" => FieldValue::I64(self.id),
            "title" => FieldValue::Text(self.title.clone()),
            "content" => FieldValue::Text(self.content.clone()),
            "authorid" => FieldValue::I64(self.author_id),
            "likecount" => FieldValue::I64(self.like_count),
            "commentcount" => FieldValue::I64(self.comment_count),
            _ => return None,
        };
        Some(value)
    }
}

/// API field names accepted in `where__`/`order__` keys.
pub fn field_map() -> FieldMap<Entity> {
    FieldMap::new()
        .insert("id", Column::Id, FieldKind::I64)
        .insert("title", Column::Title, FieldKind::String)
        .insert("content", Column::Content, FieldKind::String)
        .insert("authorId", Column::AuthorId, FieldKind::I64)
        .insert("likeCount", Column::LikeCount, FieldKind::I64)
        .insert("commentCount", Column::CommentCount, FieldKind::I64)
        .insert("createdAt", Column::CreatedAt, FieldKind::DateTimeUtc)
}

fn seed_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `n` generated posts with ids `1..=n`, one minute apart.
pub fn seed(n: i64) -> Vec<Model> {
    let start = seed_epoch();
    (1..=n)
        .map(|id| Model {
            id,
            title: format!("Generated post {id}"),
            content: format!("Generated content {id}"),
            author_id: 1,
            like_count: 0,
            comment_count: 0,
            created_at: start + Duration::minutes(id),
        })
        .collect()
}

/// Insert [`seed`] rows into an empty `posts` table.
pub async fn seed_table<C: ConnectionTrait>(db: &C, n: i64) -> Result<u64, DbErr> {
    let existing = Entity::find().count(db).await?;
    if existing > 0 || n <= 0 {
        return Ok(0);
    }
    let rows = seed(n).into_iter().map(|post| ActiveModel {
        id: Set(post.id),
        title: Set(post.title),
        content: Set(post.content),
        author_id: Set(post.author_id),
        like_count: Set(post.like_count),
        comment_count: Set(post.comment_count),
        created_at: Set(post.created_at),
    });
    Entity::insert_many(rows).exec(db).await?;
    Ok(n.unsigned_abs())
}
