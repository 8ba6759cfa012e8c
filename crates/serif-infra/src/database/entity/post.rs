//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use serif_core::domain::{Post, PostStatus, PostStatusKind};
use serif_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<i32>,
    pub status: String,
    pub scheduled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
///
/// Fallible: a row claiming `scheduled` without a timestamp, or carrying an
/// unknown status string, is corrupt and must not masquerade as a valid post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind: PostStatusKind = model
            .status
            .parse()
            .map_err(|_| RepoError::Query(format!("post {}: unknown status", model.id)))?;

        let status = match kind {
            PostStatusKind::Draft => PostStatus::Draft,
            PostStatusKind::Published => PostStatus::Published,
            PostStatusKind::Scheduled => {
                let publish_at = model.scheduled_at.ok_or_else(|| {
                    RepoError::Query(format!(
                        "post {}: scheduled without a publish time",
                        model.id
                    ))
                })?;
                PostStatus::Scheduled {
                    publish_at: publish_at.into(),
                }
            }
        };

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            slug: model.slug,
            summary: model.summary,
            body: model.body,
            image: model.image,
            author: model.author,
            read_time: model.read_time,
            status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            user_id: Set(post.user_id),
            title: Set(post.title),
            slug: Set(post.slug),
            summary: Set(post.summary),
            body: Set(post.body),
            image: Set(post.image),
            author: Set(post.author),
            read_time: Set(post.read_time),
            status: Set(post.status.kind().as_str().to_owned()),
            scheduled_at: Set(post.status.scheduled_at().map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
