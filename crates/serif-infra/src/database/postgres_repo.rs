//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use serif_core::domain::{Post, PostDraft, PostStatusKind, Profile, PublicPost, User};
use serif_core::error::RepoError;
use serif_core::ports::{PostRepository, ProfileRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::user::{self, Entity as UserEntity};

fn query_err(e: sea_orm::DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Map database errors, turning unique violations into a constraint error
/// with a caller-facing message.
fn unique_err(e: sea_orm::DbErr, message: &str) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(message.to_owned())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let active = user::ActiveModel::from(user.clone());
        UserEntity::insert(active)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| unique_err(e, "An account with this email already exists"))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_confirmation_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::ConfirmationToken.eq(token))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_recovery_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::RecoveryToken.eq(token))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn mark_email_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::EmailVerifiedAt, Expr::value(Some(at)))
            .col_expr(
                user::Column::ConfirmationToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                user::Column::ConfirmationSentAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn set_recovery_token(
        &self,
        id: Uuid,
        token: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::RecoveryToken, Expr::value(Some(token)))
            .col_expr(user::Column::RecoverySentAt, Expr::value(Some(sent_at)))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                user::Column::RecoveryToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                user::Column::RecoverySentAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// PostgreSQL profile repository.
pub struct PostgresProfileRepository {
    db: DbConn,
}

impl PostgresProfileRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        let result = ProfileEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, RepoError> {
        let id = profile.id;
        let active = profile::ActiveModel::from(profile);

        ProfileEntity::insert(active)
            .on_conflict(
                OnConflict::column(profile::Column::Id)
                    .update_columns([
                        profile::Column::FirstName,
                        profile::Column::AvatarUrl,
                        profile::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;

        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }
}

/// PostgreSQL post repository.
///
/// Owner-scoped mutations filter on `id AND user_id` in one statement; the
/// caller cannot tell a missing post from someone else's.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

pub(crate) const DUPLICATE_SLUG: &str = "A post with this slug already exists";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let active = post::ActiveModel::from(post.clone());
        PostEntity::insert(active)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| unique_err(e, DUPLICATE_SLUG))?;

        Ok(post)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        draft: PostDraft,
        author: Option<String>,
    ) -> Result<Post, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(draft.title))
            .col_expr(post::Column::Slug, Expr::value(draft.slug))
            .col_expr(post::Column::Summary, Expr::value(draft.summary))
            .col_expr(post::Column::Body, Expr::value(draft.body))
            .col_expr(post::Column::Image, Expr::value(draft.image))
            .col_expr(post::Column::Author, Expr::value(author))
            .col_expr(post::Column::ReadTime, Expr::value(draft.read_time))
            .col_expr(
                post::Column::Status,
                Expr::value(draft.status.kind().as_str()),
            )
            .col_expr(
                post::Column::ScheduledAt,
                Expr::value(draft.status.scheduled_at()),
            )
            .col_expr(post::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner))
            .exec(&self.db)
            .await
            .map_err(|e| unique_err(e, DUPLICATE_SLUG))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_owned(id, owner).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        result.map(Post::try_from).transpose()
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        status: Option<PostStatusKind>,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::UserId.eq(owner));
        if let Some(kind) = status {
            query = query.filter(post::Column::Status.eq(kind.as_str()));
        }

        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PublicPost>, RepoError> {
        let row = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Status.eq(PostStatusKind::Published.as_str()))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let post = Post::try_from(row)?;
        let author = ProfileEntity::find_by_id(post.user_id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Profile::from);

        Ok(Some(PublicPost::from_parts(post, author.as_ref())))
    }

    async fn list_published(&self) -> Result<Vec<PublicPost>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::Status.eq(PostStatusKind::Published.as_str()))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let posts = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let profiles: HashMap<Uuid, Profile> = ProfileEntity::find()
            .filter(profile::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(query_err)?
            .into_iter()
            .map(|m| (m.id, Profile::from(m)))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = profiles.get(&post.user_id);
                PublicPost::from_parts(post, author)
            })
            .collect())
    }

    async fn publish_due(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Status,
                Expr::value(PostStatusKind::Published.as_str()),
            )
            .col_expr(
                post::Column::ScheduledAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(post::Column::UpdatedAt, Expr::value(now))
            .filter(post::Column::Status.eq(PostStatusKind::Scheduled.as_str()))
            .filter(post::Column::ScheduledAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }
}
