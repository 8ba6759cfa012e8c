//! Dashboard post handlers. Every route here is owner-scoped: the id from
//! the access token is part of each lookup predicate, so posts belonging to
//! other accounts behave exactly like posts that do not exist.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use serif_core::DomainError;
use serif_core::domain::{Post, PostDraft, PostStatus, PostStatusKind, resolve_author};
use serif_core::error::RepoError;
use serif_shared::dto::{PostListQuery, PostPayload, PostResponse};
use serif_shared::slug::slugify;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Build a validated draft from the wire payload. The slug falls back to a
/// slugified title when omitted or blank.
fn draft_from_payload(payload: PostPayload, now: DateTime<Utc>) -> Result<PostDraft, DomainError> {
    let kind = match payload.status.as_deref() {
        Some(status) => PostStatusKind::from_str(status)?,
        None => PostStatusKind::Draft,
    };
    let status = PostStatus::from_parts(kind, payload.scheduled_at, now)?;

    let slug = match payload.slug {
        Some(slug) if !slug.trim().is_empty() => slug,
        _ => slugify(&payload.title),
    };

    let draft = PostDraft {
        title: payload.title,
        slug,
        summary: payload.summary,
        body: payload.body,
        image: payload.image,
        read_time: payload.read_time,
        status,
    };
    draft.validate()?;
    Ok(draft)
}

/// Mutations report an ownership miss as zero affected rows. Fold that into
/// the domain's conflated not-found before it turns into a response.
fn owned_post_err(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound => DomainError::OwnedLookupFailed.into(),
        other => other.into(),
    }
}

/// Display name snapshot stored on the post at write time.
async fn author_snapshot(state: &AppState, identity: &Identity) -> AppResult<String> {
    let profile = state.profiles.find_by_id(identity.user_id).await?;
    let first_name = profile.as_ref().and_then(|p| p.first_name.as_deref());
    Ok(resolve_author(first_name, &identity.email))
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        summary: post.summary,
        body: post.body,
        image: post.image,
        author: post.author,
        read_time: post.read_time,
        status: post.status.kind().to_string(),
        scheduled_at: post.status.scheduled_at(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// POST /api/posts - Protected route
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let draft = draft_from_payload(body.into_inner(), Utc::now())?;
    let author = author_snapshot(&state, &identity).await?;

    let post = Post::new(identity.user_id, draft, Some(author));
    let saved = state.posts.insert(post).await?;

    tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post created");

    Ok(HttpResponse::Created().json(post_response(saved)))
}

/// GET /api/posts - Protected route
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let status = match query.status.as_deref() {
        Some(status) => Some(PostStatusKind::from_str(status).map_err(AppError::from)?),
        None => None,
    };

    let posts = state.posts.list_owned(identity.user_id, status).await?;
    let response: Vec<PostResponse> = posts.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/posts/{id} - Protected route
pub async fn get_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_owned(path.into_inner(), identity.user_id)
        .await?
        .ok_or(DomainError::OwnedLookupFailed)?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PUT /api/posts/{id} - Protected route
///
/// Whole-record rewrite; the payload carries the full field contract.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let draft = draft_from_payload(body.into_inner(), Utc::now())?;
    let author = author_snapshot(&state, &identity).await?;

    let updated = state
        .posts
        .update_owned(path.into_inner(), identity.user_id, draft, Some(author))
        .await
        .map_err(owned_post_err)?;

    tracing::info!(post_id = %updated.id, "Post updated");

    Ok(HttpResponse::Ok().json(post_response(updated)))
}

/// DELETE /api/posts/{id} - Protected route
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state
        .posts
        .delete_owned(id, identity.user_id)
        .await
        .map_err(owned_post_err)?;

    tracing::info!(post_id = %id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload() -> PostPayload {
        PostPayload {
            title: "My First Post".to_string(),
            slug: None,
            summary: None,
            body: Some("<p>hello</p>".to_string()),
            image: None,
            read_time: Some(3),
            status: None,
            scheduled_at: None,
        }
    }

    #[test]
    fn slug_falls_back_to_the_title() {
        let draft = draft_from_payload(payload(), Utc::now()).unwrap();
        assert_eq!(draft.slug, "my-first-post");
        assert_eq!(draft.status, PostStatus::Draft);
    }

    #[test]
    fn blank_slug_counts_as_omitted() {
        let mut p = payload();
        p.slug = Some("   ".to_string());
        let draft = draft_from_payload(p, Utc::now()).unwrap();
        assert_eq!(draft.slug, "my-first-post");
    }

    #[test]
    fn explicit_slug_wins() {
        let mut p = payload();
        p.slug = Some("custom-slug".to_string());
        let draft = draft_from_payload(p, Utc::now()).unwrap();
        assert_eq!(draft.slug, "custom-slug");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut p = payload();
        p.status = Some("archived".to_string());
        assert!(draft_from_payload(p, Utc::now()).is_err());
    }

    #[test]
    fn scheduling_requires_a_future_time() {
        let now = Utc::now();
        let mut p = payload();
        p.status = Some("scheduled".to_string());
        p.scheduled_at = Some(now - Duration::minutes(5));
        assert!(draft_from_payload(p.clone(), now).is_err());

        p.scheduled_at = Some(now + Duration::hours(1));
        let draft = draft_from_payload(p, now).unwrap();
        assert_eq!(draft.status.kind(), PostStatusKind::Scheduled);
    }

    #[test]
    fn ownership_misses_conflate_to_not_found() {
        let err = owned_post_err(RepoError::NotFound);
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Post not found"));
    }
}
