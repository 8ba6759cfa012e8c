//! In-memory repositories - used when no database is configured and in tests.
//!
//! These enforce the same contracts as the PostgreSQL repositories: unique
//! slugs and emails, compound owner predicates, published-only public reads.
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use serif_core::domain::{Post, PostDraft, PostStatus, PostStatusKind, Profile, PublicPost, User};
use serif_core::error::RepoError;
use serif_core::ports::{PostRepository, ProfileRepository, UserRepository};

use super::postgres_repo::DUPLICATE_SLUG;

/// In-memory user repository.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint(
                "An account with this email already exists".to_owned(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_confirmation_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.confirmation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_recovery_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.recovery_token.as_deref() == Some(token))
            .cloned())
    }

    async fn mark_email_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.email_verified_at = Some(at);
        user.confirmation_token = None;
        user.confirmation_sent_at = None;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_recovery_token(
        &self,
        id: Uuid,
        token: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.recovery_token = Some(token.to_owned());
        user.recovery_sent_at = Some(sent_at);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash.to_owned();
        user.recovery_token = None;
        user.recovery_sent_at = None;
        user.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory profile repository.
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<Uuid, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut profiles = self.profiles.write().await;
        if let Some(existing) = profiles.get_mut(&profile.id) {
            existing.first_name = profile.first_name;
            existing.avatar_url = profile.avatar_url;
            existing.updated_at = profile.updated_at;
            return Ok(existing.clone());
        }
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }
}

/// In-memory post repository.
///
/// Holds the profile repository so public reads can join author display
/// fields, the same shape the SQL view produces.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
    profiles: Arc<InMemoryProfileRepository>,
}

impl InMemoryPostRepository {
    pub fn new(profiles: Arc<InMemoryProfileRepository>) -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            profiles,
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint(DUPLICATE_SLUG.to_owned()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        draft: PostDraft,
        author: Option<String>,
    ) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        // Ownership predicate first: a non-owner learns nothing, not even
        // that the slug is taken.
        if !posts.get(&id).is_some_and(|p| p.user_id == owner) {
            return Err(RepoError::NotFound);
        }
        if posts.values().any(|p| p.id != id && p.slug == draft.slug) {
            return Err(RepoError::Constraint(DUPLICATE_SLUG.to_owned()));
        }

        if let Some(post) = posts.get_mut(&id) {
            post.apply(draft, author);
            return Ok(post.clone());
        }
        Err(RepoError::NotFound)
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        if !posts.get(&id).is_some_and(|p| p.user_id == owner) {
            return Err(RepoError::NotFound);
        }
        posts.remove(&id);
        Ok(())
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.get(&id).filter(|p| p.user_id == owner).cloned())
    }

    async fn list_owned(
        &self,
        owner: Uuid,
        status: Option<PostStatusKind>,
    ) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut result: Vec<Post> = posts
            .values()
            .filter(|p| p.user_id == owner)
            .filter(|p| status.is_none_or(|kind| p.status.kind() == kind))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PublicPost>, RepoError> {
        let post = {
            let posts = self.posts.read().await;
            posts
                .values()
                .find(|p| p.slug == slug && p.status.is_published())
                .cloned()
        };

        let Some(post) = post else {
            return Ok(None);
        };

        let author = self.profiles.find_by_id(post.user_id).await?;
        Ok(Some(PublicPost::from_parts(post, author.as_ref())))
    }

    async fn list_published(&self) -> Result<Vec<PublicPost>, RepoError> {
        let published = {
            let posts = self.posts.read().await;
            let mut published: Vec<Post> = posts
                .values()
                .filter(|p| p.status.is_published())
                .cloned()
                .collect();
            published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            published
        };

        let mut result = Vec::with_capacity(published.len());
        for post in published {
            let author = self.profiles.find_by_id(post.user_id).await?;
            result.push(PublicPost::from_parts(post, author.as_ref()));
        }
        Ok(result)
    }

    async fn publish_due(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut posts = self.posts.write().await;
        let mut published = 0;
        for post in posts.values_mut() {
            if let PostStatus::Scheduled { publish_at } = post.status {
                if publish_at <= now {
                    post.status = PostStatus::Published;
                    post.updated_at = now;
                    published += 1;
                }
            }
        }
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(title: &str, slug: &str, status: PostStatus) -> PostDraft {
        PostDraft {
            title: title.to_owned(),
            slug: slug.to_owned(),
            summary: None,
            body: Some("<p>body</p>".to_owned()),
            image: None,
            read_time: Some(4),
            status,
        }
    }

    fn post_repo() -> (Arc<InMemoryProfileRepository>, InMemoryPostRepository) {
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let posts = InMemoryPostRepository::new(Arc::clone(&profiles));
        (profiles, posts)
    }

    #[tokio::test]
    async fn non_owner_mutations_match_zero_rows() {
        let (_, repo) = post_repo();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let post = repo
            .insert(Post::new(owner, draft("Mine", "mine", PostStatus::Draft), None))
            .await
            .unwrap();

        let update = repo
            .update_owned(
                post.id,
                stranger,
                draft("Stolen", "stolen", PostStatus::Draft),
                None,
            )
            .await;
        assert!(matches!(update, Err(RepoError::NotFound)));

        let delete = repo.delete_owned(post.id, stranger).await;
        assert!(matches!(delete, Err(RepoError::NotFound)));

        // The owner still sees the original.
        let found = repo.find_owned(post.id, owner).await.unwrap().unwrap();
        assert_eq!(found.title, "Mine");
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_constraint_violation() {
        let (_, repo) = post_repo();
        let owner = Uuid::new_v4();

        repo.insert(Post::new(owner, draft("First", "hello-world", PostStatus::Draft), None))
            .await
            .unwrap();

        let second = repo
            .insert(Post::new(owner, draft("Second", "hello-world", PostStatus::Draft), None))
            .await;
        assert!(matches!(second, Err(RepoError::Constraint(_))));

        // The first post is unaffected.
        let listed = repo.list_owned(owner, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "First");
    }

    #[tokio::test]
    async fn update_cannot_take_anothers_slug() {
        let (_, repo) = post_repo();
        let owner = Uuid::new_v4();

        repo.insert(Post::new(owner, draft("First", "taken", PostStatus::Draft), None))
            .await
            .unwrap();
        let second = repo
            .insert(Post::new(owner, draft("Second", "free", PostStatus::Draft), None))
            .await
            .unwrap();

        let result = repo
            .update_owned(second.id, owner, draft("Second", "taken", PostStatus::Draft), None)
            .await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn resaving_a_draft_keeps_scheduled_at_null() {
        let (_, repo) = post_repo();
        let owner = Uuid::new_v4();

        let post = repo
            .insert(Post::new(owner, draft("Draft", "draft", PostStatus::Draft), None))
            .await
            .unwrap();

        for _ in 0..2 {
            let saved = repo
                .update_owned(post.id, owner, draft("Draft", "draft", PostStatus::Draft), None)
                .await
                .unwrap();
            assert_eq!(saved.status, PostStatus::Draft);
            assert_eq!(saved.status.scheduled_at(), None);
        }
    }

    #[tokio::test]
    async fn public_view_shows_only_published_posts() {
        let (profiles, repo) = post_repo();
        let owner = Uuid::new_v4();

        let mut profile = Profile::new(owner);
        profile.first_name = Some("Ada".to_owned());
        profiles.upsert(profile).await.unwrap();

        repo.insert(Post::new(
            owner,
            draft("Hidden", "hidden", PostStatus::Draft),
            Some("Ada".to_owned()),
        ))
        .await
        .unwrap();
        repo.insert(Post::new(
            owner,
            draft("Visible", "visible", PostStatus::Published),
            Some("Ada".to_owned()),
        ))
        .await
        .unwrap();

        assert!(repo.find_published_by_slug("hidden").await.unwrap().is_none());

        let public = repo
            .find_published_by_slug("visible")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(public.title, "Visible");
        assert_eq!(public.author_first_name.as_deref(), Some("Ada"));

        let listed = repo.list_published().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].slug, "visible");
    }

    #[tokio::test]
    async fn list_owned_filters_by_status_and_orders_newest_first() {
        let (_, repo) = post_repo();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let mut oldest = Post::new(owner, draft("Oldest", "oldest", PostStatus::Draft), None);
        oldest.created_at = now - Duration::hours(2);
        let mut middle = Post::new(
            owner,
            draft("Middle", "middle", PostStatus::Published),
            None,
        );
        middle.created_at = now - Duration::hours(1);
        let mut newest = Post::new(
            owner,
            draft(
                "Newest",
                "newest",
                PostStatus::Scheduled {
                    publish_at: now + Duration::hours(3),
                },
            ),
            None,
        );
        newest.created_at = now;

        for post in [oldest, middle, newest] {
            repo.insert(post).await.unwrap();
        }

        let all = repo.list_owned(owner, None).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Newest", "Middle", "Oldest"]);

        let scheduled = repo
            .list_owned(owner, Some(PostStatusKind::Scheduled))
            .await
            .unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].title, "Newest");
    }

    #[tokio::test]
    async fn publish_due_flips_only_elapsed_schedules() {
        let (_, repo) = post_repo();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let due = Post::new(
            owner,
            draft(
                "Due",
                "due",
                PostStatus::Scheduled {
                    publish_at: now + Duration::minutes(5),
                },
            ),
            None,
        );
        let later = Post::new(
            owner,
            draft(
                "Later",
                "later",
                PostStatus::Scheduled {
                    publish_at: now + Duration::hours(6),
                },
            ),
            None,
        );
        let due_id = repo.insert(due).await.unwrap().id;
        let later_id = repo.insert(later).await.unwrap().id;

        let flipped = repo.publish_due(now + Duration::hours(1)).await.unwrap();
        assert_eq!(flipped, 1);

        let due = repo.find_owned(due_id, owner).await.unwrap().unwrap();
        assert_eq!(due.status, PostStatus::Published);
        assert_eq!(due.status.scheduled_at(), None);

        let later = repo.find_owned(later_id, owner).await.unwrap().unwrap();
        assert_eq!(later.status.kind(), PostStatusKind::Scheduled);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        repo.insert(User::new(
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            None,
            "t1".to_owned(),
        ))
        .await
        .unwrap();

        let result = repo
            .insert(User::new(
                "ada@example.com".to_owned(),
                "hash".to_owned(),
                None,
                "t2".to_owned(),
            ))
            .await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn verification_consumes_the_confirmation_token() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .insert(User::new(
                "ada@example.com".to_owned(),
                "hash".to_owned(),
                Some("Ada".to_owned()),
                "confirm-me".to_owned(),
            ))
            .await
            .unwrap();

        let found = repo
            .find_by_confirmation_token("confirm-me")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);

        repo.mark_email_verified(user.id, Utc::now()).await.unwrap();

        assert!(
            repo.find_by_confirmation_token("confirm-me")
                .await
                .unwrap()
                .is_none()
        );
        let verified = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(verified.is_verified());
    }

    #[tokio::test]
    async fn password_update_consumes_the_recovery_token() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .insert(User::new(
                "ada@example.com".to_owned(),
                "old-hash".to_owned(),
                None,
                "confirm".to_owned(),
            ))
            .await
            .unwrap();

        repo.set_recovery_token(user.id, "reset-me", Utc::now())
            .await
            .unwrap();
        assert!(
            repo.find_by_recovery_token("reset-me")
                .await
                .unwrap()
                .is_some()
        );

        repo.update_password(user.id, "new-hash").await.unwrap();

        assert!(
            repo.find_by_recovery_token("reset-me")
                .await
                .unwrap()
                .is_none()
        );
        let updated = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.password_hash, "new-hash");
    }
}
