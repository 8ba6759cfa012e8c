#[cfg(test)]
mod tests {
    use crate::database::entity::{post, profile};
    use crate::database::postgres_repo::{
        PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository,
    };
    use chrono::{DateTime, Duration, Utc};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use serif_core::domain::{Post, PostDraft, PostStatus, PostStatusKind, Profile, User};
    use serif_core::error::RepoError;
    use serif_core::ports::{PostRepository, ProfileRepository, UserRepository};
    use uuid::Uuid;

    fn post_row(
        id: Uuid,
        user_id: Uuid,
        status: &str,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> post::Model {
        let now = Utc::now();
        post::Model {
            id,
            user_id,
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            summary: Some("A short summary".to_owned()),
            body: Some("<p>Content</p>".to_owned()),
            image: None,
            author: Some("Ada".to_owned()),
            read_time: Some(4),
            status: status.to_owned(),
            scheduled_at: scheduled_at.map(Into::into),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn profile_row(
        id: Uuid,
        first_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> profile::Model {
        let now = Utc::now();
        profile::Model {
            id,
            first_name: first_name.map(str::to_owned),
            avatar_url: avatar_url.map(str::to_owned),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn sample_draft() -> PostDraft {
        PostDraft {
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            summary: None,
            body: Some("<p>Content</p>".to_owned()),
            image: None,
            read_time: Some(4),
            status: PostStatus::Draft,
        }
    }

    #[tokio::test]
    async fn find_owned_maps_the_stored_row() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let publish_at = Utc::now() + Duration::hours(2);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(
                post_id,
                user_id,
                "scheduled",
                Some(publish_at),
            )]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo.find_owned(post_id, user_id).await.unwrap().unwrap();

        assert_eq!(post.id, post_id);
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.status.kind(), PostStatusKind::Scheduled);
        assert_eq!(post.status.scheduled_at(), Some(publish_at));
    }

    #[tokio::test]
    async fn unknown_status_is_a_query_error() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(post_id, user_id, "archived", None)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo.find_owned(post_id, user_id).await;

        assert!(matches!(result, Err(RepoError::Query(_))));
    }

    #[tokio::test]
    async fn scheduled_row_without_publish_time_is_a_query_error() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(post_id, user_id, "scheduled", None)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo.find_owned(post_id, user_id).await;

        assert!(matches!(result, Err(RepoError::Query(_))));
    }

    #[tokio::test]
    async fn update_owned_misses_posts_of_other_users() {
        // The owner predicate matched no row.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo
            .update_owned(Uuid::new_v4(), Uuid::new_v4(), sample_draft(), None)
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn update_owned_returns_the_stored_row() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        // One row updated, then the re-fetch.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![post_row(post_id, user_id, "published", None)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = repo
            .update_owned(post_id, user_id, sample_draft(), Some("Ada".to_owned()))
            .await
            .unwrap();

        assert_eq!(post.id, post_id);
        assert!(post.status.is_published());
    }

    #[tokio::test]
    async fn delete_owned_misses_posts_of_other_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo.delete_owned(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn insert_maps_unique_violations_to_constraint() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom(
                "duplicate key value violates unique constraint \"posts_slug_key\"".to_owned(),
            )])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let post = Post::new(Uuid::new_v4(), sample_draft(), None);
        let result = repo.insert(post).await;

        match result {
            Err(RepoError::Constraint(message)) => {
                assert_eq!(message, "A post with this slug already exists");
            }
            other => panic!("expected constraint error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_due_reports_the_flipped_row_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let flipped = repo.publish_due(Utc::now()).await.unwrap();

        assert_eq!(flipped, 3);
    }

    #[tokio::test]
    async fn find_published_by_slug_joins_the_author_profile() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_row(post_id, user_id, "published", None)]])
            .append_query_results([vec![profile_row(
                user_id,
                Some("Ada"),
                Some("https://cdn.example.com/ada.png"),
            )]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let public = repo
            .find_published_by_slug("test-post")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(public.id, post_id);
        assert_eq!(public.author_first_name.as_deref(), Some("Ada"));
        assert_eq!(
            public.author_avatar_url.as_deref(),
            Some("https://cdn.example.com/ada.png")
        );
    }

    #[tokio::test]
    async fn list_published_tolerates_missing_profiles() {
        let author_a = Uuid::new_v4();
        let author_b = Uuid::new_v4();
        let mut second = post_row(Uuid::new_v4(), author_b, "published", None);
        second.slug = "second-post".to_owned();

        // Only author A has a profile row.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                post_row(Uuid::new_v4(), author_a, "published", None),
                second,
            ]])
            .append_query_results([vec![profile_row(author_a, Some("Ada"), None)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let posts = repo.list_published().await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author_first_name.as_deref(), Some("Ada"));
        assert_eq!(posts[1].author_first_name, None);
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_constraint() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom(
                "duplicate key value violates unique constraint \"users_email_key\"".to_owned(),
            )])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let user = User::new(
            "ada@example.com".to_owned(),
            "hash".to_owned(),
            None,
            "token".to_owned(),
        );
        let result = repo.insert(user).await;

        match result {
            Err(RepoError::Constraint(message)) => {
                assert_eq!(message, "An account with this email already exists");
            }
            other => panic!("expected constraint error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_updates_require_an_existing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let result = repo.mark_email_verified(Uuid::new_v4(), Utc::now()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn profile_upsert_returns_the_stored_row() {
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![profile_row(user_id, Some("Ada"), None)]])
            .into_connection();

        let repo = PostgresProfileRepository::new(db);
        let profile = repo.upsert(Profile::new(user_id)).await.unwrap();

        assert_eq!(profile.id, user_id);
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
    }
}
