use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostPatch, Tag, User, UserPatch};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, BaseRepository, PasswordService, PostRepository, TagRepository, TokenClaims,
    TokenService, UserRepository,
};
use crate::service::{AuthService, PostService, Registration, TagService, UserService};

// In-memory doubles. Kept dumb on purpose: a HashMap per table and a
// HashSet for the association pairs.

#[derive(Default)]
struct InMemoryUsers {
    rows: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, entity: User) -> Result<User, RepoError> {
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Default)]
struct InMemoryTags {
    rows: Mutex<HashMap<Uuid, Tag>>,
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryTags {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Tag>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, entity: Tag) -> Result<Tag, RepoError> {
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Tag) -> Result<Tag, RepoError> {
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl TagRepository for InMemoryTags {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|t| t.name == name)
            .cloned())
    }
}

struct InMemoryPosts {
    rows: Mutex<HashMap<Uuid, Post>>,
    links: Mutex<HashSet<(Uuid, Uuid)>>,
    tags: Arc<InMemoryTags>,
}

impl InMemoryPosts {
    fn new(tags: Arc<InMemoryTags>) -> Self {
        Self {
            rows: Mutex::default(),
            links: Mutex::default(),
            tags,
        }
    }

    fn tags_of(&self, post_id: Uuid) -> Vec<Tag> {
        let links = self.links.lock().unwrap();
        let tags = self.tags.rows.lock().unwrap();
        links
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| tags.get(t).cloned())
            .collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, entity: Post) -> Result<Post, RepoError> {
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        self.rows.lock().unwrap().insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(RepoError::NotFound)?;
        // Cascade, like the database would.
        self.links.lock().unwrap().retain(|(p, _)| *p != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPosts {
    async fn find_all_with_tags(&self) -> Result<Vec<(Post, Vec<Tag>)>, RepoError> {
        let rows: Vec<Post> = self.rows.lock().unwrap().values().cloned().collect();
        Ok(rows
            .into_iter()
            .map(|p| {
                let tags = self.tags_of(p.id);
                (p, tags)
            })
            .collect())
    }

    async fn find_with_tags(&self, id: Uuid) -> Result<Option<(Post, Vec<Tag>)>, RepoError> {
        let post = self.rows.lock().unwrap().get(&id).cloned();
        Ok(post.map(|p| {
            let tags = self.tags_of(p.id);
            (p, tags)
        }))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn replace_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut links = self.links.lock().unwrap();
        links.retain(|(p, _)| *p != post_id);
        for tag_id in tag_ids {
            links.insert((post_id, *tag_id));
        }
        Ok(())
    }
}

/// Reversible-looking but clearly-not-plaintext fake hasher.
struct FakeHasher;

impl PasswordService for FakeHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hashed::{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("hashed::{password}"))
    }
}

struct FakeTokens;

impl TokenService for FakeTokens {
    fn generate_token(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        Ok(format!("token::{user_id}::{email}"))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut parts = token.splitn(3, "::");
        match (parts.next(), parts.next(), parts.next()) {
            (Some("token"), Some(id), Some(email)) => Ok(TokenClaims {
                user_id: Uuid::parse_str(id)
                    .map_err(|e| AuthError::InvalidToken(e.to_string()))?,
                email: email.to_string(),
                exp: i64::MAX,
            }),
            _ => Err(AuthError::InvalidToken("bad shape".into())),
        }
    }

    fn expiration_seconds(&self) -> i64 {
        3600
    }
}

struct Fixture {
    users: Arc<InMemoryUsers>,
    tags: Arc<InMemoryTags>,
    posts: Arc<InMemoryPosts>,
    auth: AuthService,
    post_service: PostService,
    tag_service: TagService,
    user_service: UserService,
}

fn fixture() -> Fixture {
    let users = Arc::new(InMemoryUsers::default());
    let tags = Arc::new(InMemoryTags::default());
    let posts = Arc::new(InMemoryPosts::new(tags.clone()));
    let auth = AuthService::new(users.clone(), Arc::new(FakeHasher), Arc::new(FakeTokens));
    let post_service = PostService::new(posts.clone(), tags.clone(), users.clone());
    let tag_service = TagService::new(tags.clone());
    let user_service = UserService::new(users.clone(), posts.clone(), Arc::new(FakeHasher));
    Fixture {
        users,
        tags,
        posts,
        auth,
        post_service,
        tag_service,
        user_service,
    }
}

async fn seed_user(fx: &Fixture) -> User {
    fx.users
        .create(User::new(
            "Ana".into(),
            "ana@example.com".into(),
            "hashed::secret1".into(),
        ))
        .await
        .unwrap()
}

async fn seed_tag(fx: &Fixture, name: &str) -> Tag {
    fx.tags.create(Tag::new(name.into())).await.unwrap()
}

fn registration() -> Registration {
    Registration {
        name: "John Doe".into(),
        email: "johndoe@example.com".into(),
        password: "password".into(),
        password_confirmation: "password".into(),
    }
}

fn tag_id_set(tags: &[Tag]) -> BTreeSet<Uuid> {
    tags.iter().map(|t| t.id).collect()
}

#[tokio::test]
async fn register_hashes_password_and_issues_valid_token() {
    let fx = fixture();

    let (user, token) = fx.auth.register(registration()).await.unwrap();

    assert_ne!(user.password_hash, "password");
    assert!(user.password_hash.starts_with("hashed::"));

    let claims = FakeTokens.validate_token(&token).unwrap();
    assert_eq!(claims.user_id, user.id);
    assert_eq!(claims.email, user.email);
}

#[tokio::test]
async fn register_rejects_mismatched_confirmation() {
    let fx = fixture();
    let input = Registration {
        password_confirmation: "different".into(),
        ..registration()
    };

    let err = fx.auth.register(input).await.unwrap_err();
    match err {
        DomainError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.field == "password"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let fx = fixture();
    fx.auth.register(registration()).await.unwrap();

    let err = fx.auth.register(registration()).await.unwrap_err();
    match err {
        DomainError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.field == "email"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn login_does_not_distinguish_unknown_email_from_wrong_password() {
    let fx = fixture();
    fx.auth.register(registration()).await.unwrap();

    let unknown = fx
        .auth
        .login("nobody@example.com", "password")
        .await
        .unwrap_err();
    let wrong = fx
        .auth
        .login("johndoe@example.com", "not-the-password")
        .await
        .unwrap_err();

    assert!(matches!(unknown, DomainError::Unauthorized));
    assert!(matches!(wrong, DomainError::Unauthorized));
}

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let fx = fixture();
    let (user, _) = fx.auth.register(registration()).await.unwrap();

    let token = fx
        .auth
        .login("johndoe@example.com", "password")
        .await
        .unwrap();
    let claims = FakeTokens.validate_token(&token).unwrap();
    assert_eq!(claims.user_id, user.id);
}

#[tokio::test]
async fn create_post_associates_exactly_the_submitted_tags() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    let t1 = seed_tag(&fx, "rust").await;
    let t2 = seed_tag(&fx, "web").await;
    let t3 = seed_tag(&fx, "db").await;

    let created = fx
        .post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            // Duplicate id in the input; set semantics dedupe it.
            tag_ids: Some(vec![t1.id, t2.id, t3.id, t2.id]),
        })
        .await
        .unwrap();

    assert_eq!(
        tag_id_set(&created.tags),
        BTreeSet::from([t1.id, t2.id, t3.id])
    );
}

#[tokio::test]
async fn update_replaces_the_association_set() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    let t1 = seed_tag(&fx, "rust").await;
    let t2 = seed_tag(&fx, "web").await;
    let t3 = seed_tag(&fx, "db").await;

    let created = fx
        .post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: Some(vec![t1.id, t2.id, t3.id]),
        })
        .await
        .unwrap();

    let updated = fx
        .post_service
        .update(
            created.post.id,
            PostPatch {
                tag_ids: Some(vec![t2.id]),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(tag_id_set(&updated.tags), BTreeSet::from([t2.id]));
}

#[tokio::test]
async fn update_without_tags_field_leaves_associations_unchanged() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    let t1 = seed_tag(&fx, "rust").await;

    let created = fx
        .post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: Some(vec![t1.id]),
        })
        .await
        .unwrap();

    let updated = fx
        .post_service
        .update(
            created.post.id,
            PostPatch {
                title: Some("New title".into()),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.post.title, "New title");
    assert_eq!(updated.post.content, "B");
    assert_eq!(tag_id_set(&updated.tags), BTreeSet::from([t1.id]));
}

#[tokio::test]
async fn update_with_empty_tag_list_clears_all_associations() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    let t1 = seed_tag(&fx, "rust").await;

    let created = fx
        .post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: Some(vec![t1.id]),
        })
        .await
        .unwrap();

    let updated = fx
        .post_service
        .update(
            created.post.id,
            PostPatch {
                tag_ids: Some(vec![]),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.tags.is_empty());
}

#[tokio::test]
async fn create_post_rejects_unknown_owner_and_tags() {
    let fx = fixture();
    let owner = seed_user(&fx).await;

    let err = fx
        .post_service
        .create(NewPost {
            user_id: Uuid::new_v4(),
            title: "A".into(),
            content: "B".into(),
            tag_ids: Some(vec![Uuid::new_v4()]),
        })
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.field == "user_id"));
            assert!(errors.iter().any(|e| e.field == "tags"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Sanity: a valid owner with no tags passes.
    fx.post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_post_removes_association_rows_and_subsequent_get_is_not_found() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    let t1 = seed_tag(&fx, "rust").await;

    let created = fx
        .post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: Some(vec![t1.id]),
        })
        .await
        .unwrap();

    fx.post_service.delete(created.post.id).await.unwrap();

    assert!(fx.posts.links.lock().unwrap().is_empty());
    let err = fx.post_service.get(created.post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn deleting_a_tag_is_not_blocked_by_associations() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    let t1 = seed_tag(&fx, "rust").await;

    fx.post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: Some(vec![t1.id]),
        })
        .await
        .unwrap();

    fx.tag_service.delete(t1.id).await.unwrap();
    let err = fx.tag_service.get(t1.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn tag_name_must_be_unique() {
    let fx = fixture();
    fx.tag_service.create("rust".into()).await.unwrap();

    let err = fx.tag_service.create("rust".into()).await.unwrap_err();
    match err {
        DomainError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.field == "name"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn tag_rename_to_its_own_name_is_allowed() {
    let fx = fixture();
    let tag = fx.tag_service.create("rust".into()).await.unwrap();

    let renamed = fx
        .tag_service
        .update(tag.id, Some("rust".into()))
        .await
        .unwrap();
    assert_eq!(renamed.name, "rust");
}

#[tokio::test]
async fn user_update_rehashes_password_and_keeps_other_fields() {
    let fx = fixture();
    let user = fx
        .user_service
        .create("Ana".into(), "ana@example.com".into(), "secret1".into())
        .await
        .unwrap();

    let updated = fx
        .user_service
        .update(
            user.id,
            UserPatch {
                password: Some("secret2".into()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.password_hash, "hashed::secret2");
}

#[tokio::test]
async fn user_get_includes_owned_posts() {
    let fx = fixture();
    let owner = seed_user(&fx).await;
    fx.post_service
        .create(NewPost {
            user_id: owner.id,
            title: "A".into(),
            content: "B".into(),
            tag_ids: None,
        })
        .await
        .unwrap();

    let (user, posts) = fx.user_service.get(owner.id).await.unwrap();
    assert_eq!(user.id, owner.id);
    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn profile_of_deleted_user_is_unauthorized() {
    let fx = fixture();
    let (user, _) = fx.auth.register(registration()).await.unwrap();

    fx.user_service.delete(user.id).await.unwrap();

    let err = fx.auth.profile(user.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
}
