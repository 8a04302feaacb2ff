//! In-memory repositories and fixtures for service and route tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    ads::{
        repo::AdRepository,
        repo_types::{Ad, AdDetail, AdFields, NewAd},
    },
    auth::{password::SecretHasher, Principal, Role},
    comments::{
        repo::CommentRepository,
        repo_types::{Comment, NewComment},
    },
    config::{AppConfig, DefaultUserConfig, StorageBackend},
    images::{repo::ImageRepository, Image, UploadItem},
    state::{AppState, Repositories},
    storage::{MemoryStorage, StorageClient},
    users::{
        repo::UserRepository,
        repo_types::{NewUser, ProfileUpdate, User},
        Registration,
    },
};

struct AdRow {
    id: i32,
    owner_id: i32,
    fields: AdFields,
    image_id: i32,
}

struct CommentRow {
    id: i32,
    ad_id: i32,
    author_id: i32,
    text: String,
    created_at: time::OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: BTreeMap<i32, User>,
    images: BTreeMap<i32, Image>,
    ads: BTreeMap<i32, AdRow>,
    comments: BTreeMap<i32, CommentRow>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn ad(&self, row: &AdRow) -> Option<Ad> {
        let owner = self.users.get(&row.owner_id)?;
        Some(Ad {
            id: row.id,
            owner_id: row.owner_id,
            owner_email: owner.email.clone(),
            title: row.fields.title.clone(),
            price: row.fields.price,
            description: row.fields.description.clone(),
            image_id: row.image_id,
        })
    }

    fn comment(&self, row: &CommentRow) -> Option<Comment> {
        let author = self.users.get(&row.author_id)?;
        Some(Comment {
            id: row.id,
            ad_id: row.ad_id,
            author_id: row.author_id,
            author_email: author.email.clone(),
            author_first_name: author.first_name.clone(),
            author_image_id: author.image_id,
            text: row.text.clone(),
            created_at: row.created_at,
        })
    }
}

/// All four repositories over one set of in-process tables.
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
    fail_ad_writes: AtomicBool,
}

impl MemoryDb {
    pub fn image_count(&self) -> usize {
        self.tables.lock().unwrap().images.len()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    /// Make every ad insert fail.
    pub fn fail_ad_writes(&self, fail: bool) {
        self.fail_ad_writes.store(fail, Ordering::SeqCst);
    }

    fn set_role(&self, email: &str, role: Role) {
        let mut t = self.tables.lock().unwrap();
        if let Some(user) = t.users.values_mut().find(|u| u.email == email) {
            user.role = role;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.tables.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &NewUser) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        if t.users.values().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let id = t.next_id();
        let row = User {
            id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            image_id: None,
            role: user.role,
        };
        t.users.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn update_profile(
        &self,
        id: i32,
        profile: &ProfileUpdate,
    ) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users.get_mut(&id).map(|u| {
            u.first_name = profile.first_name.clone();
            u.last_name = profile.last_name.clone();
            u.phone = profile.phone.clone();
            u.clone()
        }))
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> anyhow::Result<bool> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users
            .get_mut(&id)
            .map(|u| u.password_hash = password_hash.to_string())
            .is_some())
    }

    async fn update_role(&self, id: i32, role: Role) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users.get_mut(&id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }

    async fn set_image(&self, id: i32, image_id: i32) -> anyhow::Result<bool> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users
            .get_mut(&id)
            .map(|u| u.image_id = Some(image_id))
            .is_some())
    }
}

#[async_trait]
impl ImageRepository for MemoryDb {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Image>> {
        Ok(self.tables.lock().unwrap().images.get(&id).cloned())
    }

    async fn insert(&self, storage_key: &str, content_type: &str) -> anyhow::Result<Image> {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let image = Image {
            id,
            storage_key: storage_key.to_string(),
            content_type: content_type.to_string(),
        };
        t.images.insert(id, image.clone());
        Ok(image)
    }

    async fn update_key(
        &self,
        id: i32,
        storage_key: &str,
        content_type: &str,
    ) -> anyhow::Result<Option<(Image, String)>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.images.get_mut(&id).map(|image| {
            let old_key = std::mem::replace(&mut image.storage_key, storage_key.to_string());
            image.content_type = content_type.to_string();
            (image.clone(), old_key)
        }))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        Ok(self.tables.lock().unwrap().images.remove(&id).is_some())
    }
}

#[async_trait]
impl AdRepository for MemoryDb {
    async fn list_all(&self) -> anyhow::Result<Vec<Ad>> {
        let t = self.tables.lock().unwrap();
        Ok(t.ads.values().filter_map(|r| t.ad(r)).collect())
    }

    async fn list_by_owner(&self, owner_email: &str) -> anyhow::Result<Vec<Ad>> {
        let t = self.tables.lock().unwrap();
        Ok(t.ads
            .values()
            .filter_map(|r| t.ad(r))
            .filter(|a| a.owner_email == owner_email)
            .collect())
    }

    async fn find(&self, id: i32) -> anyhow::Result<Option<Ad>> {
        let t = self.tables.lock().unwrap();
        Ok(t.ads.get(&id).and_then(|r| t.ad(r)))
    }

    async fn find_detail(&self, id: i32) -> anyhow::Result<Option<AdDetail>> {
        let t = self.tables.lock().unwrap();
        let Some(row) = t.ads.get(&id) else {
            return Ok(None);
        };
        Ok(t.users.get(&row.owner_id).map(|owner| AdDetail {
            id: row.id,
            title: row.fields.title.clone(),
            price: row.fields.price,
            description: row.fields.description.clone(),
            image_id: row.image_id,
            owner_first_name: owner.first_name.clone(),
            owner_last_name: owner.last_name.clone(),
            owner_email: owner.email.clone(),
            owner_phone: owner.phone.clone(),
        }))
    }

    async fn insert(&self, ad: &NewAd) -> anyhow::Result<Ad> {
        if self.fail_ad_writes.load(Ordering::SeqCst) {
            anyhow::bail!("ad table unavailable");
        }
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let row = AdRow {
            id,
            owner_id: ad.owner_id,
            fields: ad.fields.clone(),
            image_id: ad.image_id,
        };
        let out = t
            .ad(&row)
            .ok_or_else(|| anyhow::anyhow!("owner {} missing", ad.owner_id))?;
        t.ads.insert(id, row);
        Ok(out)
    }

    async fn update(&self, id: i32, fields: &AdFields) -> anyhow::Result<Option<Ad>> {
        let mut t = self.tables.lock().unwrap();
        match t.ads.get_mut(&id) {
            Some(row) => row.fields = fields.clone(),
            None => return Ok(None),
        }
        Ok(t.ads.get(&id).and_then(|r| t.ad(r)))
    }

    async fn delete_with_comments(&self, id: i32) -> anyhow::Result<bool> {
        let mut t = self.tables.lock().unwrap();
        if t.ads.remove(&id).is_none() {
            return Ok(false);
        }
        t.comments.retain(|_, c| c.ad_id != id);
        Ok(true)
    }
}

#[async_trait]
impl CommentRepository for MemoryDb {
    async fn list_by_ad(&self, ad_id: i32) -> anyhow::Result<Vec<Comment>> {
        let t = self.tables.lock().unwrap();
        let mut out: Vec<Comment> = t
            .comments
            .values()
            .filter(|c| c.ad_id == ad_id)
            .filter_map(|c| t.comment(c))
            .collect();
        out.sort_by_key(|c| (c.created_at, c.id));
        Ok(out)
    }

    async fn find(&self, ad_id: i32, id: i32) -> anyhow::Result<Option<Comment>> {
        let t = self.tables.lock().unwrap();
        Ok(t.comments
            .get(&id)
            .filter(|c| c.ad_id == ad_id)
            .and_then(|c| t.comment(c)))
    }

    async fn insert(&self, comment: &NewComment) -> anyhow::Result<Comment> {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let row = CommentRow {
            id,
            ad_id: comment.ad_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            created_at: comment.created_at,
        };
        let out = t
            .comment(&row)
            .ok_or_else(|| anyhow::anyhow!("author {} missing", comment.author_id))?;
        t.comments.insert(id, row);
        Ok(out)
    }

    async fn update_text(&self, id: i32, text: &str) -> anyhow::Result<Option<Comment>> {
        let mut t = self.tables.lock().unwrap();
        match t.comments.get_mut(&id) {
            Some(row) => row.text = text.to_string(),
            None => return Ok(None),
        }
        Ok(t.comments.get(&id).and_then(|c| t.comment(c)))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        Ok(self.tables.lock().unwrap().comments.remove(&id).is_some())
    }
}

/// Reversible "hash" so tests stay fast.
pub struct PlainHasher;

impl SecretHasher for PlainHasher {
    fn hash(&self, secret: &str) -> anyhow::Result<String> {
        Ok(format!("plain${}", secret))
    }

    fn verify(&self, secret: &str, hash: &str) -> anyhow::Result<bool> {
        Ok(hash.strip_prefix("plain$") == Some(secret))
    }
}

/// Memory store that can be switched into an outage.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl FlakyStorage {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("asset store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageClient for FlakyStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.check()?;
        self.inner.put_object(key, body, content_type).await
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        self.check()?;
        self.inner.get_object(key).await
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.check()?;
        self.inner.delete_object(key).await
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        storage_backend: StorageBackend::Memory,
        s3: None,
        max_upload_bytes: 1024 * 1024,
        default_user: DefaultUserConfig {
            email: "user@email.com".into(),
            password: "password".into(),
            first_name: "Firstname".into(),
            last_name: "Lastname".into(),
            phone: "+79999999999".into(),
        },
    }
}

pub fn registration(email: &str) -> Registration {
    Registration {
        email: email.into(),
        password: "password1".into(),
        first_name: "First".into(),
        last_name: "Last".into(),
        phone: "+70000000000".into(),
        role: None,
    }
}

pub fn fields(title: &str, price: i32) -> AdFields {
    AdFields {
        title: title.into(),
        price,
        description: String::new(),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub db: Arc<MemoryDb>,
    pub storage: Arc<FlakyStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let storage = Arc::new(FlakyStorage::default());
        let repos = Repositories {
            users: db.clone(),
            ads: db.clone(),
            comments: db.clone(),
            images: db.clone(),
        };
        let state = AppState::from_parts(
            test_config(),
            repos,
            storage.clone(),
            Arc::new(PlainHasher),
        );
        Self { state, db, storage }
    }

    /// Register a regular account with password `password1`.
    pub async fn user(&self, email: &str) -> Principal {
        self.state
            .users
            .register(registration(email))
            .await
            .unwrap()
            .principal()
    }

    pub async fn admin(&self, email: &str) -> Principal {
        let principal = self.user(email).await;
        self.db.set_role(&principal.email, Role::Admin);
        Principal::new(principal.email, Role::Admin)
    }

    pub async fn ad(&self, owner: &Principal, title: &str) -> Ad {
        self.state
            .ads
            .create(owner, fields(title, 100), UploadItem::png(&b"img"[..]))
            .await
            .unwrap()
    }
}
