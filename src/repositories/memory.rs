//! In-process stand-ins for the Postgres repositories, used by handler tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::PrimitiveDateTime;

use crate::db::models::{Client, Draw, User};
use crate::repositories::clients::{ClientChanges, ClientFilter, ClientRepository, NewClient};
use crate::repositories::draws::{DrawChanges, DrawFilter, DrawRepository, NewDraw};
use crate::repositories::health::StoreHealth;
use crate::repositories::users::{NewUser, UserChanges, UserFilter, UserRepository};
use crate::repositories::{PagedSource, Repositories, StoreError};
use crate::services::pagination::{QueryOptions, SortOrder};

pub(crate) trait Row: Clone + Send + Sync {
    fn id(&self) -> &str;
    fn created_at(&self) -> PrimitiveDateTime;
}

impl Row for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> PrimitiveDateTime {
        self.created_at
    }
}

impl Row for Client {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> PrimitiveDateTime {
        self.created_at
    }
}

impl Row for Draw {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> PrimitiveDateTime {
        self.created_at
    }
}

pub(crate) struct MemoryCollection<T> {
    rows: Mutex<Vec<T>>,
    offline: Arc<AtomicBool>,
    unreachable: AtomicBool,
}

impl<T: Row> MemoryCollection<T> {
    fn new(offline: Arc<AtomicBool>) -> Self {
        Self { rows: Mutex::new(Vec::new()), offline, unreachable: AtomicBool::new(false) }
    }

    fn rows(&self) -> Result<MutexGuard<'_, Vec<T>>, StoreError> {
        if self.offline.load(Ordering::SeqCst) || self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.rows.lock().map_err(|_| StoreError::QueryFailed("poisoned".to_string()))
    }

    fn count_where(&self, keep: impl Fn(&T) -> bool) -> Result<i64, StoreError> {
        Ok(self.rows()?.iter().filter(|row| keep(row)).count() as i64)
    }

    fn window(&self, keep: impl Fn(&T) -> bool, options: QueryOptions) -> Result<Vec<T>, StoreError> {
        let mut matching: Vec<T> = self.rows()?.iter().filter(|row| keep(row)).cloned().collect();
        matching.sort_by(|a, b| {
            (a.created_at(), a.id().to_string()).cmp(&(b.created_at(), b.id().to_string()))
        });
        if options.sort == SortOrder::CreatedDesc {
            matching.reverse();
        }
        Ok(matching
            .into_iter()
            .skip(usize::try_from(options.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(options.limit).unwrap_or(0))
            .collect())
    }

    fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.rows()?.iter().find(|row| row.id() == id).cloned())
    }

    fn modify(&self, id: &str, apply: impl FnOnce(&mut T)) -> Result<Option<T>, StoreError> {
        let mut rows = self.rows()?;
        Ok(rows.iter_mut().find(|row| row.id() == id).map(|row| {
            apply(row);
            row.clone()
        }))
    }
}

/// All three collections plus a shared switch that makes every call fail as
/// if the database were unreachable.
#[derive(Clone)]
pub(crate) struct MemoryStore {
    users: Arc<MemoryCollection<User>>,
    clients: Arc<MemoryCollection<Client>>,
    draws: Arc<MemoryCollection<Draw>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        let offline = Arc::new(AtomicBool::new(false));
        Self {
            users: Arc::new(MemoryCollection::new(offline.clone())),
            clients: Arc::new(MemoryCollection::new(offline.clone())),
            draws: Arc::new(MemoryCollection::new(offline.clone())),
            offline,
        }
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fails only the clients collection, leaving users reachable so
    /// authentication still succeeds.
    pub(crate) fn set_clients_offline(&self, offline: bool) {
        self.clients.unreachable.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn client_count(&self) -> usize {
        self.clients.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub(crate) fn repositories(&self) -> Repositories {
        Repositories {
            users: self.users.clone(),
            clients: self.clients.clone(),
            draws: self.draws.clone(),
            health: Arc::new(MemoryHealth { offline: self.offline.clone() }),
        }
    }
}

struct MemoryHealth {
    offline: Arc<AtomicBool>,
}

#[async_trait]
impl StoreHealth for MemoryHealth {
    async fn ping(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PagedSource for MemoryCollection<User> {
    type Item = User;
    type Filter = UserFilter;

    async fn count(&self, filter: &UserFilter) -> Result<i64, StoreError> {
        self.count_where(|user| filter.matches(user))
    }

    async fn query(&self, filter: &UserFilter, options: QueryOptions) -> Result<Vec<User>, StoreError> {
        self.window(|user| filter.matches(user), options)
    }
}

#[async_trait]
impl UserRepository for MemoryCollection<User> {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.find(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.rows()?.iter().find(|user| user.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows()?;
        if rows.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict("ix_users_email".to_string()));
        }
        let user = User {
            id: user.id,
            name: user.name,
            email: user.email,
            hashed_password: user.hashed_password,
            role: user.role,
            enabled: user.enabled,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>, StoreError> {
        self.modify(id, |user| {
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(role) = changes.role {
                user.role = role;
            }
            if let Some(enabled) = changes.enabled {
                user.enabled = enabled;
            }
            if let Some(hashed_password) = changes.hashed_password {
                user.hashed_password = hashed_password;
            }
            user.updated_at = changes.updated_at;
        })
    }
}

#[async_trait]
impl PagedSource for MemoryCollection<Client> {
    type Item = Client;
    type Filter = ClientFilter;

    async fn count(&self, filter: &ClientFilter) -> Result<i64, StoreError> {
        self.count_where(|client| filter.matches(client))
    }

    async fn query(
        &self,
        filter: &ClientFilter,
        options: QueryOptions,
    ) -> Result<Vec<Client>, StoreError> {
        self.window(|client| filter.matches(client), options)
    }
}

#[async_trait]
impl ClientRepository for MemoryCollection<Client> {
    async fn find_by_id(&self, id: &str) -> Result<Option<Client>, StoreError> {
        self.find(id)
    }

    async fn exists_by_document(&self, document: &str) -> Result<bool, StoreError> {
        Ok(self.rows()?.iter().any(|client| client.document == document))
    }

    async fn create(&self, client: NewClient) -> Result<Client, StoreError> {
        let mut rows = self.rows()?;
        if rows.iter().any(|existing| existing.document == client.document) {
            return Err(StoreError::Conflict("ix_clients_document".to_string()));
        }
        let client = Client {
            id: client.id,
            user_id: client.user_id,
            name: client.name,
            email: client.email,
            gender: client.gender,
            phone: client.phone,
            kind: client.kind,
            document: client.document,
            enabled: client.enabled,
            created_at: client.created_at,
            updated_at: client.created_at,
        };
        rows.push(client.clone());
        Ok(client)
    }

    async fn update(
        &self,
        id: &str,
        changes: ClientChanges,
    ) -> Result<Option<Client>, StoreError> {
        self.modify(id, |client| {
            if let Some(name) = changes.name {
                client.name = name;
            }
            if let Some(email) = changes.email {
                client.email = email;
            }
            if let Some(gender) = changes.gender {
                client.gender = gender;
            }
            if let Some(phone) = changes.phone {
                client.phone = phone;
            }
            if let Some(enabled) = changes.enabled {
                client.enabled = enabled;
            }
            client.updated_at = changes.updated_at;
        })
    }
}

#[async_trait]
impl PagedSource for MemoryCollection<Draw> {
    type Item = Draw;
    type Filter = DrawFilter;

    async fn count(&self, filter: &DrawFilter) -> Result<i64, StoreError> {
        self.count_where(|draw| filter.matches(draw))
    }

    async fn query(&self, filter: &DrawFilter, options: QueryOptions) -> Result<Vec<Draw>, StoreError> {
        self.window(|draw| filter.matches(draw), options)
    }
}

#[async_trait]
impl DrawRepository for MemoryCollection<Draw> {
    async fn find_by_id(&self, id: &str) -> Result<Option<Draw>, StoreError> {
        self.find(id)
    }

    async fn create(&self, draw: NewDraw) -> Result<Draw, StoreError> {
        let draw = Draw {
            id: draw.id,
            title: draw.title,
            description: draw.description,
            prize: draw.prize,
            draw_date: draw.draw_date,
            status: draw.status,
            enabled: draw.enabled,
            created_by: draw.created_by,
            created_at: draw.created_at,
            updated_at: draw.created_at,
        };
        self.rows()?.push(draw.clone());
        Ok(draw)
    }

    async fn update(&self, id: &str, changes: DrawChanges) -> Result<Option<Draw>, StoreError> {
        self.modify(id, |draw| {
            if let Some(title) = changes.title {
                draw.title = title;
            }
            if let Some(description) = changes.description {
                draw.description = description;
            }
            if let Some(prize) = changes.prize {
                draw.prize = prize;
            }
            if let Some(draw_date) = changes.draw_date {
                draw.draw_date = draw_date;
            }
            if let Some(status) = changes.status {
                draw.status = status;
            }
            if let Some(enabled) = changes.enabled {
                draw.enabled = enabled;
            }
            draw.updated_at = changes.updated_at;
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::db::types::ClientKind;
    use crate::services::pagination::{paginate, PageDefaults, PageRequest};

    fn new_client(id: &str, owner: &str, name: &str, document: &str, minute: u8) -> NewClient {
        NewClient {
            id: id.to_string(),
            user_id: owner.to_string(),
            name: name.to_string(),
            email: String::new(),
            gender: String::new(),
            phone: String::new(),
            kind: ClientKind::Natural,
            document: document.to_string(),
            enabled: true,
            created_at: datetime!(2025-01-01 10:00) + time::Duration::minutes(i64::from(minute)),
        }
    }

    #[tokio::test]
    async fn clients_page_in_creation_order() {
        let store = MemoryStore::new();
        let repos = store.repositories();
        for (index, document) in ["52998224725", "11144477735", "39053344705"].iter().enumerate() {
            // Insert newest first to prove the window is sorted, not insertion-ordered.
            let minute = 10 - index as u8;
            repos
                .clients
                .create(new_client(&format!("c{index}"), "u1", "Ana", document, minute))
                .await
                .expect("create");
        }

        let page = paginate(
            repos.clients.as_ref(),
            &ClientFilter::default(),
            PageRequest::new(2, 1),
            PageDefaults::default(),
            SortOrder::CreatedAsc,
        )
        .await
        .expect("page");

        let ids: Vec<_> = page.items.iter().map(|client| client.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn duplicate_document_is_a_conflict() {
        let store = MemoryStore::new();
        let repos = store.repositories();
        repos.clients.create(new_client("a", "u1", "Ana", "52998224725", 0)).await.expect("first");

        let err = repos
            .clients
            .create(new_client("b", "u2", "Bia", "52998224725", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(repos.clients.exists_by_document("52998224725").await.expect("exists"));
        assert_eq!(store.client_count(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::new();
        let repos = store.repositories();
        store.set_offline(true);

        assert!(matches!(
            repos.clients.count(&ClientFilter::default()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(repos.health.ping().await.is_err());

        store.set_offline(false);
        assert_eq!(repos.clients.count(&ClientFilter::default()).await.expect("count"), 0);
    }
}
