//! In-memory repositories for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::core::RepositoryError;
use crate::domain::{Request, RequestId, RequestRepository, User, UserId, UserRepository};

/// Id-keyed store. Ids start at 1 and only grow.
struct MemoryStore<T> {
    entity: &'static str,
    next_id: AtomicU64,
    rows: RwLock<HashMap<u64, T>>,
}

impl<T: Clone> MemoryStore<T> {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            next_id: AtomicU64::new(1),
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn insert_with(&self, build: impl FnOnce(u64) -> T) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rows.write().insert(id, build(id));
        id
    }

    fn get(&self, id: u64) -> Result<T, RepositoryError> {
        self.rows
            .read()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound {
                entity: self.entity,
                id,
            })
    }

    fn len(&self) -> usize {
        self.rows.read().len()
    }
}

/// Users kept in process memory.
pub struct InMemoryUserRepository {
    store: MemoryStore<User>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new("user"),
        }
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no user has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn store(&self, user: &User) -> Result<UserId, RepositoryError> {
        Ok(self.store.insert_with(|id| User {
            id: Some(id),
            ..user.clone()
        }))
    }

    fn find_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        self.store.get(id)
    }
}

/// Requests kept in process memory.
pub struct InMemoryRequestRepository {
    store: MemoryStore<Request>,
}

impl InMemoryRequestRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new("request"),
        }
    }

    /// Number of stored requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no request has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRequestRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRepository for InMemoryRequestRepository {
    fn store(&self, request: &Request) -> Result<RequestId, RepositoryError> {
        Ok(self.store.insert_with(|id| Request {
            id: Some(id),
            ..request.clone()
        }))
    }

    fn find_by_id(&self, id: RequestId) -> Result<Request, RepositoryError> {
        self.store.get(id)
    }
}
