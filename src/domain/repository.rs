//! Persistence contracts for users and requests.

use super::model::{Request, RequestId, User, UserId};
use crate::core::RepositoryError;

/// Stores and loads users.
pub trait UserRepository: Send + Sync {
    /// Persist a user and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` on backend failure.
    fn store(&self, user: &User) -> Result<UserId, RepositoryError>;

    /// Load a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    fn find_by_id(&self, id: UserId) -> Result<User, RepositoryError>;
}

/// Stores and loads trip requests.
pub trait RequestRepository: Send + Sync {
    /// Persist a request and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` on backend failure.
    fn store(&self, request: &Request) -> Result<RequestId, RepositoryError>;

    /// Load a request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id.
    fn find_by_id(&self, id: RequestId) -> Result<Request, RepositoryError>;
}
