mod access;
pub use access::{HasOwner, check_access, is_owner_or_admin};

mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult};

mod repo;
pub use repo::{
    CrudRepository, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, PaginatableRepository, ResourceType,
    ResourceTyped,
};

pub mod seed;

use sqlx::PgPool;

/// Handle every entity query runs through.
#[derive(Debug, Clone)]
pub struct ModelManager {
    database: DbConnection,
}

impl ModelManager {
    pub fn new(database: DbConnection) -> Self {
        Self { database }
    }

    pub fn executor(&self) -> &PgPool {
        self.database.pool()
    }
}
