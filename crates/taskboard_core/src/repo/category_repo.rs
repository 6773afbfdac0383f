//! Category repository contract and SQLite implementation.
//!
//! # Invariants
//! - Category names are unique per owner.
//! - Reads are always scoped by owner; a foreign category reads as absent.

use crate::model::category::{Category, CategoryId, OwnerId};
use crate::repo::{ensure_table_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

/// Repository interface for category records.
pub trait CategoryRepository {
    /// Inserts one category. Fails with `DuplicateName` on a per-owner clash.
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    /// Loads one category owned by `owner_id`.
    fn get_category(
        &self,
        owner_id: OwnerId,
        category_id: CategoryId,
    ) -> RepoResult<Option<Category>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "categories", &["id", "owner_id", "name"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        let inserted = self.conn.execute(
            "INSERT INTO categories (id, owner_id, name) VALUES (?1, ?2, ?3);",
            params![
                category.id.to_string(),
                category.owner_id.to_string(),
                category.name.as_str(),
            ],
        );

        match inserted {
            Ok(_) => Ok(category.id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(RepoError::DuplicateName(category.name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_category(
        &self,
        owner_id: OwnerId,
        category_id: CategoryId,
    ) -> RepoResult<Option<Category>> {
        let row: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT id, owner_id, name
                 FROM categories
                 WHERE id = ?1
                   AND owner_id = ?2;",
                params![category_id.to_string(), owner_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        row.map(|(id, owner_id, name)| {
            Ok(Category {
                id: parse_uuid(&id, "categories.id")?,
                owner_id: parse_uuid(&owner_id, "categories.owner_id")?,
                name,
            })
        })
        .transpose()
    }
}
