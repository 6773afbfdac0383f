//! Category use-case service.

use crate::model::category::{Category, CategoryId, OwnerId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from category use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    /// Name is blank after trim.
    InvalidName,
    /// Owner already has a category with this name.
    DuplicateName(String),
    /// Category does not exist for this owner.
    CategoryNotFound(CategoryId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "category name must not be blank"),
            Self::DuplicateName(name) => write!(f, "category name already exists: `{name}`"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            RepoError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Category service facade.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a category with a trimmed, non-blank name.
    pub fn create_category(
        &self,
        owner_id: OwnerId,
        name: impl Into<String>,
    ) -> Result<Category, CategoryServiceError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CategoryServiceError::InvalidName);
        }

        let category = Category::new(owner_id, trimmed);
        self.repo.create_category(&category)?;
        Ok(category)
    }

    /// Loads one category owned by `owner_id`.
    pub fn get_category(
        &self,
        owner_id: OwnerId,
        category_id: CategoryId,
    ) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_category(owner_id, category_id)?
            .ok_or(CategoryServiceError::CategoryNotFound(category_id))
    }
}
