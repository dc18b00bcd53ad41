use thiserror::Error;

use coffeeshop_core::{DomainError, Drink, DrinkId, Ingredient, NewDrink, Recipe};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("drink not found")]
    NotFound,

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Constraint(db.message().to_string())
            }
            sqlx::Error::RowNotFound => Self::NotFound,
            _ => Self::Storage(err.to_string()),
        }
    }
}

/// CRUD boundary over the single `drinks` table.
///
/// Each call is its own unit of work; nothing here spans a transaction across
/// calls, so a read followed by a write can race with other writers.
///
/// `delete` is not idempotent: removing a row that is already gone fails with
/// `RepositoryError::NotFound`. Callers look the row up first and translate
/// absence themselves.
#[async_trait::async_trait]
pub trait DrinkRepository: Send + Sync {
    /// Every row, in storage order (ascending id).
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError>;

    async fn find_by_id(&self, id: DrinkId) -> Result<Option<Drink>, RepositoryError>;

    /// Persist a new drink and return it with its assigned id.
    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepositoryError>;

    /// Persist the current state of an already-loaded drink.
    async fn update(&self, drink: &Drink) -> Result<(), RepositoryError>;

    async fn delete(&self, drink: &Drink) -> Result<(), RepositoryError>;

    /// Destroy all rows, recreate storage and insert the seed drink.
    async fn drop_and_create_all(&self) -> Result<(), RepositoryError>;
}

/// The single drink present after `drop_and_create_all`.
pub fn seed_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: Recipe::new(vec![Ingredient {
            color: "blue".to_string(),
            name: "water".to_string(),
            parts: 1,
        }]),
    }
}
