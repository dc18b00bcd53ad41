//! SQLite-backed drink table.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use coffeeshop_core::{Drink, DrinkId, NewDrink, Recipe};

use super::r#trait::{DrinkRepository, RepositoryError, seed_drink};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        title  TEXT    NOT NULL UNIQUE,
        recipe TEXT    NOT NULL
    )
"#;

/// Drink repository over a SQLite connection pool.
///
/// Every method issues a single auto-committed statement, except
/// `drop_and_create_all`, which runs in one transaction.
#[derive(Debug, Clone)]
pub struct SqliteDrinkRepository {
    pool: SqlitePool,
}

impl SqliteDrinkRepository {
    /// Open (creating if missing) the database at `url` and ensure the table exists.
    ///
    /// In-memory URLs get a single long-lived connection, since every SQLite
    /// connection to `:memory:` would otherwise see its own empty database.
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        let repo = Self::from_pool(pool);
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn row_to_drink(row: &SqliteRow) -> Result<Drink, RepositoryError> {
    let id: i64 = row.try_get("id")?;
    let title: String = row.try_get("title")?;
    let recipe: String = row.try_get("recipe")?;

    Ok(Drink {
        id: DrinkId::new(id),
        title,
        recipe: Recipe::from_text(&recipe)?,
    })
}

#[async_trait::async_trait]
impl DrinkRepository for SqliteDrinkRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError> {
        let rows = sqlx::query("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_drink).collect()
    }

    async fn find_by_id(&self, id: DrinkId) -> Result<Option<Drink>, RepositoryError> {
        let row = sqlx::query("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_drink).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        let recipe = drink.recipe.to_text()?;
        let result = sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(&drink.title)
            .bind(recipe)
            .execute(&self.pool)
            .await?;

        Ok(Drink::from_new(DrinkId::new(result.last_insert_rowid()), drink))
    }

    async fn update(&self, drink: &Drink) -> Result<(), RepositoryError> {
        let recipe = drink.recipe.to_text()?;
        let result = sqlx::query("UPDATE drinks SET title = ?, recipe = ? WHERE id = ?")
            .bind(&drink.title)
            .bind(recipe)
            .bind(drink.id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(drink.id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn drop_and_create_all(&self) -> Result<(), RepositoryError> {
        let seed = seed_drink();
        let recipe = seed.recipe.to_text()?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(&seed.title)
            .bind(recipe)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::warn!("drinks table dropped and recreated with seed data");
        Ok(())
    }
}
