use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use coffeeshop_core::{Drink, DrinkId, NewDrink};

use super::r#trait::{DrinkRepository, RepositoryError, seed_drink};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<DrinkId, Drink>,
    last_id: i64,
}

impl Table {
    fn title_taken(&self, title: &str, except: Option<DrinkId>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }

    fn insert(&mut self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        if self.title_taken(&drink.title, None) {
            return Err(RepositoryError::Constraint(format!(
                "UNIQUE constraint failed: drinks.title ({})",
                drink.title
            )));
        }
        // Ids are never reused, even after deletes.
        self.last_id += 1;
        let stored = Drink::from_new(DrinkId::new(self.last_id), drink);
        self.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

/// In-memory drink table.
///
/// Intended for tests/dev. Enforces the same title uniqueness and id
/// assignment rules as the SQLite table.
#[derive(Debug, Default)]
pub struct InMemoryDrinkRepository {
    table: RwLock<Table>,
}

impl InMemoryDrinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, RepositoryError> {
        self.table
            .read()
            .map_err(|_| RepositoryError::Storage("drink table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, RepositoryError> {
        self.table
            .write()
            .map_err(|_| RepositoryError::Storage("drink table lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl DrinkRepository for InMemoryDrinkRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: DrinkId) -> Result<Option<Drink>, RepositoryError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        self.write()?.insert(drink)
    }

    async fn update(&self, drink: &Drink) -> Result<(), RepositoryError> {
        let mut table = self.write()?;
        if !table.rows.contains_key(&drink.id) {
            return Err(RepositoryError::NotFound);
        }
        if table.title_taken(&drink.title, Some(drink.id)) {
            return Err(RepositoryError::Constraint(format!(
                "UNIQUE constraint failed: drinks.title ({})",
                drink.title
            )));
        }
        table.rows.insert(drink.id, drink.clone());
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), RepositoryError> {
        self.write()?
            .rows
            .remove(&drink.id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn drop_and_create_all(&self) -> Result<(), RepositoryError> {
        let mut table = self.write()?;
        *table = Table::default();
        table.insert(seed_drink())?;
        Ok(())
    }
}
