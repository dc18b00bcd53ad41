//! The drink entity and its two serialized views.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::DrinkId;
use crate::recipe::{Ingredient, IngredientSummary, Recipe};

/// Maximum title length accepted by storage.
pub const MAX_TITLE_LEN: usize = 80;

/// A persisted drink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Recipe,
}

/// A drink that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

/// Partial update: each present field replaces the stored one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

/// `short()` view: ingredient names omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkShort {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

/// `long()` view: full ingredient detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkLong {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Check a title against the column constraints.
pub fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must not be blank"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

impl NewDrink {
    pub fn new(title: impl Into<String>, recipe: Recipe) -> DomainResult<Self> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self { title, recipe })
    }
}

impl DrinkPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        Ok(())
    }
}

impl Drink {
    pub fn from_new(id: DrinkId, new: NewDrink) -> Self {
        Self {
            id,
            title: new.title,
            recipe: new.recipe,
        }
    }

    /// Apply a validated patch in place.
    pub fn apply(&mut self, patch: DrinkPatch) -> DomainResult<()> {
        patch.validate()?;
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(recipe) = patch.recipe {
            self.recipe = recipe;
        }
        Ok(())
    }

    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.summaries(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}
