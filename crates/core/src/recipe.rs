//! Recipes: ordered ingredient lists persisted as JSON text.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// One ingredient of a drink recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

/// Public projection of an ingredient: the name stays hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: u32,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(value: &Ingredient) -> Self {
        Self {
            color: value.color.clone(),
            parts: value.parts,
        }
    }
}

/// Ordered list of ingredients.
///
/// Storage keeps a recipe as serialized JSON text; `to_text` and `from_text`
/// are the only crossing points between the two representations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn summaries(&self) -> Vec<IngredientSummary> {
        self.0.iter().map(IngredientSummary::from).collect()
    }

    /// Serialize for storage.
    pub fn to_text(&self) -> DomainResult<String> {
        serde_json::to_string(&self.0).map_err(|e| DomainError::corrupt_recipe(e.to_string()))
    }

    /// Decode recipe text read back from storage.
    pub fn from_text(text: &str) -> DomainResult<Self> {
        serde_json::from_str::<Vec<Ingredient>>(text)
            .map(Self)
            .map_err(|e| DomainError::corrupt_recipe(e.to_string()))
    }
}

impl From<Vec<Ingredient>> for Recipe {
    fn from(value: Vec<Ingredient>) -> Self {
        Self(value)
    }
}
