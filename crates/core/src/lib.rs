//! `coffeeshop-core`: drink domain model.
//!
//! This crate contains **pure domain** types (no storage or transport concerns).

pub mod drink;
pub mod error;
pub mod id;
pub mod recipe;

pub use drink::{Drink, DrinkLong, DrinkPatch, DrinkShort, MAX_TITLE_LEN, NewDrink, validate_title};
pub use error::{DomainError, DomainResult};
pub use id::DrinkId;
pub use recipe::{Ingredient, IngredientSummary, Recipe};
