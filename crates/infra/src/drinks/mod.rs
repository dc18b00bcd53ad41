//! Drink persistence boundary.
//!
//! The trait lives in `trait.rs`; `sqlite` is the production table and
//! `in_memory` backs dev runs and tests.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryDrinkRepository;
pub use r#trait::{DrinkRepository, RepositoryError, seed_drink};
pub use sqlite::SqliteDrinkRepository;
