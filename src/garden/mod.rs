//! The user's saved plants ("My Garden").

pub mod store;
pub mod types;

pub use store::{GardenStore, SqlitePlantStore};
pub use types::{ListOrder, PlantRecord, SavedPlant};
