pub mod assistant;
pub mod catalog;
pub mod config;
pub mod garden;
pub mod keychain;
pub mod navigation;
pub mod scan;
