pub mod cache;
pub mod directory;
pub mod firebase;
pub mod listings;
pub mod local_store;
