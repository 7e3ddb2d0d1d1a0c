pub mod directory;
pub mod listing;
pub mod moderation;
pub mod user;
