pub mod dashboard;
pub mod directory;
pub mod moderation;
pub mod pagination;
pub mod ports;
pub mod users;
