pub mod auth;
pub mod menu;
pub mod order;
pub mod user;
pub mod week;
