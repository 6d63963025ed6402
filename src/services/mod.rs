pub mod admin;
pub mod email;
pub mod kiosk;
pub mod menu;
pub mod metrics;
pub mod notify;
pub mod order;
