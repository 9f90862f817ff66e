pub mod connection;
pub mod event;
pub mod record;
pub mod task;
pub mod user;
