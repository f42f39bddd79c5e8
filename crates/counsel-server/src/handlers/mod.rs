pub mod chat;
pub mod delete;
pub mod health;
pub mod history;
