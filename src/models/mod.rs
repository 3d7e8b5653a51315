//! Data models shared across repository, services and API layers

pub mod author;
pub mod book;
pub mod rental;
pub mod user;
