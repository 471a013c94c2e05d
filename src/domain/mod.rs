pub mod auth;
pub mod chat;
pub mod payment;
pub mod plan;
pub mod resource;
pub mod subscription;
pub mod user;
