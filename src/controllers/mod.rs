pub mod api_key;
pub mod auth;
pub mod chat;
pub mod health;
pub mod oauth;
pub mod payment;
pub mod plan;
pub mod resource;
pub mod subscription;
pub mod user;
