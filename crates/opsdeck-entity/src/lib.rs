//! # opsdeck-entity
//!
//! Domain entity models for Opsdeck. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod auth_event;
pub mod notification;
pub mod user;
