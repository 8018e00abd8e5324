//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` entity struct as returned by the API
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is editable

pub mod chat;
pub mod document;
pub mod extracted_item;
pub mod plan;
pub mod project;
pub mod question;
pub mod team_member;
pub mod user;
