//! Core contracts for tagddl.
//!
//! This crate defines the entity-relationship model graph consumed by the DDL
//! engine: projects, data models, diagrams, entities, columns and the tags
//! attached to them, plus lookup and validation helpers shared by the engine
//! and the CLI.

pub mod error;
pub mod index;
pub mod model;
pub mod node;
pub mod tags;
pub mod validation;

pub use error::{Error, Result};
pub use index::{ColumnLocation, ColumnTarget, ModelIndex};
pub use model::{Column, DataModel, Diagram, Entity, ModelDocument, Project, model_json_schema};
pub use node::{Node, NodeKind};
pub use tags::{Tag, TagKind, TagReference};
pub use validation::{ModelIssue, validate_model};

/// Schema name used when a data model carries no `schema` tag.
pub const DEFAULT_SCHEMA: &str = "public";
