//! Tag-driven PostgreSQL DDL generation for tagddl models.
//!
//! This crate walks a [`tagddl_core::Project`] and produces create/drop SQL
//! scripts: database, schemas, routines and one file pair per table group,
//! with foreign keys deferred after every table of the group.

pub mod assemble;
pub mod database;
pub mod diagnostics;
pub mod emitter;
pub mod engine;
pub mod errors;
pub mod model;
pub mod naming;
pub mod options;
pub mod output;
pub mod routines;
pub mod table;
pub mod tags;
pub mod types;

pub use diagnostics::{CollectedDiagnostics, Diagnostic, DiagnosticSink, Severity, TracingDiagnostics};
pub use engine::Generator;
pub use errors::GenerationError;
pub use model::{GenerationReport, ModelMutation, TableReport};
pub use options::{DocumentationMode, GenerateOptions};
pub use output::{DirectorySink, FileSink, MemorySink};
