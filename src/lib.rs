//! Core of a Managed Data Structures runtime.
//!
//! This crate implements the record type registry, the multi-version slot
//! engine, and the branch/isolation-context model that together let a
//! client read and write record fields relative to a named branch of a
//! version tree, with lazily-created per-field versioned storage and
//! single-inheritance nominal record types.
//!
//! Start from [`Runtime`]: it owns the interner, the type registry, and the
//! top-level branch, and is the entry point for declaring types and
//! creating records.

mod branch;
mod context;
mod error;
mod field;
mod generation;
mod hash;
mod id;
mod intern;
mod kind;
mod msv;
mod record;
mod record_type;
mod runtime;
mod tracing;
mod validity;

pub use branch::Branch;
pub use context::IsolationContext;
pub use error::{ErrorKind, MdsError, Result};
pub use id::UniformId;
pub use intern::Symbol;
pub use kind::{Kind, ModifyOp, ResMode, Value};
pub use msv::ConflictGenerator;
pub use record::ManagedRecord;
pub use record_type::{FieldDescriptor, RecordType, RecordTypeRegistry};
pub use runtime::{Runtime, RuntimeConfig};
