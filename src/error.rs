//! Typed failures surfaced by the registry, field descriptors, and slots.
//!
//! Errors propagate immediately; nothing here is retried or swallowed. State
//! changes are either fully applied before an error can be observed or not
//! applied at all.

use std::fmt;

use crate::intern::Symbol;
use crate::tracing::debug;

pub type Result<T> = std::result::Result<T, MdsError>;

#[derive(Debug)]
pub struct MdsError {
    kind: ErrorKind,
}

#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// Raised by `ensure_created` on a type proven invalid, by field
    /// accessors whose record is not a subtype of the field's declaring
    /// type, and by `is_valid` when the underlying type is invalid.
    IncompatibleRecordType { type_name: Symbol },
    /// Raised by `declare` when a re-declaration names a supertype that is
    /// not a supertype of the already-registered type's supertype.
    IncompatibleSuperclass { type_name: Symbol },
    /// Raised by `field_in` when a field of the same name already exists
    /// with a different value-type, and reused for the analogous runtime
    /// check on `Msv::modify` argument kinds.
    IncompatibleType { field_name: Symbol },
    /// Raised by `add_field` once the declaring type has been created.
    UnmodifiableRecordType { type_name: Symbol },
    /// Raised when a record accessor names a field index outside the
    /// record's frozen slot array.
    FieldOutOfRange { field_name: Symbol },
}

impl MdsError {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn incompatible_record_type(type_name: Symbol) -> Self {
        debug!(type_name = %type_name, "incompatible record type");
        MdsError {
            kind: ErrorKind::IncompatibleRecordType { type_name },
        }
    }

    pub(crate) fn incompatible_superclass(type_name: Symbol) -> Self {
        debug!(type_name = %type_name, "incompatible superclass");
        MdsError {
            kind: ErrorKind::IncompatibleSuperclass { type_name },
        }
    }

    pub(crate) fn incompatible_type(field_name: Symbol) -> Self {
        debug!(field_name = %field_name, "incompatible field value-type");
        MdsError {
            kind: ErrorKind::IncompatibleType { field_name },
        }
    }

    pub(crate) fn unmodifiable_record_type(type_name: Symbol) -> Self {
        debug!(type_name = %type_name, "record type is no longer modifiable");
        MdsError {
            kind: ErrorKind::UnmodifiableRecordType { type_name },
        }
    }

    pub(crate) fn field_out_of_range(field_name: Symbol) -> Self {
        debug!(field_name = %field_name, "field index out of range for record");
        MdsError {
            kind: ErrorKind::FieldOutOfRange { field_name },
        }
    }
}

impl fmt::Display for MdsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::IncompatibleRecordType { type_name } => {
                write!(f, "incompatible record type: {type_name}")
            }
            ErrorKind::IncompatibleSuperclass { type_name } => {
                write!(f, "incompatible superclass for record type {type_name}")
            }
            ErrorKind::IncompatibleType { field_name } => {
                write!(f, "incompatible value-type for field {field_name}")
            }
            ErrorKind::UnmodifiableRecordType { type_name } => {
                write!(f, "record type {type_name} is already created and unmodifiable")
            }
            ErrorKind::FieldOutOfRange { field_name } => {
                write!(f, "field {field_name} is out of range for this record")
            }
        }
    }
}

impl std::error::Error for MdsError {}
