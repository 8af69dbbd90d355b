use thiserror::Error;

use crate::model::{NativeId, ValueKind};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors raised while mapping between records and entity instances.
///
/// All failures are synchronous and fail-fast: a schema inconsistency
/// aborts the whole hydration batch rather than silently skipping the
/// offending record, and nothing is retried internally.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A record's label has no registered schema entry.
    #[error("no schema registered for label '{0}'")]
    UnknownLabel(String),

    /// Two records claim the same native id but different labels, or a
    /// manually registered instance collides with a hydrated one.
    #[error("native id {id} is mapped to a '{existing}' instance but '{requested}' was requested")]
    IdentityConflict {
        /// The contested native id.
        id: NativeId,
        /// Label of the instance already registered under the id.
        existing: String,
        /// Label the conflicting record or instance carries.
        requested: String,
    },

    /// Neither endpoint of a relationship record declares a matching field.
    #[error("no owning side declares relationship '{rel_type}' between '{start}' and '{end}'")]
    NoOwningSide {
        /// Relationship type of the record.
        rel_type: String,
        /// Label of the start endpoint.
        start: String,
        /// Label of the end endpoint.
        end: String,
    },

    /// A property value cannot be converted into the declared field kind.
    #[error("cannot convert {found} value into {expected} for field '{field}'")]
    Conversion {
        /// The declared field name.
        field: String,
        /// The kind the schema declares.
        expected: ValueKind,
        /// The kind the record carried.
        found: ValueKind,
    },

    /// An instance that was never registered with this session was passed
    /// to a change-computation call. Caller contract violation.
    #[error("instance {0} is not registered with this session")]
    Unregistered(String),
}
