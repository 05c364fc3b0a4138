//! Core model for gqlsync.
//!
//! This crate provides the pure, I/O-free pieces of resolver reconciliation:
//! - `config`: Declared resolver configuration and prior-run state
//! - `resolver`: Deployed and templated resolver records, modes, keys
//! - `diff`: Duplicate detection, key comparison, mode classification
//! - `validate`: Unit/pipeline target validation
//! - `error`: Configuration errors

pub mod config;
pub mod diff;
pub mod error;
pub mod resolver;
pub mod validate;

pub use config::{FunctionConfig, MappingTemplate, PipelineFunctions, SyncConfig, SyncState};
pub use diff::{
    check_duplicates, classify, equal_by_fields, obsolete_keys, DeployedIndex, ResolverField,
    ResolverFields, COMPARED_FIELDS,
};
pub use error::{ConfigError, ConfigResult};
pub use resolver::{
    DeployedResolver, Mode, ResolverKey, ResolverKind, SyncSummary, SyncedResolver,
    TemplatedResolver,
};
pub use validate::{validate_resolver, ResolverTarget};
