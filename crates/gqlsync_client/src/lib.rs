//! Remote API seam for gqlsync.
//!
//! The reconciliation passes only ever talk to the managed GraphQL service
//! through [`AppSyncApi`]. This crate defines that trait, its request and
//! response types, the error taxonomy, a pagination helper, and an in-memory
//! implementation.
//!
//! ```ignore
//! use gqlsync_client::{list_all_resolvers, InMemoryApi};
//!
//! let api = InMemoryApi::new().with_page_size(10);
//! let deployed = list_all_resolvers(&api, "api-1", "Query").await?;
//! ```

pub mod api;
pub mod error;
pub mod memory;
pub mod pagination;

pub use api::{ApiCall, AppSyncApi, DataSource, ResolverPage, ResolverRequest, AWS_LAMBDA};
pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use memory::{ApiSnapshot, FailOn, InMemoryApi};
pub use pagination::list_all_resolvers;
