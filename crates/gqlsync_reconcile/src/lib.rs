//! Resolver reconciliation for gqlsync.
//!
//! Two passes, both orchestration over an injected [`AppSyncApi`]:
//!
//! - [`ResolverSynchronizer`] creates and updates remote resolvers so they
//!   match the declared mapping templates.
//! - [`ObsoleteResolverRemover`] deletes resolvers that a previous pass
//!   deployed and the configuration no longer declares.
//!
//! ```ignore
//! use gqlsync_reconcile::{ObsoleteResolverRemover, ResolverSynchronizer};
//! use std::sync::Arc;
//!
//! let api: Arc<dyn AppSyncApi> = Arc::new(client);
//! let results = ResolverSynchronizer::new(api.clone()).synchronize(&config).await?;
//! ObsoleteResolverRemover::new(api).remove_obsolete(&config, &previous_state).await?;
//! ```
//!
//! [`AppSyncApi`]: gqlsync_client::AppSyncApi

pub mod error;
pub mod remover;
pub mod synchronizer;
pub mod templates;

pub use error::{SyncError, SyncResult};
pub use remover::ObsoleteResolverRemover;
pub use synchronizer::{build_request, ResolverSynchronizer};
pub use templates::{
    apply_lambda_defaults, resolve_templates, FsTemplateLoader, InlineTemplateLoader,
    TemplateLoader, LAMBDA_REQUEST_TEMPLATE, LAMBDA_RESPONSE_TEMPLATE,
};
