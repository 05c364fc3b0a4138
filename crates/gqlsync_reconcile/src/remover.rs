//! Removal of resolvers that are no longer declared.

use crate::error::SyncResult;
use futures::future::try_join_all;
use gqlsync_client::AppSyncApi;
use gqlsync_core::{obsolete_keys, ResolverKey, SyncConfig, SyncState};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ObsoleteResolverRemover {
    api: Arc<dyn AppSyncApi>,
}

impl ObsoleteResolverRemover {
    pub fn new(api: Arc<dyn AppSyncApi>) -> Self {
        Self { api }
    }

    /// Deletes every resolver recorded in `state` that `config` no longer
    /// declares. A resolver that is already gone counts as deleted.
    pub async fn remove_obsolete(&self, config: &SyncConfig, state: &SyncState) -> SyncResult<()> {
        let obsolete = obsolete_keys(config, state);
        if obsolete.is_empty() {
            debug!(api_id = %config.api_id, "no obsolete resolvers");
            return Ok(());
        }

        try_join_all(obsolete.iter().map(|key| self.delete(&config.api_id, key))).await?;
        info!(api_id = %config.api_id, removed = obsolete.len(), "obsolete resolvers removed");
        Ok(())
    }

    async fn delete(&self, api_id: &str, key: &ResolverKey) -> SyncResult<()> {
        info!(type_name = %key.type_name, field_name = %key.field_name, "deleting resolver");
        match self
            .api
            .delete_resolver(api_id, &key.type_name, &key.field_name)
            .await
        {
            Ok(()) => Ok(()),
            Err(error) if error.is_not_found() => {
                info!(resolver = %key, "resolver already removed");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }
}
