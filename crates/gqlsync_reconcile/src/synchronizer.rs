//! Resolver synchronization.
//!
//! A pass runs in stages, each waiting for its whole batch before the next
//! one starts:
//!
//! 1. reject duplicate (dataSource, type, field) declarations
//! 2. list the deployed resolvers of every declared type, all pages
//! 3. resolve request/response templates, Lambda defaults included
//! 4. classify each resolver as create, update or ignore
//! 5. send the creates and updates
//!
//! Stages 1–4 make up [`ResolverSynchronizer::plan`]. Remote calls inside a
//! stage run concurrently; the first failure aborts the pass. Writes already
//! sent are not rolled back, and re-running the pass converges.

use crate::error::SyncResult;
use crate::templates::{
    apply_lambda_defaults, resolve_templates, FsTemplateLoader, TemplateLoader,
};
use futures::future::try_join_all;
use gqlsync_client::{list_all_resolvers, AppSyncApi, ResolverRequest};
use gqlsync_core::{
    check_duplicates, classify, validate_resolver, ConfigResult, DeployedIndex, Mode,
    PipelineFunctions, ResolverTarget, SyncConfig, SyncSummary, SyncedResolver,
    TemplatedResolver,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// A remote write issued by a pass.
#[derive(Debug)]
enum Write {
    Create(ResolverRequest),
    Update(ResolverRequest),
}

impl Write {
    fn request(&self) -> &ResolverRequest {
        match self {
            Self::Create(request) | Self::Update(request) => request,
        }
    }
}

pub struct ResolverSynchronizer {
    api: Arc<dyn AppSyncApi>,
    loader: Arc<dyn TemplateLoader>,
}

impl ResolverSynchronizer {
    /// Creates a synchronizer that reads template files relative to the
    /// working directory.
    pub fn new(api: Arc<dyn AppSyncApi>) -> Self {
        Self {
            api,
            loader: Arc::new(FsTemplateLoader::new()),
        }
    }

    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn TemplateLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Computes the mode of every declared resolver without writing anything.
    pub async fn plan(&self, config: &SyncConfig) -> SyncResult<Vec<SyncedResolver>> {
        check_duplicates(&config.mapping_templates)?;

        let deployed = self.fetch_deployed(config).await?;
        let templated = self.resolve_all(config).await?;

        Ok(templated
            .into_iter()
            .map(|resolver| {
                let mode = classify(&resolver, &deployed);
                debug!(
                    type_name = %resolver.type_name,
                    field_name = %resolver.field_name,
                    %mode,
                    "classified resolver"
                );
                resolver.with_mode(mode)
            })
            .collect())
    }

    /// Plans the pass, then creates and updates resolvers until the API
    /// matches the declaration. Returns every declared resolver with its mode.
    pub async fn synchronize(&self, config: &SyncConfig) -> SyncResult<Vec<SyncedResolver>> {
        let results = self.plan(config).await?;

        let writes = results
            .iter()
            .filter(|synced| synced.mode != Mode::Ignore)
            .map(|synced| {
                let request = build_request(config, &synced.resolver)?;
                Ok(match synced.mode {
                    Mode::Create => Write::Create(request),
                    _ => Write::Update(request),
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        try_join_all(writes.iter().map(|write| self.apply(write))).await?;

        let summary = SyncSummary::from_results(&results);
        info!(
            api_id = %config.api_id,
            total = summary.total(),
            created = summary.created,
            updated = summary.updated,
            ignored = summary.ignored,
            "resolvers synchronized"
        );
        Ok(results)
    }

    async fn fetch_deployed(&self, config: &SyncConfig) -> SyncResult<DeployedIndex> {
        let mut seen = FxHashSet::default();
        let type_names: Vec<&str> = config
            .mapping_templates
            .iter()
            .map(|template| template.type_name.as_str())
            .filter(|type_name| seen.insert(*type_name))
            .collect();

        let pages = try_join_all(
            type_names
                .iter()
                .map(|type_name| list_all_resolvers(self.api.as_ref(), &config.api_id, type_name)),
        )
        .await?;

        let index = DeployedIndex::new(pages.into_iter().flatten());
        debug!(
            types = type_names.len(),
            deployed = index.len(),
            "fetched deployed resolvers"
        );
        Ok(index)
    }

    async fn resolve_all(&self, config: &SyncConfig) -> SyncResult<Vec<TemplatedResolver>> {
        try_join_all(config.mapping_templates.iter().map(|template| async move {
            let resolver = resolve_templates(self.loader.as_ref(), template).await?;
            apply_lambda_defaults(self.api.as_ref(), &config.api_id, resolver).await
        }))
        .await
    }

    async fn apply(&self, write: &Write) -> SyncResult<()> {
        let request = write.request();
        info!(
            type_name = %request.type_name,
            field_name = %request.field_name,
            kind = %request.kind,
            create = matches!(write, Write::Create(_)),
            "applying resolver"
        );
        match write {
            Write::Create(request) => self.api.create_resolver(request).await?,
            Write::Update(request) => self.api.update_resolver(request).await?,
        };
        Ok(())
    }
}

/// Builds the create/update parameters for a validated resolver.
pub fn build_request(
    config: &SyncConfig,
    resolver: &TemplatedResolver,
) -> ConfigResult<ResolverRequest> {
    let (data_source_name, pipeline_config) = match validate_resolver(resolver, config)? {
        ResolverTarget::DataSource(name) => (Some(name), None),
        ResolverTarget::Pipeline(ids) => (None, Some(PipelineFunctions { functions: ids })),
    };

    Ok(ResolverRequest {
        api_id: config.api_id.clone(),
        type_name: resolver.type_name.clone(),
        field_name: resolver.field_name.clone(),
        kind: resolver.kind,
        request_mapping_template: resolver.request_mapping_template.clone(),
        response_mapping_template: resolver.response_mapping_template.clone(),
        data_source_name,
        pipeline_config,
    })
}
