//! Mapping template resolution.
//!
//! A declared `request`/`response` value is either the path of a template
//! file or the template text itself. Missing templates of Lambda-backed
//! resolvers fall back to the direct-invoke defaults.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use gqlsync_client::AppSyncApi;
use gqlsync_core::{MappingTemplate, TemplatedResolver};
use std::path::PathBuf;
use tracing::debug;

/// Request template used for Lambda data sources without one.
pub const LAMBDA_REQUEST_TEMPLATE: &str =
    r#"{"version": "2017-02-28", "operation": "Invoke", "payload": $util.toJson($context.arguments)}"#;

/// Response template used for Lambda data sources without one.
pub const LAMBDA_RESPONSE_TEMPLATE: &str = "$util.toJson($context.result)";

/// Turns a declared template value into template text.
#[async_trait]
pub trait TemplateLoader: Send + Sync {
    async fn load(&self, value: &str) -> SyncResult<String>;
}

/// Reads the value as a file path when such a file exists, otherwise
/// returns the value unchanged.
#[derive(Debug, Clone, Default)]
pub struct FsTemplateLoader {
    base_dir: Option<PathBuf>,
}

impl FsTemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn path_for(&self, value: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(value),
            None => PathBuf::from(value),
        }
    }
}

#[async_trait]
impl TemplateLoader for FsTemplateLoader {
    async fn load(&self, value: &str) -> SyncResult<String> {
        let path = self.path_for(value);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {
                debug!(path = %path.display(), "reading template file");
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| SyncError::Template { path, source })
            }
            _ => Ok(value.to_string()),
        }
    }
}

/// Treats every value as literal template text.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTemplateLoader;

#[async_trait]
impl TemplateLoader for InlineTemplateLoader {
    async fn load(&self, value: &str) -> SyncResult<String> {
        Ok(value.to_string())
    }
}

async fn load_optional<L>(loader: &L, value: Option<&str>) -> SyncResult<Option<String>>
where
    L: TemplateLoader + ?Sized,
{
    match value {
        Some(value) => loader.load(value).await.map(Some),
        None => Ok(None),
    }
}

/// Resolves the request and response templates of a declared resolver.
pub async fn resolve_templates<L>(
    loader: &L,
    template: &MappingTemplate,
) -> SyncResult<TemplatedResolver>
where
    L: TemplateLoader + ?Sized,
{
    let (request, response) = tokio::try_join!(
        load_optional(loader, template.request.as_deref()),
        load_optional(loader, template.response.as_deref()),
    )?;

    Ok(TemplatedResolver {
        data_source: template.data_source.clone(),
        type_name: template.type_name.clone(),
        field_name: template.field_name.clone(),
        request_mapping_template: request,
        response_mapping_template: response,
        kind: template.kind,
        pipeline_config: template.pipeline_config.clone(),
    })
}

/// Fills missing templates with the Lambda defaults when the resolver's data
/// source is a Lambda function. Other data sources are left as they are.
pub async fn apply_lambda_defaults<A>(
    api: &A,
    api_id: &str,
    mut resolver: TemplatedResolver,
) -> SyncResult<TemplatedResolver>
where
    A: AppSyncApi + ?Sized,
{
    if !resolver.is_missing_template() {
        return Ok(resolver);
    }
    let Some(name) = resolver.data_source.as_deref() else {
        return Ok(resolver);
    };

    let data_source = api.get_data_source(api_id, name).await?;
    if data_source.is_lambda() {
        debug!(
            type_name = %resolver.type_name,
            field_name = %resolver.field_name,
            data_source = name,
            "using default Lambda templates"
        );
        resolver
            .request_mapping_template
            .get_or_insert_with(|| LAMBDA_REQUEST_TEMPLATE.to_string());
        resolver
            .response_mapping_template
            .get_or_insert_with(|| LAMBDA_RESPONSE_TEMPLATE.to_string());
    }
    Ok(resolver)
}
