//! The remote API seam.
//!
//! [`AppSyncApi`] covers exactly the calls a reconciliation pass makes. A
//! production implementation wraps the service SDK; [`InMemoryApi`] backs
//! tests and offline planning.
//!
//! [`InMemoryApi`]: crate::memory::InMemoryApi

use crate::error::ApiResult;
use async_trait::async_trait;
use gqlsync_core::{DeployedResolver, PipelineFunctions, ResolverKey, ResolverKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data source type name for Lambda-backed data sources.
pub const AWS_LAMBDA: &str = "AWS_LAMBDA";

/// A data source as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub data_source_type: String,
}

impl DataSource {
    pub fn new(name: impl Into<String>, data_source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source_type: data_source_type.into(),
        }
    }

    pub fn lambda(name: impl Into<String>) -> Self {
        Self::new(name, AWS_LAMBDA)
    }

    pub fn is_lambda(&self) -> bool {
        self.data_source_type == AWS_LAMBDA
    }
}

/// One page of a `listResolvers` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverPage {
    pub resolvers: Vec<DeployedResolver>,
    /// Continuation token; `None` on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Parameters of `createResolver` / `updateResolver`.
///
/// Exactly one of `data_source_name` and `pipeline_config` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverRequest {
    pub api_id: String,
    pub type_name: String,
    pub field_name: String,
    pub kind: ResolverKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_mapping_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mapping_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_config: Option<PipelineFunctions>,
}

impl ResolverRequest {
    pub fn key(&self) -> ResolverKey {
        ResolverKey::new(&self.type_name, &self.field_name)
    }

    /// The deployed record this request produces.
    pub fn to_deployed(&self) -> DeployedResolver {
        DeployedResolver {
            type_name: self.type_name.clone(),
            field_name: self.field_name.clone(),
            data_source_name: self.data_source_name.clone(),
            request_mapping_template: self.request_mapping_template.clone(),
            response_mapping_template: self.response_mapping_template.clone(),
            kind: self.kind,
            pipeline_config: self.pipeline_config.clone(),
            resolver_arn: Some(format!(
                "arn:aws:appsync:::apis/{}/types/{}/resolvers/{}",
                self.api_id, self.type_name, self.field_name
            )),
        }
    }
}

/// A mutating call recorded by an API implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create(ResolverRequest),
    Update(ResolverRequest),
    Delete { api_id: String, key: ResolverKey },
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(request) => write!(f, "createResolver {}", request.key()),
            Self::Update(request) => write!(f, "updateResolver {}", request.key()),
            Self::Delete { key, .. } => write!(f, "deleteResolver {key}"),
        }
    }
}

/// Remote resolver operations.
#[async_trait]
pub trait AppSyncApi: Send + Sync {
    /// Lists one page of the resolvers attached to `type_name`.
    async fn list_resolvers(
        &self,
        api_id: &str,
        type_name: &str,
        next_token: Option<&str>,
    ) -> ApiResult<ResolverPage>;

    async fn get_data_source(&self, api_id: &str, name: &str) -> ApiResult<DataSource>;

    async fn create_resolver(&self, request: &ResolverRequest) -> ApiResult<DeployedResolver>;

    async fn update_resolver(&self, request: &ResolverRequest) -> ApiResult<DeployedResolver>;

    /// Deletes a resolver. A missing resolver is reported as
    /// [`ApiErrorCode::NotFound`](crate::ApiErrorCode::NotFound).
    async fn delete_resolver(&self, api_id: &str, type_name: &str, field_name: &str)
        -> ApiResult<()>;
}
