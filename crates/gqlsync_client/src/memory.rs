//! In-memory API implementation.
//!
//! Holds data sources and resolvers for a single API, paginates listings,
//! records every mutating call, and can be told to fail specific calls.

use crate::api::{ApiCall, AppSyncApi, DataSource, ResolverPage, ResolverRequest};
use crate::error::{ApiError, ApiErrorCode, ApiResult};
use async_trait::async_trait;
use gqlsync_core::{DeployedResolver, ResolverKey};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

const DEFAULT_PAGE_SIZE: usize = 25;

/// A serializable picture of the remote side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSnapshot {
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub resolvers: Vec<DeployedResolver>,
}

/// Which call an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    Create,
    Update,
    Delete,
}

pub struct InMemoryApi {
    data_sources: RwLock<IndexMap<String, DataSource>>,
    resolvers: RwLock<IndexMap<ResolverKey, DeployedResolver>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<FxHashMap<(FailOn, ResolverKey), ApiError>>,
    requests: AtomicUsize,
    page_size: usize,
}

impl Default for InMemoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self {
            data_sources: RwLock::new(IndexMap::new()),
            resolvers: RwLock::new(IndexMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(FxHashMap::default()),
            requests: AtomicUsize::new(0),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn from_snapshot(snapshot: ApiSnapshot) -> Self {
        let api = Self::new();
        let data_sources = snapshot
            .data_sources
            .into_iter()
            .map(|ds| (ds.name.clone(), ds))
            .collect();
        let resolvers = snapshot
            .resolvers
            .into_iter()
            .map(|resolver| (resolver.key(), resolver))
            .collect();
        Self {
            data_sources: RwLock::new(data_sources),
            resolvers: RwLock::new(resolvers),
            ..api
        }
    }

    /// Sets the listing page size (minimum 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn insert_data_source(&self, data_source: DataSource) {
        self.data_sources
            .write()
            .await
            .insert(data_source.name.clone(), data_source);
    }

    pub async fn insert_resolver(&self, resolver: DeployedResolver) {
        self.resolvers
            .write()
            .await
            .insert(resolver.key(), resolver);
    }

    pub async fn resolver(&self, key: &ResolverKey) -> Option<DeployedResolver> {
        self.resolvers.read().await.get(key).cloned()
    }

    pub async fn snapshot(&self) -> ApiSnapshot {
        ApiSnapshot {
            data_sources: self.data_sources.read().await.values().cloned().collect(),
            resolvers: self.resolvers.read().await.values().cloned().collect(),
        }
    }

    /// Makes the next matching call fail with `error`.
    pub async fn fail_next(&self, on: FailOn, key: ResolverKey, error: ApiError) {
        self.failures.lock().await.insert((on, key), error);
    }

    /// Mutating calls received so far, in arrival order.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    /// Every call received so far, reads included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    async fn record(&self, call: ApiCall) {
        self.calls.lock().await.push(call);
    }

    async fn take_failure(&self, on: FailOn, key: &ResolverKey) -> Option<ApiError> {
        self.failures.lock().await.remove(&(on, key.clone()))
    }
}

#[async_trait]
impl AppSyncApi for InMemoryApi {
    async fn list_resolvers(
        &self,
        _api_id: &str,
        type_name: &str,
        next_token: Option<&str>,
    ) -> ApiResult<ResolverPage> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let offset = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ApiError::bad_request(format!("invalid next token `{token}`")))?,
            None => 0,
        };

        let resolvers = self.resolvers.read().await;
        let matching: Vec<_> = resolvers
            .values()
            .filter(|resolver| resolver.type_name == type_name)
            .collect();
        let page: Vec<_> = matching
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(|resolver| (*resolver).clone())
            .collect();
        let end = offset + page.len();

        Ok(ResolverPage {
            resolvers: page,
            next_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn get_data_source(&self, _api_id: &str, name: &str) -> ApiResult<DataSource> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.data_sources
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("data source {name}")))
    }

    async fn create_resolver(&self, request: &ResolverRequest) -> ApiResult<DeployedResolver> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let key = request.key();
        self.record(ApiCall::Create(request.clone())).await;
        if let Some(error) = self.take_failure(FailOn::Create, &key).await {
            return Err(error);
        }

        let mut resolvers = self.resolvers.write().await;
        if resolvers.contains_key(&key) {
            return Err(ApiError::bad_request(format!(
                "resolver {key} already exists"
            )));
        }
        let deployed = request.to_deployed();
        resolvers.insert(key, deployed.clone());
        Ok(deployed)
    }

    async fn update_resolver(&self, request: &ResolverRequest) -> ApiResult<DeployedResolver> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let key = request.key();
        self.record(ApiCall::Update(request.clone())).await;
        if let Some(error) = self.take_failure(FailOn::Update, &key).await {
            return Err(error);
        }

        let mut resolvers = self.resolvers.write().await;
        match resolvers.get_mut(&key) {
            Some(existing) => {
                *existing = request.to_deployed();
                Ok(existing.clone())
            }
            None => Err(ApiError::not_found(format!("resolver {key}"))),
        }
    }

    async fn delete_resolver(
        &self,
        api_id: &str,
        type_name: &str,
        field_name: &str,
    ) -> ApiResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let key = ResolverKey::new(type_name, field_name);
        self.record(ApiCall::Delete {
            api_id: api_id.to_string(),
            key: key.clone(),
        })
        .await;
        if let Some(error) = self.take_failure(FailOn::Delete, &key).await {
            return Err(error);
        }

        match self.resolvers.write().await.shift_remove(&key) {
            Some(_) => Ok(()),
            None => Err(ApiError::new(
                ApiErrorCode::NotFound,
                format!("resolver {key} not found"),
            )),
        }
    }
}
