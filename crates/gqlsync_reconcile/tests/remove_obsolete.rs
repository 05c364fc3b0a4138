//! Integration tests for obsolete resolver removal.

use gqlsync_client::{ApiCall, ApiError, ApiErrorCode, FailOn, InMemoryApi};
use gqlsync_core::{
    DeployedResolver, MappingTemplate, ResolverKey, ResolverKind, SyncConfig, SyncState,
};
use gqlsync_reconcile::{ObsoleteResolverRemover, SyncError};
use std::sync::Arc;

fn deployed(type_name: &str, field_name: &str) -> DeployedResolver {
    DeployedResolver {
        type_name: type_name.into(),
        field_name: field_name.into(),
        data_source_name: Some("DS1".into()),
        request_mapping_template: Some("req".into()),
        response_mapping_template: Some("res".into()),
        kind: ResolverKind::Unit,
        pipeline_config: None,
        resolver_arn: None,
    }
}

fn deletes(calls: &[ApiCall]) -> Vec<ResolverKey> {
    calls
        .iter()
        .filter_map(|call| match call {
            ApiCall::Delete { key, .. } => Some(key.clone()),
            _ => None,
        })
        .collect()
}

fn config() -> SyncConfig {
    SyncConfig::new("api-1").mapping_template(MappingTemplate::unit("DS1", "Query", "getItem"))
}

/// A resolver dropped from the declaration is deleted exactly once.
#[tokio::test]
async fn test_deletes_undeclared_resolver() {
    let api = Arc::new(InMemoryApi::new());
    api.insert_resolver(deployed("Query", "getX")).await;
    api.insert_resolver(deployed("Query", "getItem")).await;

    let state = SyncState::from_json_str(
        r#"{ "mappingTemplates": [
            { "type": "Query", "field": "getX" },
            { "type": "Query", "field": "getItem" }
        ] }"#,
    )
    .unwrap();

    ObsoleteResolverRemover::new(api.clone())
        .remove_obsolete(&config(), &state)
        .await
        .unwrap();

    let calls = api.calls().await;
    assert_eq!(deletes(&calls), vec![ResolverKey::new("Query", "getX")]);
    assert!(api.resolver(&ResolverKey::new("Query", "getX")).await.is_none());
    assert!(api
        .resolver(&ResolverKey::new("Query", "getItem"))
        .await
        .is_some());
}

/// Deleting a resolver that is already gone is not an error.
#[tokio::test]
async fn test_already_removed_resolver_is_tolerated() {
    let api = Arc::new(InMemoryApi::new());
    let state = SyncState::from_keys([ResolverKey::new("Query", "getX")]);

    ObsoleteResolverRemover::new(api.clone())
        .remove_obsolete(&config(), &state)
        .await
        .unwrap();

    assert_eq!(deletes(&api.calls().await).len(), 1);
}

/// Any other remote failure aborts the removal.
#[tokio::test]
async fn test_other_errors_propagate() {
    let api = Arc::new(InMemoryApi::new());
    api.insert_resolver(deployed("Query", "getX")).await;
    api.fail_next(
        FailOn::Delete,
        ResolverKey::new("Query", "getX"),
        ApiError::new(ApiErrorCode::Unauthorized, "access denied"),
    )
    .await;
    let state = SyncState::from_keys([ResolverKey::new("Query", "getX")]);

    let err = ObsoleteResolverRemover::new(api.clone())
        .remove_obsolete(&config(), &state)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Api(ApiError { code: ApiErrorCode::Unauthorized, .. })
    ));
}

/// Nothing obsolete means no remote calls.
#[tokio::test]
async fn test_nothing_to_remove() {
    let api = Arc::new(InMemoryApi::new());
    let state = SyncState::from_keys([ResolverKey::new("Query", "getItem")]);

    ObsoleteResolverRemover::new(api.clone())
        .remove_obsolete(&config(), &state)
        .await
        .unwrap();

    assert_eq!(api.request_count(), 0);
}

/// Several obsolete resolvers across types are removed in one pass.
#[tokio::test]
async fn test_removes_across_types() {
    let api = Arc::new(InMemoryApi::new());
    api.insert_resolver(deployed("Query", "getX")).await;
    api.insert_resolver(deployed("Mutation", "putX")).await;
    let state = SyncState::from_keys([
        ResolverKey::new("Query", "getX"),
        ResolverKey::new("Mutation", "putX"),
    ]);

    ObsoleteResolverRemover::new(api.clone())
        .remove_obsolete(&config(), &state)
        .await
        .unwrap();

    let mut removed = deletes(&api.calls().await);
    removed.sort();
    assert_eq!(
        removed,
        vec![
            ResolverKey::new("Mutation", "putX"),
            ResolverKey::new("Query", "getX"),
        ]
    );
    assert!(api.snapshot().await.resolvers.is_empty());
}
