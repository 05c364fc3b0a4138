//! Pagination helpers.

use crate::api::AppSyncApi;
use crate::error::ApiResult;
use gqlsync_core::DeployedResolver;
use tracing::debug;

/// Lists every resolver attached to `type_name`, following continuation
/// tokens until the API reports the last page.
pub async fn list_all_resolvers<A>(
    api: &A,
    api_id: &str,
    type_name: &str,
) -> ApiResult<Vec<DeployedResolver>>
where
    A: AppSyncApi + ?Sized,
{
    let mut resolvers = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api
            .list_resolvers(api_id, type_name, next_token.as_deref())
            .await?;
        pages += 1;
        resolvers.extend(page.resolvers);

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    debug!(
        api_id,
        type_name,
        pages,
        count = resolvers.len(),
        "listed deployed resolvers"
    );
    Ok(resolvers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryApi;
    use gqlsync_core::ResolverKind;

    fn resolver(type_name: &str, field_name: &str) -> DeployedResolver {
        DeployedResolver {
            type_name: type_name.into(),
            field_name: field_name.into(),
            data_source_name: Some("DS1".into()),
            request_mapping_template: None,
            response_mapping_template: None,
            kind: ResolverKind::Unit,
            pipeline_config: None,
            resolver_arn: None,
        }
    }

    #[tokio::test]
    async fn test_drains_every_page() {
        let api = InMemoryApi::new().with_page_size(2);
        for field in ["a", "b", "c", "d", "e"] {
            api.insert_resolver(resolver("Query", field)).await;
        }
        api.insert_resolver(resolver("Mutation", "f")).await;

        let listed = list_all_resolvers(&api, "api-1", "Query").await.unwrap();
        let fields: Vec<_> = listed.iter().map(|r| r.field_name.as_str()).collect();

        assert_eq!(fields, ["a", "b", "c", "d", "e"]);
        // three pages for five resolvers
        assert_eq!(api.request_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_type() {
        let api = InMemoryApi::new();
        let listed = list_all_resolvers(&api, "api-1", "Subscription").await.unwrap();
        assert!(listed.is_empty());
        assert_eq!(api.request_count(), 1);
    }
}
