//! Unit/pipeline target validation.

use crate::config::SyncConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::{ResolverKind, TemplatedResolver};

/// What a validated resolver is bound to on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverTarget {
    /// A unit resolver's data source name.
    DataSource(String),
    /// A pipeline resolver's function ids, in execution order.
    Pipeline(Vec<String>),
}

/// Checks that a resolver's binding is consistent with its kind and resolves
/// pipeline function names to ids declared in `config`.
pub fn validate_resolver(
    resolver: &TemplatedResolver,
    config: &SyncConfig,
) -> ConfigResult<ResolverTarget> {
    match resolver.kind {
        ResolverKind::Pipeline => {
            if resolver.data_source.is_some() {
                return Err(ConfigError::PipelineWithDataSource {
                    type_name: resolver.type_name.clone(),
                    field_name: resolver.field_name.clone(),
                });
            }
            let ids = resolver
                .pipeline_functions()
                .iter()
                .map(|name| {
                    config
                        .function_id(name)
                        .map(String::from)
                        .ok_or_else(|| {
                            ConfigError::missing_function(
                                name,
                                &resolver.type_name,
                                &resolver.field_name,
                            )
                        })
                })
                .collect::<ConfigResult<Vec<_>>>()?;
            Ok(ResolverTarget::Pipeline(ids))
        }
        ResolverKind::Unit => match &resolver.data_source {
            Some(name) => Ok(ResolverTarget::DataSource(name.clone())),
            None => Err(ConfigError::MissingDataSource {
                type_name: resolver.type_name.clone(),
                field_name: resolver.field_name.clone(),
            }),
        },
    }
}
