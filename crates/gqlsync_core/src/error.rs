//! Configuration errors.
//!
//! Every variant is fatal for a reconciliation pass. They are raised before
//! (or instead of) the remote call they guard.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(
        "duplicate resolver: data source `{}`, type `{type_name}`, field `{field_name}` is declared more than once",
        .data_source.as_deref().unwrap_or("<none>")
    )]
    #[diagnostic(
        code(gqlsync::config::duplicate_resolver),
        help("each (dataSource, type, field) triple may appear only once in mappingTemplates")
    )]
    DuplicateResolver {
        data_source: Option<String>,
        type_name: String,
        field_name: String,
    },

    #[error("pipeline function `{function}` used by {type_name}.{field_name} is not declared in functions")]
    #[diagnostic(
        code(gqlsync::config::missing_function),
        help("add a `functions` entry with this name and its functionId")
    )]
    MissingFunction {
        function: String,
        type_name: String,
        field_name: String,
    },

    #[error("pipeline resolver {type_name}.{field_name} must not declare a dataSource")]
    #[diagnostic(
        code(gqlsync::config::pipeline_with_data_source),
        help("remove `dataSource` when converting a unit resolver into a pipeline resolver")
    )]
    PipelineWithDataSource {
        type_name: String,
        field_name: String,
    },

    #[error("unit resolver {type_name}.{field_name} has no dataSource")]
    #[diagnostic(
        code(gqlsync::config::missing_data_source),
        help("set `dataSource`, or use `kind: PIPELINE` with pipelineConfig.functions")
    )]
    MissingDataSource {
        type_name: String,
        field_name: String,
    },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(gqlsync::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    #[diagnostic(code(gqlsync::config::parse))]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn missing_function(
        function: impl Into<String>,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self::MissingFunction {
            function: function.into(),
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_the_triple() {
        let err = ConfigError::DuplicateResolver {
            data_source: Some("DS1".into()),
            type_name: "Query".into(),
            field_name: "getItem".into(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"duplicate resolver: data source `DS1`, type `Query`, field `getItem` is declared more than once"
        );
    }

    #[test]
    fn test_duplicate_message_without_data_source() {
        let err = ConfigError::DuplicateResolver {
            data_source: None,
            type_name: "Query".into(),
            field_name: "getItem".into(),
        };
        assert!(err.to_string().contains("`<none>`"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = ConfigError::PipelineWithDataSource {
            type_name: "Mutation".into(),
            field_name: "addItem".into(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(
            code.as_deref(),
            Some("gqlsync::config::pipeline_with_data_source")
        );
        assert!(err.help().is_some());
    }
}
