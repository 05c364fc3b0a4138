//! Declared configuration and prior-run state.
//!
//! Both documents are JSON. Field aliases are accepted for the resolver
//! identity (`dataSourceName|dataSource`, `typeName|type`, `fieldName|field`),
//! and `mappingTemplates` may be either a single object or a list. Everything
//! past this module sees a plain `Vec`.

use crate::error::{ConfigError, ConfigResult};
use crate::resolver::{ResolverKey, ResolverKind};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Names of the functions a pipeline resolver runs, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFunctions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
}

/// A declared resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingTemplate {
    #[serde(
        rename = "dataSource",
        alias = "dataSourceName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data_source: Option<String>,
    #[serde(rename = "type", alias = "typeName")]
    pub type_name: String,
    #[serde(rename = "field", alias = "fieldName")]
    pub field_name: String,
    /// Inline request template text, or a path to a template file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    /// Inline response template text, or a path to a template file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default)]
    pub kind: ResolverKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_config: Option<PipelineFunctions>,
}

impl MappingTemplate {
    /// Creates a unit resolver bound to a data source.
    pub fn unit(
        data_source: impl Into<String>,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            data_source: Some(data_source.into()),
            type_name: type_name.into(),
            field_name: field_name.into(),
            request: None,
            response: None,
            kind: ResolverKind::Unit,
            pipeline_config: None,
        }
    }

    /// Creates a pipeline resolver running the named functions.
    pub fn pipeline<I, S>(
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        functions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data_source: None,
            type_name: type_name.into(),
            field_name: field_name.into(),
            request: None,
            response: None,
            kind: ResolverKind::Pipeline,
            pipeline_config: Some(PipelineFunctions {
                functions: functions.into_iter().map(Into::into).collect(),
            }),
        }
    }

    /// Sets the request template (inline text or file path).
    #[must_use]
    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = Some(request.into());
        self
    }

    /// Sets the response template (inline text or file path).
    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    pub fn key(&self) -> ResolverKey {
        ResolverKey::new(&self.type_name, &self.field_name)
    }
}

/// A remote pipeline function, referenced by name from mapping templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    pub name: String,
    pub function_id: String,
}

/// The declared desired state for one API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub api_id: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub mapping_templates: Vec<MappingTemplate>,
    #[serde(default)]
    pub functions: Vec<FunctionConfig>,
}

impl SyncConfig {
    pub fn new(api_id: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            mapping_templates: Vec::new(),
            functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn mapping_template(mut self, template: MappingTemplate) -> Self {
        self.mapping_templates.push(template);
        self
    }

    #[must_use]
    pub fn function(mut self, name: impl Into<String>, function_id: impl Into<String>) -> Self {
        self.functions.push(FunctionConfig {
            name: name.into(),
            function_id: function_id.into(),
        });
        self
    }

    /// Looks up a declared function id by name.
    pub fn function_id(&self, name: &str) -> Option<&str> {
        self.functions
            .iter()
            .find(|function| function.name == name)
            .map(|function| function.function_id.as_str())
    }

    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        serde_json::from_str(source).map_err(|source| ConfigError::Parse {
            origin: "<inline>".into(),
            source,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        read_json(path.as_ref())
    }
}

/// The resolvers deployed by the previous pass.
///
/// Only the (type, field) identity of each entry is read; the remaining fields
/// of a persisted [`SyncedResolver`](crate::SyncedResolver) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    #[serde(default, deserialize_with = "one_or_many")]
    pub mapping_templates: Vec<ResolverKey>,
}

impl SyncState {
    pub fn from_keys(keys: impl IntoIterator<Item = ResolverKey>) -> Self {
        Self {
            mapping_templates: keys.into_iter().collect(),
        }
    }

    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        serde_json::from_str(source).map_err(|source| ConfigError::Parse {
            origin: "<inline>".into(),
            source,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        read_json(path.as_ref())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
        origin: path.display().to_string(),
        source,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}
