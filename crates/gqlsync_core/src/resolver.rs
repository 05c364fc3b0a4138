//! Resolver records.
//!
//! Three shapes of the same (type, field) binding flow through a pass:
//! - [`DeployedResolver`]: what the remote API currently holds
//! - [`TemplatedResolver`]: a declared mapping template with its request and
//!   response templates resolved to text
//! - [`SyncedResolver`]: a templated resolver annotated with its [`Mode`]

use crate::config::PipelineFunctions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolver kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverKind {
    /// Single data source invocation.
    #[default]
    Unit,
    /// Ordered sequence of pipeline functions.
    Pipeline,
}

impl ResolverKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "UNIT",
            Self::Pipeline => "PIPELINE",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a resolver within an API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolverKey {
    #[serde(rename = "type", alias = "typeName")]
    pub type_name: String,
    #[serde(rename = "field", alias = "fieldName")]
    pub field_name: String,
}

impl ResolverKey {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for ResolverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// Reconciliation action computed for a declared resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Create,
    Update,
    Ignore,
}

impl Mode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolver as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedResolver {
    #[serde(alias = "type")]
    pub type_name: String,
    #[serde(alias = "field")]
    pub field_name: String,
    #[serde(default, alias = "dataSource", skip_serializing_if = "Option::is_none")]
    pub data_source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_mapping_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mapping_template: Option<String>,
    #[serde(default)]
    pub kind: ResolverKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_config: Option<PipelineFunctions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver_arn: Option<String>,
}

impl DeployedResolver {
    pub fn key(&self) -> ResolverKey {
        ResolverKey::new(&self.type_name, &self.field_name)
    }
}

/// A declared resolver after template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatedResolver {
    #[serde(rename = "dataSource", default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "field")]
    pub field_name: String,
    #[serde(default)]
    pub request_mapping_template: Option<String>,
    #[serde(default)]
    pub response_mapping_template: Option<String>,
    #[serde(default)]
    pub kind: ResolverKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_config: Option<PipelineFunctions>,
}

impl TemplatedResolver {
    pub fn key(&self) -> ResolverKey {
        ResolverKey::new(&self.type_name, &self.field_name)
    }

    /// Pipeline function names in execution order, empty when none are
    /// declared.
    pub fn pipeline_functions(&self) -> &[String] {
        self.pipeline_config
            .as_ref()
            .map(|config| config.functions.as_slice())
            .unwrap_or_default()
    }

    /// Returns true if either template is still unresolved.
    pub fn is_missing_template(&self) -> bool {
        self.request_mapping_template.is_none() || self.response_mapping_template.is_none()
    }

    pub fn with_mode(self, mode: Mode) -> SyncedResolver {
        SyncedResolver {
            resolver: self,
            mode,
        }
    }
}

/// The final record of a pass, suitable for persisting as the next state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedResolver {
    #[serde(flatten)]
    pub resolver: TemplatedResolver,
    pub mode: Mode,
}

impl SyncedResolver {
    pub fn key(&self) -> ResolverKey {
        self.resolver.key()
    }
}

/// Resolver counts per mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub ignored: usize,
}

impl SyncSummary {
    pub fn from_results(results: &[SyncedResolver]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, resolver| {
                match resolver.mode {
                    Mode::Create => summary.created += 1,
                    Mode::Update => summary.updated += 1,
                    Mode::Ignore => summary.ignored += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.ignored
    }

    /// Returns true if the pass wrote nothing remotely.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged",
            self.created, self.updated, self.ignored
        )
    }
}
