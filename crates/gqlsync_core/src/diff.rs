//! Declared-vs-deployed diffing.

use crate::config::{MappingTemplate, SyncConfig, SyncState};
use crate::error::{ConfigError, ConfigResult};
use crate::resolver::{DeployedResolver, Mode, ResolverKey, TemplatedResolver};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

/// A resolver attribute that takes part in change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverField {
    DataSource,
    Type,
    Field,
    RequestMappingTemplate,
    ResponseMappingTemplate,
}

/// The attributes whose equality makes a resolver unchanged.
pub const COMPARED_FIELDS: [ResolverField; 5] = [
    ResolverField::DataSource,
    ResolverField::Type,
    ResolverField::Field,
    ResolverField::ResponseMappingTemplate,
    ResolverField::RequestMappingTemplate,
];

/// Field access by [`ResolverField`], shared by deployed and declared records.
pub trait ResolverFields {
    fn field(&self, field: ResolverField) -> Option<&str>;
}

impl ResolverFields for DeployedResolver {
    fn field(&self, field: ResolverField) -> Option<&str> {
        match field {
            ResolverField::DataSource => self.data_source_name.as_deref(),
            ResolverField::Type => Some(&self.type_name),
            ResolverField::Field => Some(&self.field_name),
            ResolverField::RequestMappingTemplate => self.request_mapping_template.as_deref(),
            ResolverField::ResponseMappingTemplate => self.response_mapping_template.as_deref(),
        }
    }
}

impl ResolverFields for TemplatedResolver {
    fn field(&self, field: ResolverField) -> Option<&str> {
        match field {
            ResolverField::DataSource => self.data_source.as_deref(),
            ResolverField::Type => Some(&self.type_name),
            ResolverField::Field => Some(&self.field_name),
            ResolverField::RequestMappingTemplate => self.request_mapping_template.as_deref(),
            ResolverField::ResponseMappingTemplate => self.response_mapping_template.as_deref(),
        }
    }
}

/// Returns true iff every listed field is equal on both sides.
pub fn equal_by_fields<A, B>(a: &A, b: &B, fields: &[ResolverField]) -> bool
where
    A: ResolverFields + ?Sized,
    B: ResolverFields + ?Sized,
{
    fields.iter().all(|&field| a.field(field) == b.field(field))
}

/// Fails on the first (dataSource, type, field) triple declared twice.
pub fn check_duplicates(templates: &[MappingTemplate]) -> ConfigResult<()> {
    let mut seen = FxHashSet::default();
    for template in templates {
        let triple = (
            template.data_source.as_deref(),
            template.type_name.as_str(),
            template.field_name.as_str(),
        );
        if !seen.insert(triple) {
            return Err(ConfigError::DuplicateResolver {
                data_source: template.data_source.clone(),
                type_name: template.type_name.clone(),
                field_name: template.field_name.clone(),
            });
        }
    }
    Ok(())
}

/// Deployed resolvers indexed by (type, field).
///
/// When the same key appears more than once the first occurrence wins.
#[derive(Debug, Default)]
pub struct DeployedIndex {
    resolvers: FxHashMap<ResolverKey, DeployedResolver>,
}

impl DeployedIndex {
    pub fn new(deployed: impl IntoIterator<Item = DeployedResolver>) -> Self {
        let mut resolvers = FxHashMap::default();
        for resolver in deployed {
            resolvers.entry(resolver.key()).or_insert(resolver);
        }
        Self { resolvers }
    }

    pub fn get(&self, key: &ResolverKey) -> Option<&DeployedResolver> {
        self.resolvers.get(key)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

/// Computes the reconciliation mode of a declared resolver.
pub fn classify(declared: &TemplatedResolver, deployed: &DeployedIndex) -> Mode {
    match deployed.get(&declared.key()) {
        None => Mode::Create,
        Some(current) if equal_by_fields(current, declared, &COMPARED_FIELDS) => Mode::Ignore,
        Some(_) => Mode::Update,
    }
}

/// Keys present in the prior state but no longer declared.
///
/// Order follows the state document; repeated keys are reported once.
pub fn obsolete_keys(config: &SyncConfig, state: &SyncState) -> Vec<ResolverKey> {
    let declared: FxHashSet<ResolverKey> = config
        .mapping_templates
        .iter()
        .map(MappingTemplate::key)
        .collect();

    state
        .mapping_templates
        .iter()
        .filter(|key| !declared.contains(*key))
        .cloned()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverKind;

    fn deployed(field: &str, request: &str, response: &str) -> DeployedResolver {
        DeployedResolver {
            type_name: "Query".into(),
            field_name: field.into(),
            data_source_name: Some("DS1".into()),
            request_mapping_template: Some(request.into()),
            response_mapping_template: Some(response.into()),
            kind: ResolverKind::Unit,
            pipeline_config: None,
            resolver_arn: None,
        }
    }

    fn declared(field: &str, request: &str, response: &str) -> TemplatedResolver {
        TemplatedResolver {
            data_source: Some("DS1".into()),
            type_name: "Query".into(),
            field_name: field.into(),
            request_mapping_template: Some(request.into()),
            response_mapping_template: Some(response.into()),
            kind: ResolverKind::Unit,
            pipeline_config: None,
        }
    }

    #[test]
    fn test_classify_create_when_not_deployed() {
        let index = DeployedIndex::new(vec![deployed("other", "req", "res")]);
        assert_eq!(classify(&declared("getItem", "req", "res"), &index), Mode::Create);
    }

    #[test]
    fn test_classify_ignore_when_identical() {
        let index = DeployedIndex::new(vec![deployed("getItem", "req", "res")]);
        assert_eq!(classify(&declared("getItem", "req", "res"), &index), Mode::Ignore);
    }

    #[test]
    fn test_classify_update_on_any_compared_difference() {
        let index = DeployedIndex::new(vec![deployed("getItem", "req", "res")]);

        assert_eq!(classify(&declared("getItem", "req2", "res"), &index), Mode::Update);
        assert_eq!(classify(&declared("getItem", "req", "res2"), &index), Mode::Update);

        let mut moved = declared("getItem", "req", "res");
        moved.data_source = Some("DS2".into());
        assert_eq!(classify(&moved, &index), Mode::Update);

        let mut untemplated = declared("getItem", "req", "res");
        untemplated.response_mapping_template = None;
        assert_eq!(classify(&untemplated, &index), Mode::Update);
    }

    #[test]
    fn test_classify_ignores_fields_outside_comparison() {
        let mut current = deployed("getItem", "req", "res");
        current.resolver_arn = Some("arn:1".into());
        let index = DeployedIndex::new(vec![current]);

        let mut pipeline = declared("getItem", "req", "res");
        pipeline.kind = ResolverKind::Pipeline;
        assert_eq!(classify(&pipeline, &index), Mode::Ignore);
    }

    #[test]
    fn test_equal_by_fields_uses_only_listed_fields() {
        let a = deployed("getItem", "req", "res");
        let b = declared("getItem", "other", "res");

        assert!(equal_by_fields(&a, &b, &[ResolverField::Type, ResolverField::Field]));
        assert!(!equal_by_fields(&a, &b, &COMPARED_FIELDS));
        assert!(equal_by_fields(&a, &b, &[]));
    }

    #[test]
    fn test_check_duplicates() {
        let unique = vec![
            MappingTemplate::unit("DS1", "Query", "getItem"),
            MappingTemplate::unit("DS2", "Query", "getItem"),
            MappingTemplate::unit("DS1", "Query", "listItems"),
        ];
        assert!(check_duplicates(&unique).is_ok());

        let mut duplicated = unique.clone();
        duplicated.push(MappingTemplate::unit("DS1", "Query", "getItem").with_request("other"));
        let err = check_duplicates(&duplicated).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateResolver { ref field_name, .. } if field_name == "getItem"
        ));
    }

    #[test]
    fn test_obsolete_keys() {
        let config = SyncConfig::new("api-1")
            .mapping_template(MappingTemplate::unit("DS1", "Query", "getItem"));
        let state = SyncState::from_keys([
            ResolverKey::new("Query", "getX"),
            ResolverKey::new("Query", "getItem"),
            ResolverKey::new("Mutation", "putX"),
            ResolverKey::new("Query", "getX"),
        ]);

        assert_eq!(
            obsolete_keys(&config, &state),
            vec![
                ResolverKey::new("Query", "getX"),
                ResolverKey::new("Mutation", "putX"),
            ]
        );
    }

    #[test]
    fn test_obsolete_keys_ignores_data_source() {
        let config = SyncConfig::new("api-1")
            .mapping_template(MappingTemplate::unit("DS2", "Query", "getX"));
        let state = SyncState::from_keys([ResolverKey::new("Query", "getX")]);

        assert!(obsolete_keys(&config, &state).is_empty());
    }
}
