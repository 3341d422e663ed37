// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Schema document loader

use crate::config::SessionConfig;
use crate::error::SchemaError;
use crate::schema::Schema;

/// Parse a JSON schema document using the default configuration
pub fn parse_schema(source: &str) -> Result<Schema, SchemaError> {
    parse_schema_with(source, &SessionConfig::default())
}

/// Parse a JSON schema document, checking its version against `config`
pub fn parse_schema_with(source: &str, config: &SessionConfig) -> Result<Schema, SchemaError> {
    let schema: Schema = serde_json::from_str(source)?;

    if schema.version != config.expected_version {
        if config.strict_version {
            return Err(SchemaError::UnsupportedVersion {
                found: schema.version,
                expected: config.expected_version.clone(),
            });
        }
        log::warn!(
            "schema version '{}' differs from expected '{}'",
            schema.version,
            config.expected_version
        );
    }

    log::debug!(
        "parsed schema v{} with {} template(s) and {} material(s)",
        schema.version,
        schema.children.len(),
        schema.materials.len()
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BuildNode;

    const MINIMAL: &str = r##"{
        "version": "3.1",
        "type": "parametric_scene",
        "children": [
            {"type": "parametric_template", "id": "cube", "template": [
                {"type": "box", "id": "body", "dimensions": [1, 1, 1]}
            ]}
        ],
        "materials": {"steel": {"color": "#C0C0C0", "metalness": 0.9}}
    }"##;

    #[test]
    fn test_parse_minimal_schema() {
        let schema = parse_schema(MINIMAL).unwrap();
        assert_eq!(schema.children.len(), 1);
        assert_eq!(schema.children[0].template.len(), 1);
        assert!(schema.materials.contains_key("steel"));
        assert!(schema.template("cube").is_some());
    }

    #[test]
    fn test_version_mismatch_warns_by_default() {
        let source = MINIMAL.replace("3.1", "2.0");
        assert!(parse_schema(&source).is_ok());
    }

    #[test]
    fn test_version_mismatch_rejected_when_strict() {
        let source = MINIMAL.replace("3.1", "2.0");
        let config = SessionConfig {
            strict_version: true,
            ..SessionConfig::default()
        };
        assert!(matches!(
            parse_schema_with(&source, &config),
            Err(SchemaError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_nested_maps_keep_declaration_order() {
        let schema = parse_schema(
            r#"{"version": "3.1", "children": [{"id": "outer", "template": [
                {"type": "parametric_template", "id": "inner",
                 "parameters": {"w": 2, "b": 1, "a": 0},
                 "expressions": {"zeta": "$w * 3", "alpha": "$zeta + 1"},
                 "constraints": {"fit": {"z": {"expression": "true"}, "a": {"expression": "true"}}}},
                {"type": "repeat", "id": "r", "count": 1,
                 "instance_parameters": {"zz": "index + 5", "aa": "$zz * 2"}}
            ]}]}"#,
        )
        .unwrap();

        let nodes = &schema.children[0].template;
        let BuildNode::Template(inner) = &nodes[0] else {
            panic!("expected a nested template");
        };
        assert_eq!(inner.parameters.keys().map(String::as_str).collect::<Vec<_>>(), ["w", "b", "a"]);
        assert_eq!(inner.expressions.keys().map(String::as_str).collect::<Vec<_>>(), ["zeta", "alpha"]);
        assert_eq!(inner.constraints["fit"].keys().map(String::as_str).collect::<Vec<_>>(), ["z", "a"]);

        let BuildNode::Repeat(repeat) = &nodes[1] else {
            panic!("expected a repeat");
        };
        assert_eq!(repeat.instance_parameters.keys().map(String::as_str).collect::<Vec<_>>(), ["zz", "aa"]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_schema("{\"children\": ["), Err(SchemaError::Json(_))));
    }
}
