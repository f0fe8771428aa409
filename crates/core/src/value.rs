//! Metadata values
//!
//! Metadata is a property bag keyed by property URI. Every value is a
//! `{text, type}` pair where `type` is a datatype URI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Datatype URI for plain text values
pub const TEXT_TYPE: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Datatype URI for date values
pub const DATE_TYPE: &str = "https://tropy.org/v1/tropy#date";

/// Property URI used for titles
pub const TITLE: &str = "http://purl.org/dc/elements/1.1/title";

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataValue {
    /// Literal text
    pub text: String,
    /// Datatype URI
    #[serde(rename = "type")]
    pub kind: String,
}

impl MetadataValue {
    /// Create a value with an explicit datatype
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
        }
    }

    /// Create a plain text value
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, TEXT_TYPE)
    }
}

/// Metadata of one subject, keyed by property URI
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A set of property changes; `None` removes the property
pub type MetadataPatch = BTreeMap<String, Option<MetadataValue>>;

/// Apply a patch to a metadata bag, returning the inverse patch
///
/// The inverse patch restores the previous value of every touched property
/// (`None` for properties that did not exist before).
pub fn apply_patch(data: &mut Metadata, patch: &MetadataPatch) -> MetadataPatch {
    let mut inverse = MetadataPatch::new();
    for (property, value) in patch {
        let previous = match value {
            Some(v) => data.insert(property.clone(), v.clone()),
            None => data.remove(property),
        };
        inverse.insert(property.clone(), previous);
    }
    inverse
}

/// Validate a property URI
///
/// Property names must be non-empty, free of whitespace, and qualified
/// (contain a `:`).
pub fn validate_property(property: &str) -> Result<(), String> {
    if property.is_empty() {
        return Err("property name must not be empty".to_string());
    }
    if property.chars().any(char::is_whitespace) {
        return Err(format!("property name '{}' contains whitespace", property));
    }
    if !property.contains(':') {
        return Err(format!("property name '{}' is not a URI", property));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_serializes_type_field() {
        let v = MetadataValue::text("Letter");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["text"], "Letter");
        assert_eq!(json["type"], TEXT_TYPE);
    }

    #[test]
    fn test_apply_patch_returns_inverse() {
        let mut data = Metadata::new();
        data.insert(TITLE.to_string(), MetadataValue::text("Old"));

        let mut patch = MetadataPatch::new();
        patch.insert(TITLE.to_string(), Some(MetadataValue::text("New")));
        patch.insert("dc:date".to_string(), Some(MetadataValue::text("1901")));

        let inverse = apply_patch(&mut data, &patch);
        assert_eq!(data[TITLE].text, "New");
        assert_eq!(inverse[TITLE], Some(MetadataValue::text("Old")));
        assert_eq!(inverse["dc:date"], None);

        apply_patch(&mut data, &inverse);
        assert_eq!(data.len(), 1);
        assert_eq!(data[TITLE].text, "Old");
    }

    proptest::proptest! {
        #[test]
        fn prop_inverse_patch_restores_original(
            base in proptest::collection::btree_map("dc:[a-d]", "[a-z]{0,4}", 0..4),
            changes in proptest::collection::btree_map(
                "dc:[a-f]",
                proptest::option::of("[a-z]{0,4}"),
                0..5,
            ),
        ) {
            let original: Metadata = base
                .into_iter()
                .map(|(k, v)| (k, MetadataValue::text(v)))
                .collect();
            let patch: MetadataPatch = changes
                .into_iter()
                .map(|(k, v)| (k, v.map(MetadataValue::text)))
                .collect();

            let mut data = original.clone();
            let inverse = apply_patch(&mut data, &patch);
            apply_patch(&mut data, &inverse);
            proptest::prop_assert_eq!(data, original);
        }
    }

    #[test]
    fn test_validate_property() {
        assert!(validate_property(TITLE).is_ok());
        assert!(validate_property("dc:title").is_ok());
        assert!(validate_property("").is_err());
        assert!(validate_property("title").is_err());
        assert!(validate_property("dc: title").is_err());
    }
}
