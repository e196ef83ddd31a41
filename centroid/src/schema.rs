use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CentroidError, Result};

/// Describes the layout of the feature vectors an index serves.
///
/// Only active features take part in the vector; the declared
/// dimensionality is the number of active features. The schema is
/// read-only once built and is shared between indexes as `Arc<InputSchema>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct InputSchema {
    feature_names: Vec<String>,
    active: Vec<bool>,
    active_names: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct SchemaDef {
    feature_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    inactive: Vec<String>,
}

impl InputSchema {
    /// Creates a schema in which every named feature is active.
    pub fn new<S: Into<String>>(feature_names: impl IntoIterator<Item = S>) -> Result<Self> {
        Self::with_inactive(feature_names, std::iter::empty::<String>())
    }

    /// Creates a schema where the `inactive` features are present in the
    /// input but excluded from the vector.
    pub fn with_inactive<S, T>(
        feature_names: impl IntoIterator<Item = S>,
        inactive: impl IntoIterator<Item = T>,
    ) -> Result<Self>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let feature_names: Vec<String> = feature_names.into_iter().map(Into::into).collect();

        let mut seen = HashSet::with_capacity(feature_names.len());
        for name in &feature_names {
            if !seen.insert(name.as_str()) {
                return Err(CentroidError::InvalidArgument(format!(
                    "duplicate feature name {name:?}"
                )));
            }
        }

        let mut active = vec![true; feature_names.len()];
        for name in inactive {
            let name: String = name.into();
            match feature_names.iter().position(|f| *f == name) {
                Some(i) => active[i] = false,
                None => {
                    return Err(CentroidError::InvalidArgument(format!(
                        "inactive feature {name:?} is not a feature"
                    )));
                }
            }
        }

        let active_names: Vec<String> = feature_names
            .iter()
            .zip(&active)
            .filter(|(_, a)| **a)
            .map(|(n, _)| n.clone())
            .collect();
        if active_names.is_empty() {
            return Err(CentroidError::InvalidArgument(
                "schema has no active features".into(),
            ));
        }

        Ok(Self {
            feature_names,
            active,
            active_names,
        })
    }

    /// All feature names in input order, active or not.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Declared vector dimensionality (number of active features).
    pub fn dim(&self) -> usize {
        self.active_names.len()
    }

    pub fn active_feature_names(&self) -> &[String] {
        &self.active_names
    }

    /// Returns false for unknown names.
    pub fn is_active(&self, name: &str) -> bool {
        self.feature_names
            .iter()
            .position(|f| f == name)
            .is_some_and(|i| self.active[i])
    }

    /// Position of an active feature within the vector.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.active_names.iter().position(|f| f == name)
    }
}

impl TryFrom<SchemaDef> for InputSchema {
    type Error = CentroidError;

    fn try_from(def: SchemaDef) -> Result<Self> {
        Self::with_inactive(def.feature_names, def.inactive)
    }
}

impl From<InputSchema> for SchemaDef {
    fn from(schema: InputSchema) -> Self {
        let inactive = schema
            .feature_names
            .iter()
            .zip(&schema.active)
            .filter(|(_, a)| !**a)
            .map(|(n, _)| n.clone())
            .collect();
        SchemaDef {
            feature_names: schema.feature_names,
            inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_active() {
        let s = InputSchema::new(["x", "y", "z"]).unwrap();
        assert_eq!(s.dim(), 3);
        assert_eq!(s.num_features(), 3);
        assert_eq!(s.feature_index("y"), Some(1));
        assert!(s.is_active("z"));
    }

    #[test]
    fn inactive_features_excluded_from_vector() {
        let s = InputSchema::with_inactive(["id", "x", "y"], ["id"]).unwrap();
        assert_eq!(s.num_features(), 3);
        assert_eq!(s.dim(), 2);
        assert!(!s.is_active("id"));
        assert_eq!(s.feature_index("id"), None);
        assert_eq!(s.feature_index("x"), Some(0));
        assert_eq!(s.active_feature_names(), ["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn unknown_name_is_not_active() {
        let s = InputSchema::new(["x"]).unwrap();
        assert!(!s.is_active("nope"));
    }

    #[test]
    fn rejects_duplicates() {
        let err = InputSchema::new(["x", "x"]).unwrap_err();
        assert!(matches!(err, CentroidError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_unknown_inactive() {
        let err = InputSchema::with_inactive(["x"], ["y"]).unwrap_err();
        assert!(matches!(err, CentroidError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_no_active_features() {
        assert!(InputSchema::new(Vec::<String>::new()).is_err());
        assert!(InputSchema::with_inactive(["x"], ["x"]).is_err());
    }

    #[test]
    fn json_roundtrip_keeps_inactive() {
        let s: InputSchema =
            serde_json::from_str(r#"{"feature_names":["id","a","b"],"inactive":["id"]}"#).unwrap();
        assert_eq!(s.dim(), 2);

        let json = serde_json::to_string(&s).unwrap();
        let back: InputSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn json_rejects_invalid_schema() {
        let res: std::result::Result<InputSchema, _> =
            serde_json::from_str(r#"{"feature_names":["a","a"]}"#);
        assert!(res.is_err());
    }
}
