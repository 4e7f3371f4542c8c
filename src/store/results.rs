//! SPARQL 1.1 query results in their JSON serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StoreError;

/// Media type requested from the store for query results.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Kind of RDF term carried by a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Uri,
    Literal,
    #[serde(rename = "typed-literal")]
    TypedLiteral,
    Bnode,
    Triple,
}

/// A single variable binding of a solution row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Binding {
    #[must_use]
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }
}

/// Variable name to binding; unbound variables are absent.
pub type Row = BTreeMap<String, Binding>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solutions {
    #[serde(default)]
    pub bindings: Vec<Row>,
}

/// Results of a `SELECT` or `ASK` query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub head: Head,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Solutions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl QueryResults {
    /// Builds tabular results.
    #[must_use]
    pub fn solutions(vars: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            head: Head {
                vars,
                link: Vec::new(),
            },
            results: Some(Solutions { bindings: rows }),
            boolean: None,
        }
    }

    /// Builds the result of an `ASK` query.
    #[must_use]
    pub fn ask(value: bool) -> Self {
        Self {
            head: Head::default(),
            results: None,
            boolean: Some(value),
        }
    }

    /// Parses a response body, rejecting documents that are neither tabular
    /// nor boolean.
    pub fn from_json(body: &str) -> Result<Self, StoreError> {
        let parsed: Self = serde_json::from_str(body).map_err(|err| StoreError::Decode {
            message: err.to_string(),
        })?;
        if parsed.results.is_none() && parsed.boolean.is_none() {
            return Err(StoreError::Decode {
                message: "response has neither `results` nor `boolean`".to_string(),
            });
        }
        Ok(parsed)
    }

    #[must_use]
    pub fn vars(&self) -> &[String] {
        &self.head.vars
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match &self.results {
            Some(solutions) => &solutions.bindings,
            None => &[],
        }
    }

    #[must_use]
    pub fn boolean(&self) -> Option<bool> {
        self.boolean
    }

    /// Number of solution rows; `ASK` results count as one.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.boolean.is_some() {
            1
        } else {
            self.rows().len()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_results() {
        let body = r#"{
            "head": {"vars": ["jaguar", "label"]},
            "results": {"bindings": [
                {
                    "jaguar": {"type": "uri", "value": "http://example.org/resource#El_Jefe"},
                    "label": {"type": "literal", "value": "El Jefe", "xml:lang": "en"}
                },
                {
                    "jaguar": {"type": "uri", "value": "http://example.org/resource#Sombra"}
                }
            ]}
        }"#;
        let results = QueryResults::from_json(body).unwrap();
        assert_eq!(results.vars(), ["jaguar", "label"]);
        assert_eq!(results.len(), 2);
        assert_eq!(results.rows()[0]["label"].lang.as_deref(), Some("en"));
        assert!(!results.rows()[1].contains_key("label"));
    }

    #[test]
    fn parses_ask_results() {
        let results = QueryResults::from_json(r#"{"head": {}, "boolean": true}"#).unwrap();
        assert_eq!(results.boolean(), Some(true));
        assert!(!results.is_empty());
    }

    #[test]
    fn empty_bindings_are_not_an_error() {
        let results =
            QueryResults::from_json(r#"{"head": {"vars": ["x"]}, "results": {"bindings": []}}"#)
                .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn rejects_documents_without_results() {
        let err = QueryResults::from_json(r#"{"head": {"vars": []}}"#).unwrap_err();
        assert_eq!(err.kind(), "decode");
        let err = QueryResults::from_json("<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn serializes_in_sparql_json_shape() {
        let mut row = Row::new();
        row.insert(
            "count".to_string(),
            Binding::typed("2", "http://www.w3.org/2001/XMLSchema#integer"),
        );
        let results = QueryResults::solutions(vec!["count".to_string()], vec![row]);
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            serde_json::json!({
                "head": {"vars": ["count"]},
                "results": {"bindings": [{
                    "count": {
                        "type": "literal",
                        "value": "2",
                        "datatype": "http://www.w3.org/2001/XMLSchema#integer"
                    }
                }]}
            })
        );
    }
}
