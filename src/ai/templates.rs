//! Parameterised SPARQL queries over the jaguar vocabulary.
//!
//! The templates double as worked examples in the query tool description and
//! back the `query --template` command.

use std::{collections::BTreeMap, fmt, str::FromStr};

use oxrdf::Literal;
use tera::{Context, Tera};
use thiserror::Error;

use crate::{
    mapping::resource_iri,
    ontology::{
        vocabulary::{compact, ONTOLOGY_NS, PREFIXES},
        Iri, IriError,
    },
};

const FIND_BY_NAME: &str = "\
{{ prefixes }}
SELECT ?jaguar ?label WHERE {
  BIND({{ jaguar }} AS ?jaguar)
  OPTIONAL { ?jaguar rdfs:label ?label . }
}";

const PROPERTIES_OF: &str = "\
{{ prefixes }}
SELECT ?jaguar ?p ?o WHERE {
  BIND({{ jaguar }} AS ?jaguar)
  OPTIONAL { ?jaguar ?p ?o . }
}";

const BY_GENDER: &str = "\
{{ prefixes }}
SELECT ?jaguar ?label ?gender WHERE {
  ?jaguar a ont:Jaguar .
  OPTIONAL { ?jaguar rdfs:label ?label . }
  OPTIONAL { ?jaguar ont:hasGender ?gender . }
{%- if gender is defined %}
  FILTER(?gender = {{ gender }})
{%- endif %}
}";

const KILLED: &str = "\
{{ prefixes }}
SELECT ?jaguar ?label ?causeOfDeath WHERE {
  ?jaguar a ont:Jaguar .
  ?jaguar ont:wasKilled true .
  OPTIONAL { ?jaguar rdfs:label ?label . }
  OPTIONAL { ?jaguar ont:causeOfDeath ?causeOfDeath . }
}";

const COUNT_CLASS: &str = "\
{{ prefixes }}
SELECT (COUNT(?individual) AS ?count) WHERE {
  ?individual a {{ class }} .
}";

/// Named query templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryTemplate {
    FindByName,
    PropertiesOf,
    ByGender,
    Killed,
    CountClass,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown query template `{0}`")]
    Unknown(String),
    #[error("template `{template}` requires the `{argument}` argument")]
    MissingArgument {
        template: QueryTemplate,
        argument: &'static str,
    },
    #[error("template `{template}` does not accept the `{argument}` argument")]
    UnexpectedArgument {
        template: QueryTemplate,
        argument: String,
    },
    #[error(transparent)]
    Iri(#[from] IriError),
    #[error(transparent)]
    Render(#[from] tera::Error),
}

impl QueryTemplate {
    pub const ALL: [Self; 5] = [
        Self::FindByName,
        Self::PropertiesOf,
        Self::ByGender,
        Self::Killed,
        Self::CountClass,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FindByName => "find_by_name",
            Self::PropertiesOf => "properties_of",
            Self::ByGender => "by_gender",
            Self::Killed => "killed",
            Self::CountClass => "count_class",
        }
    }

    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            Self::FindByName => "Find a jaguar by name",
            Self::PropertiesOf => "Find all properties about a jaguar",
            Self::ByGender => "List jaguars with their gender",
            Self::Killed => "Find killed jaguars",
            Self::CountClass => "Count the individuals of a class",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::FindByName => FIND_BY_NAME,
            Self::PropertiesOf => PROPERTIES_OF,
            Self::ByGender => BY_GENDER,
            Self::Killed => KILLED,
            Self::CountClass => COUNT_CLASS,
        }
    }

    /// `(argument, required)`
    #[must_use]
    pub fn arguments(self) -> &'static [(&'static str, bool)] {
        match self {
            Self::FindByName | Self::PropertiesOf => &[("name", true)],
            Self::ByGender => &[("gender", false)],
            Self::Killed => &[],
            Self::CountClass => &[("class", true)],
        }
    }

    fn example_arguments(self) -> BTreeMap<String, String> {
        let pairs: &[(&str, &str)] = match self {
            Self::FindByName | Self::PropertiesOf => &[("name", "El_Jefe")],
            Self::ByGender | Self::Killed => &[],
            Self::CountClass => &[("class", "Jaguar")],
        };
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    /// Renders the query with the supplied arguments.
    ///
    /// Names become resource IRIs the same way the import does, so
    /// `El Jefe` and `El_Jefe` address the same jaguar.
    pub fn render(self, arguments: &BTreeMap<String, String>) -> Result<String, TemplateError> {
        for argument in arguments.keys() {
            if !self.arguments().iter().any(|(name, _)| *name == argument.as_str()) {
                return Err(TemplateError::UnexpectedArgument {
                    template: self,
                    argument: argument.clone(),
                });
            }
        }
        let require = |argument: &'static str| {
            arguments
                .get(argument)
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| TemplateError::MissingArgument {
                    template: self,
                    argument,
                })
        };

        let mut context = Context::new();
        context.insert("prefixes", &prefix_block());
        match self {
            Self::FindByName | Self::PropertiesOf => {
                let jaguar = resource_iri(require("name")?)?;
                context.insert("jaguar", &compact(jaguar.as_str()));
            }
            Self::ByGender => {
                if let Some(gender) = arguments.get("gender").filter(|g| !g.trim().is_empty()) {
                    let literal = Literal::new_simple_literal(gender.trim()).to_string();
                    context.insert("gender", &literal);
                }
            }
            Self::Killed => {}
            Self::CountClass => {
                let class = Iri::in_namespace(ONTOLOGY_NS, require("class")?.trim())?;
                context.insert("class", &compact(class.as_str()));
            }
        }

        Ok(Tera::one_off(self.source(), &context, false)?)
    }

    /// Renders the template with sample arguments.
    pub fn example(self) -> Result<String, TemplateError> {
        self.render(&self.example_arguments())
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|template| template.name() == s)
            .ok_or_else(|| TemplateError::Unknown(s.to_string()))
    }
}

fn prefix_block() -> String {
    PREFIXES
        .iter()
        .filter(|(prefix, _)| *prefix != "owl")
        .map(|(prefix, namespace)| format!("PREFIX {prefix}: <{namespace}>"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn renders_find_by_name_with_resource_iri() {
        let query = QueryTemplate::FindByName
            .render(&args(&[("name", "El Jefe")]))
            .unwrap();
        insta::assert_snapshot!(query, @r"
        PREFIX ont: <http://example.org/ontology#>
        PREFIX : <http://example.org/resource#>
        PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
        PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
        SELECT ?jaguar ?label WHERE {
          BIND(:El_Jefe AS ?jaguar)
          OPTIONAL { ?jaguar rdfs:label ?label . }
        }
        ");
    }

    #[test]
    fn gender_filter_is_optional_and_escaped() {
        let all = QueryTemplate::ByGender.render(&BTreeMap::new()).unwrap();
        assert!(!all.contains("FILTER"));
        let filtered = QueryTemplate::ByGender
            .render(&args(&[("gender", "Fe\"male")]))
            .unwrap();
        assert!(filtered.contains(r#"FILTER(?gender = "Fe\"male")"#));
    }

    #[test]
    fn count_class_uses_ontology_namespace() {
        let query = QueryTemplate::CountClass
            .render(&args(&[("class", "Jaguar")]))
            .unwrap();
        assert!(query.contains("?individual a ont:Jaguar ."));
    }

    #[rstest]
    #[case(QueryTemplate::FindByName, &[], "requires the `name` argument")]
    #[case(QueryTemplate::CountClass, &[("class", " ")], "requires the `class` argument")]
    #[case(QueryTemplate::Killed, &[("name", "x")], "does not accept the `name` argument")]
    #[case(QueryTemplate::CountClass, &[("class", "Big Cat")], "invalid IRI")]
    fn rejects_bad_arguments(
        #[case] template: QueryTemplate,
        #[case] pairs: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        let err = template.render(&args(pairs)).unwrap_err();
        assert!(err.to_string().contains(expected), "{err}");
    }

    #[test]
    fn every_template_has_a_renderable_example() {
        for template in QueryTemplate::ALL {
            let query = template.example().unwrap();
            assert!(query.starts_with("PREFIX ont:"), "{template}");
            assert_eq!(template.name().parse::<QueryTemplate>().unwrap(), template);
        }
        assert!("nope".parse::<QueryTemplate>().is_err());
    }
}
