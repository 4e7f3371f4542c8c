//! Serialization of the ontology aggregate into RDF statements.
//!
//! Two renderings exist: N-Triples for the one-time upload into the store and
//! a compact Turtle view of the schema that is embedded into the query tool
//! description read by the model.

use std::fmt::Write as _;

use oxrdf::{
    vocab::{rdf, rdfs},
    Literal, NamedNode, NamedNodeRef, Term, Triple,
};

use super::{
    entities::{Individual, Ontology, PropertyAssertion, PropertyKind},
    vocabulary::{compact, PREFIXES},
};

const OWL_ONTOLOGY: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
const OWL_CLASS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
const OWL_OBJECT_PROPERTY: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
const OWL_DATATYPE_PROPERTY: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");

fn node(iri: &super::Iri) -> NamedNode {
    NamedNode::from(iri)
}

fn text(value: &str) -> Term {
    Literal::new_simple_literal(value).into()
}

/// Produces every statement describing the ontology and its individuals.
#[must_use]
pub fn ontology_triples(ontology: &Ontology) -> Vec<Triple> {
    let mut triples = Vec::new();
    let id = node(ontology.id());
    triples.push(Triple::new(
        id.clone(),
        rdf::TYPE.into_owned(),
        OWL_ONTOLOGY.into_owned(),
    ));
    if let Some(label) = ontology.label() {
        triples.push(Triple::new(id, rdfs::LABEL.into_owned(), text(label)));
    }

    for class in ontology.classes().values() {
        let subject = node(class.id());
        triples.push(Triple::new(
            subject.clone(),
            rdf::TYPE.into_owned(),
            OWL_CLASS.into_owned(),
        ));
        for parent in class.parents() {
            triples.push(Triple::new(
                subject.clone(),
                rdfs::SUB_CLASS_OF.into_owned(),
                node(parent),
            ));
        }
        if let Some(label) = class.label() {
            triples.push(Triple::new(
                subject.clone(),
                rdfs::LABEL.into_owned(),
                text(label),
            ));
        }
        if let Some(comment) = class.comment() {
            triples.push(Triple::new(subject, rdfs::COMMENT.into_owned(), text(comment)));
        }
    }

    for property in ontology.properties().values() {
        let subject = node(property.id());
        let kind = match property.kind() {
            PropertyKind::Object => OWL_OBJECT_PROPERTY,
            PropertyKind::Data => OWL_DATATYPE_PROPERTY,
        };
        triples.push(Triple::new(
            subject.clone(),
            rdf::TYPE.into_owned(),
            kind.into_owned(),
        ));
        for domain in property.domains() {
            triples.push(Triple::new(
                subject.clone(),
                rdfs::DOMAIN.into_owned(),
                node(domain),
            ));
        }
        for range in property.ranges() {
            triples.push(Triple::new(
                subject.clone(),
                rdfs::RANGE.into_owned(),
                node(range),
            ));
        }
        if let Some(comment) = property.comment() {
            triples.push(Triple::new(subject, rdfs::COMMENT.into_owned(), text(comment)));
        }
    }

    for individual in ontology.individuals().values() {
        triples.extend(individual_triples(individual));
    }
    triples
}

/// Produces the statements describing a single individual.
#[must_use]
pub fn individual_triples(individual: &Individual) -> Vec<Triple> {
    let subject = node(individual.id());
    let mut triples: Vec<Triple> = individual
        .types()
        .iter()
        .map(|class| Triple::new(subject.clone(), rdf::TYPE.into_owned(), node(class)))
        .collect();

    if let Some(label) = individual.label() {
        triples.push(Triple::new(
            subject.clone(),
            rdfs::LABEL.into_owned(),
            text(label),
        ));
    }
    if let Some(comment) = individual.comment() {
        triples.push(Triple::new(
            subject.clone(),
            rdfs::COMMENT.into_owned(),
            text(comment),
        ));
    }

    for (property, assertions) in individual.properties() {
        for assertion in assertions {
            let object: Term = match assertion {
                PropertyAssertion::Individual(target) => node(target).into(),
                PropertyAssertion::Literal(literal) => literal.clone().into(),
            };
            triples.push(Triple::new(subject.clone(), node(property), object));
        }
    }
    triples
}

/// Formats statements as an N-Triples document.
#[must_use]
pub fn to_ntriples(triples: &[Triple]) -> String {
    let mut out = String::new();
    for triple in triples {
        let _ = writeln!(out, "{triple} .");
    }
    out
}

/// Renders the classes and properties of the ontology as prefixed Turtle.
#[must_use]
pub fn schema_turtle(ontology: &Ontology) -> String {
    let mut out = String::new();
    for (prefix, namespace) in PREFIXES {
        let _ = writeln!(out, "@prefix {prefix}: <{namespace}> .");
    }

    out.push_str("\n# Classes\n\n");
    for class in ontology.classes().values() {
        let mut statement = format!("{} a owl:Class", compact(class.id().as_str()));
        for parent in class.parents() {
            let _ = write!(statement, " ; rdfs:subClassOf {}", compact(parent.as_str()));
        }
        if let Some(label) = class.label() {
            let _ = write!(statement, " ;\n    rdfs:label {}", text(label));
        }
        if let Some(comment) = class.comment() {
            let _ = write!(statement, " ;\n    rdfs:comment {}", text(comment));
        }
        let _ = writeln!(out, "{statement} .");
    }

    out.push_str("\n# Properties\n\n");
    for property in ontology.properties().values() {
        let kind = match property.kind() {
            PropertyKind::Object => "owl:ObjectProperty",
            PropertyKind::Data => "owl:DatatypeProperty",
        };
        let mut statement = format!("{} a {kind}", compact(property.id().as_str()));
        for domain in property.domains() {
            let _ = write!(statement, " ;\n    rdfs:domain {}", compact(domain.as_str()));
        }
        for range in property.ranges() {
            let _ = write!(statement, " ;\n    rdfs:range {}", compact(range.as_str()));
        }
        if let Some(comment) = property.comment() {
            let _ = write!(statement, " ;\n    rdfs:comment {}", text(comment));
        }
        let _ = writeln!(out, "{statement} .");
    }

    if !ontology.individuals().is_empty() {
        out.push_str("\n# Individuals\n\n");
        for individual in ontology.individuals().values() {
            let types = individual
                .types()
                .iter()
                .map(|class| compact(class.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "{} a {types} .", compact(individual.id().as_str()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use oxrdf::Literal;

    use super::*;
    use crate::ontology::{jaguar::jaguar_ontology, vocabulary, Iri};

    #[test]
    fn schema_turtle_declares_prefixes_and_hierarchy() {
        let ontology = jaguar_ontology().unwrap();
        let turtle = schema_turtle(&ontology);
        assert!(turtle.starts_with("@prefix ont: <http://example.org/ontology#> ."));
        assert!(turtle.contains(
            "ont:Jaguar a owl:Class ; rdfs:subClassOf ont:BigCat ;\n    rdfs:comment \"The Panthera onca species.\" ."
        ));
        assert!(turtle.contains("ont:wasKilled a owl:DatatypeProperty"));
        assert!(turtle.contains("rdfs:range xsd:boolean"));
        assert!(turtle.contains("ont:CarnivoreDiet a ont:DietType ."));
    }

    #[test]
    fn individual_triples_cover_types_labels_and_assertions() {
        let mut jaguar = Individual::new(Iri::new("http://example.org/resource#Sombra").unwrap())
            .with_label("Sombra");
        jaguar.assert_type(Iri::from(vocabulary::JAGUAR));
        jaguar.add_property_assertion(
            Iri::from(vocabulary::WAS_KILLED),
            PropertyAssertion::Literal(Literal::from(false)),
        );

        let triples = individual_triples(&jaguar);
        assert_eq!(triples.len(), 3);

        let document = to_ntriples(&triples);
        assert!(document.contains(
            "<http://example.org/resource#Sombra> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/ontology#Jaguar> .\n"
        ));
        assert!(document.contains(
            "<http://example.org/resource#Sombra> <http://example.org/ontology#wasKilled> \"false\"^^<http://www.w3.org/2001/XMLSchema#boolean> .\n"
        ));
    }

    #[test]
    fn ontology_triples_include_schema_and_individuals() {
        let ontology = jaguar_ontology().unwrap();
        let triples = ontology_triples(&ontology);
        let document = to_ntriples(&triples);
        assert!(document.contains(
            "<http://example.org/ontology#Jaguar> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://example.org/ontology#BigCat> ."
        ));
        assert!(document.contains(
            "<http://example.org/ontology#CarnivoreDiet> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/ontology#DietType> ."
        ));
    }
}
