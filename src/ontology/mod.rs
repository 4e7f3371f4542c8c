//! Core ontology domain primitives.
//!
//! The module defines value objects and the ontology aggregate describing the
//! jaguar conservation schema independently from the triple store. Rendering
//! into RDF lives in [`rdf`] and never touches the network.

pub mod entities;
pub mod jaguar;
pub mod rdf;
pub mod value_objects;
pub mod vocabulary;

pub use entities::{
    Class, Individual, Ontology, OntologyError, Property, PropertyAssertion, PropertyKind,
};
pub use jaguar::jaguar_ontology;
pub use value_objects::{Iri, IriError};
