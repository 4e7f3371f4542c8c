use std::collections::{BTreeMap, BTreeSet};

use oxrdf::Literal;
use thiserror::Error;

use super::value_objects::{Iri, IriError};

/// Ontology class definition capturing parent relationships and metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    id: Iri,
    label: Option<String>,
    comment: Option<String>,
    super_classes: BTreeSet<Iri>,
}

impl Class {
    /// Creates a new [`Class`] with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            label: None,
            comment: None,
            super_classes: BTreeSet::new(),
        }
    }

    /// Sets a human friendly label for the class.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets a textual description for the class.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a new parent class relation.
    pub fn add_parent(&mut self, parent: Iri) -> bool {
        self.super_classes.insert(parent)
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the parent classes in lexical order.
    #[must_use]
    pub fn parents(&self) -> &BTreeSet<Iri> {
        &self.super_classes
    }
}

/// Ontology property definition supporting object and data properties.
///
/// Object property ranges reference classes of the ontology, data property
/// ranges reference XSD datatypes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    id: Iri,
    comment: Option<String>,
    kind: PropertyKind,
    domains: BTreeSet<Iri>,
    ranges: BTreeSet<Iri>,
}

impl Property {
    /// Creates a new property with the provided identifier and kind.
    #[must_use]
    pub fn new(id: Iri, kind: PropertyKind) -> Self {
        Self {
            id,
            comment: None,
            kind,
            domains: BTreeSet::new(),
            ranges: BTreeSet::new(),
        }
    }

    /// Sets a textual description for the property.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Declares that the property applies to the supplied domain class.
    pub fn add_domain(&mut self, class: Iri) -> bool {
        self.domains.insert(class)
    }

    /// Declares the class or datatype of the property values.
    pub fn add_range(&mut self, range: Iri) -> bool {
        self.ranges.insert(range)
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    #[must_use]
    pub fn domains(&self) -> &BTreeSet<Iri> {
        &self.domains
    }

    #[must_use]
    pub fn ranges(&self) -> &BTreeSet<Iri> {
        &self.ranges
    }
}

/// Classifies the type of values a property can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// Object properties link individuals.
    Object,
    /// Data properties capture literal values.
    Data,
}

/// Property assertions attached to individuals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyAssertion {
    /// Object properties target another individual.
    Individual(Iri),
    /// Data properties store typed literal values.
    Literal(Literal),
}

/// An ontology individual containing class memberships and property assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Individual {
    id: Iri,
    label: Option<String>,
    comment: Option<String>,
    types: BTreeSet<Iri>,
    properties: BTreeMap<Iri, Vec<PropertyAssertion>>,
}

impl Individual {
    /// Creates a new individual with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            label: None,
            comment: None,
            types: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Sets the `rdfs:label` of the individual.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the `rdfs:comment` of the individual.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Declares that the individual is an instance of the given class.
    pub fn assert_type(&mut self, class: Iri) -> bool {
        self.types.insert(class)
    }

    /// Associates the individual with a property assertion.
    ///
    /// Repeated assertions are ignored so that exploded source rows collapse
    /// into a single statement, as they would in an RDF graph.
    pub fn add_property_assertion(&mut self, property: Iri, assertion: PropertyAssertion) {
        let values = self.properties.entry(property).or_default();
        if !values.contains(&assertion) {
            values.push(assertion);
        }
    }

    /// Folds another description of the same individual into this one.
    fn absorb(&mut self, other: Individual) {
        if self.label.is_none() {
            self.label = other.label;
        }
        if self.comment.is_none() {
            self.comment = other.comment;
        }
        self.types.extend(other.types);
        for (property, assertions) in other.properties {
            for assertion in assertions {
                self.add_property_assertion(property.clone(), assertion);
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn types(&self) -> &BTreeSet<Iri> {
        &self.types
    }

    #[must_use]
    pub fn properties(&self) -> &BTreeMap<Iri, Vec<PropertyAssertion>> {
        &self.properties
    }
}

/// Aggregates ontology classes, properties and individuals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ontology {
    id: Iri,
    label: Option<String>,
    classes: BTreeMap<Iri, Class>,
    properties: BTreeMap<Iri, Property>,
    individuals: BTreeMap<Iri, Individual>,
}

impl Ontology {
    /// Creates a new ontology aggregate with the supplied identifier.
    #[must_use]
    pub fn new(id: Iri) -> Self {
        Self {
            id,
            label: None,
            classes: BTreeMap::new(),
            properties: BTreeMap::new(),
            individuals: BTreeMap::new(),
        }
    }

    /// Sets a human readable label for the ontology.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a class to the ontology, enforcing unique identifiers.
    pub fn add_class(&mut self, class: Class) -> Result<(), OntologyError> {
        let id = class.id().clone();
        if self.classes.contains_key(&id) {
            return Err(OntologyError::DuplicateClass(id));
        }
        self.classes.insert(id, class);
        Ok(())
    }

    /// Adds a property to the ontology, validating references to known classes.
    pub fn add_property(&mut self, property: Property) -> Result<(), OntologyError> {
        let id = property.id().clone();
        if self.properties.contains_key(&id) {
            return Err(OntologyError::DuplicateProperty(id));
        }

        for class in property.domains() {
            self.require_class(class)?;
        }
        if property.kind() == PropertyKind::Object {
            for class in property.ranges() {
                self.require_class(class)?;
            }
        }

        self.properties.insert(id, property);
        Ok(())
    }

    /// Adds an individual ensuring it references known classes and properties.
    pub fn add_individual(&mut self, individual: Individual) -> Result<(), OntologyError> {
        let id = individual.id().clone();
        if self.individuals.contains_key(&id) {
            return Err(OntologyError::DuplicateIndividual(id));
        }
        self.validate_individual(&individual)?;
        self.individuals.insert(id, individual);
        Ok(())
    }

    /// Adds an individual or merges it into an existing one with the same IRI.
    pub fn merge_individual(&mut self, individual: Individual) -> Result<(), OntologyError> {
        self.validate_individual(&individual)?;
        match self.individuals.get_mut(individual.id()) {
            Some(existing) => existing.absorb(individual),
            None => {
                self.individuals.insert(individual.id().clone(), individual);
            }
        }
        Ok(())
    }

    fn require_class(&self, class: &Iri) -> Result<(), OntologyError> {
        if self.classes.contains_key(class) {
            Ok(())
        } else {
            Err(OntologyError::MissingClass {
                ontology: self.id.clone(),
                class: class.clone(),
            })
        }
    }

    fn validate_individual(&self, individual: &Individual) -> Result<(), OntologyError> {
        for class in individual.types() {
            self.require_class(class)?;
        }

        for (property_id, assertions) in individual.properties() {
            let Some(property) = self.properties.get(property_id) else {
                return Err(OntologyError::MissingProperty {
                    ontology: self.id.clone(),
                    property: property_id.clone(),
                });
            };

            for assertion in assertions {
                match (property.kind(), assertion) {
                    (PropertyKind::Object, PropertyAssertion::Individual(_))
                    | (PropertyKind::Data, PropertyAssertion::Literal(_)) => {}
                    _ => {
                        return Err(OntologyError::InvalidPropertyAssertion {
                            ontology: self.id.clone(),
                            property: property_id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn class(&self, id: &Iri) -> Option<&Class> {
        self.classes.get(id)
    }

    #[must_use]
    pub fn property(&self, id: &Iri) -> Option<&Property> {
        self.properties.get(id)
    }

    #[must_use]
    pub fn individual(&self, id: &Iri) -> Option<&Individual> {
        self.individuals.get(id)
    }

    /// Returns all classes ordered by identifier.
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<Iri, Class> {
        &self.classes
    }

    /// Returns all properties ordered by identifier.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<Iri, Property> {
        &self.properties
    }

    /// Returns all individuals ordered by identifier.
    #[must_use]
    pub fn individuals(&self) -> &BTreeMap<Iri, Individual> {
        &self.individuals
    }

    /// Counts the individuals declared as instances of `class`.
    #[must_use]
    pub fn count_instances(&self, class: &Iri) -> usize {
        self.individuals
            .values()
            .filter(|individual| individual.types().contains(class))
            .count()
    }
}

/// Errors raised when manipulating an ontology aggregate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OntologyError {
    /// Attempted to add a class with an existing identifier.
    #[error("class `{0}` already exists")]
    DuplicateClass(Iri),
    /// Attempted to add a property with an existing identifier.
    #[error("property `{0}` already exists")]
    DuplicateProperty(Iri),
    /// Attempted to add an individual with an existing identifier.
    #[error("individual `{0}` already exists")]
    DuplicateIndividual(Iri),
    /// Referenced class was not part of the ontology.
    #[error("class `{class}` does not exist in ontology `{ontology}`")]
    MissingClass { ontology: Iri, class: Iri },
    /// Referenced property was not part of the ontology.
    #[error("property `{property}` does not exist in ontology `{ontology}`")]
    MissingProperty { ontology: Iri, property: Iri },
    /// Property assertion type did not match the property definition.
    #[error("property assertion does not match property `{property}` in ontology `{ontology}`")]
    InvalidPropertyAssertion { ontology: Iri, property: Iri },
    /// A term could not be turned into a valid IRI.
    #[error(transparent)]
    Iri(#[from] IriError),
}

#[cfg(test)]
mod tests {
    use oxrdf::Literal;

    use super::{Class, Individual, Ontology, OntologyError, Property, PropertyAssertion, PropertyKind};
    use crate::ontology::value_objects::Iri;

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    fn ontology_with_jaguar_class() -> Ontology {
        let mut ontology = Ontology::new(iri("http://example.org/ontology"));
        ontology
            .add_class(Class::new(iri("http://example.org/ontology#Jaguar")))
            .expect("class inserted");
        ontology
    }

    #[test]
    fn class_parents_are_tracked() {
        let mut class = Class::new(iri("http://example.org/ontology#Jaguar"))
            .with_label("Jaguar")
            .with_comment("The Panthera onca species.");
        assert_eq!(class.label(), Some("Jaguar"));
        assert_eq!(class.comment(), Some("The Panthera onca species."));
        assert!(class.add_parent(iri("http://example.org/ontology#BigCat")));
        assert!(!class.add_parent(iri("http://example.org/ontology#BigCat")));
        assert_eq!(class.parents().len(), 1);
    }

    #[test]
    fn data_property_ranges_are_datatypes() {
        let mut ontology = ontology_with_jaguar_class();
        let mut property = Property::new(
            iri("http://example.org/ontology#wasKilled"),
            PropertyKind::Data,
        );
        property.add_domain(iri("http://example.org/ontology#Jaguar"));
        property.add_range(iri("http://www.w3.org/2001/XMLSchema#boolean"));
        ontology.add_property(property).expect("datatype range accepted");
    }

    #[test]
    fn object_property_insertion_rejects_unknown_classes() {
        let mut ontology = ontology_with_jaguar_class();
        let mut property = Property::new(
            iri("http://example.org/ontology#rescuedBy"),
            PropertyKind::Object,
        );
        property.add_domain(iri("http://example.org/ontology#Jaguar"));
        property.add_range(iri("http://example.org/ontology#ConservationOrganization"));
        let err = ontology.add_property(property).expect_err("missing class");
        assert!(matches!(err, OntologyError::MissingClass { .. }));
    }

    #[test]
    fn individual_insertion_rejects_mismatched_property_kind() {
        let mut ontology = ontology_with_jaguar_class();
        let mut property = Property::new(
            iri("http://example.org/ontology#hasGender"),
            PropertyKind::Data,
        );
        property.add_domain(iri("http://example.org/ontology#Jaguar"));
        ontology.add_property(property).expect("property inserted");

        let mut individual = Individual::new(iri("http://example.org/resource#El_Jefe"));
        individual.assert_type(iri("http://example.org/ontology#Jaguar"));
        individual.add_property_assertion(
            iri("http://example.org/ontology#hasGender"),
            PropertyAssertion::Individual(iri("http://example.org/resource#Male")),
        );

        let err = ontology
            .add_individual(individual)
            .expect_err("mismatched property kind");
        assert!(matches!(err, OntologyError::InvalidPropertyAssertion { .. }));
    }

    #[test]
    fn merging_individuals_unions_assertions() {
        let mut ontology = ontology_with_jaguar_class();
        let mut property = Property::new(
            iri("http://example.org/ontology#hasGender"),
            PropertyKind::Data,
        );
        property.add_domain(iri("http://example.org/ontology#Jaguar"));
        ontology.add_property(property).expect("property inserted");

        let gender = iri("http://example.org/ontology#hasGender");
        for _ in 0..3 {
            let mut row = Individual::new(iri("http://example.org/resource#Sombra"))
                .with_label("Sombra");
            row.assert_type(iri("http://example.org/ontology#Jaguar"));
            row.add_property_assertion(
                gender.clone(),
                PropertyAssertion::Literal(Literal::new_simple_literal("Male")),
            );
            ontology.merge_individual(row).expect("merge");
        }

        let merged = ontology
            .individual(&iri("http://example.org/resource#Sombra"))
            .expect("individual");
        assert_eq!(merged.properties()[&gender].len(), 1);
        assert_eq!(
            ontology.count_instances(&iri("http://example.org/ontology#Jaguar")),
            1
        );
    }

    #[test]
    fn duplicate_individuals_are_rejected_by_strict_insert() {
        let mut ontology = ontology_with_jaguar_class();
        let jaguar = Individual::new(iri("http://example.org/resource#Macho_B"));
        ontology.add_individual(jaguar.clone()).expect("first insert");
        let err = ontology.add_individual(jaguar).expect_err("duplicate");
        assert!(matches!(err, OntologyError::DuplicateIndividual(_)));
    }
}
