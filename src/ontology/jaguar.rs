//! The jaguar conservation ontology.
//!
//! Classes and properties are declared as tables and assembled into an
//! [`Ontology`] aggregate, which validates every reference on insertion.

use super::{
    entities::{Class, Individual, Ontology, OntologyError, Property, PropertyKind},
    value_objects::Iri,
    vocabulary::{ONTOLOGY_IRI, ONTOLOGY_NS},
};

/// `(class, parent, label, comment)`
type ClassRow = (
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    Option<&'static str>,
);

const CLASSES: &[ClassRow] = &[
    ("Animal", None, None, None),
    ("Mammal", Some("Animal"), None, None),
    ("BigCat", Some("Mammal"), None, None),
    ("Jaguar", Some("BigCat"), None, Some("The Panthera onca species.")),
    ("Prey", Some("Animal"), None, None),
    ("Livestock", Some("Prey"), None, None),
    ("Herbivore", Some("Prey"), None, None),
    ("Mesopredator", Some("Prey"), None, None),
    ("Fish", Some("Prey"), None, None),
    ("Reptile", Some("Prey"), None, None),
    ("JaguarPopulation", None, None, Some("A group or population of jaguars.")),
    ("Habitat", None, None, None),
    ("Forest", Some("Habitat"), None, None),
    ("Rainforest", Some("Forest"), None, None),
    ("Wetland", Some("Habitat"), None, None),
    ("Grassland", Some("Habitat"), None, None),
    ("Shrubland", Some("Habitat"), None, None),
    ("WaterBody", Some("Habitat"), None, None),
    ("Location", None, None, None),
    ("Country", Some("Location"), None, None),
    ("State", Some("Location"), None, None),
    ("Region", Some("Location"), None, None),
    ("MountainRange", Some("Location"), None, None),
    ("HabitatArea", Some("Location"), None, None),
    ("DietType", None, None, None),
    (
        "Observation",
        None,
        Some("Observation"),
        Some("An event recording the sighting of an animal."),
    ),
    (
        "Person",
        None,
        Some("Person"),
        Some("A human observer or researcher involved in recording animal sightings."),
    ),
    ("Researcher", Some("Person"), None, None),
    ("Rancher", Some("Person"), None, None),
    ("Conservationist", Some("Person"), None, None),
    ("IndigenousPerson", Some("Person"), None, None),
    ("Tourist", Some("Person"), None, None),
    ("LawEnforcement", Some("Person"), None, None),
    (
        "ConservationOrganization",
        None,
        Some("Conservation Organization"),
        Some("An organization involved in monitoring and protecting wildlife."),
    ),
    ("GovernmentAgency", Some("ConservationOrganization"), None, None),
    ("NGO", Some("ConservationOrganization"), None, None),
    ("AcademicInstitution", Some("ConservationOrganization"), None, None),
    ("Threat", None, None, None),
    ("AnthropogenicThreat", Some("Threat"), None, None),
    ("HabitatLoss", Some("AnthropogenicThreat"), None, None),
    ("HabitatFragmentation", Some("AnthropogenicThreat"), None, None),
    ("Poaching", Some("AnthropogenicThreat"), None, None),
    ("IllegalWildlifeTrade", Some("AnthropogenicThreat"), None, None),
    ("HumanWildlifeConflict", Some("AnthropogenicThreat"), None, None),
    ("BorderBarrier", Some("AnthropogenicThreat"), None, None),
    ("EnvironmentalThreat", Some("Threat"), None, None),
    ("ClimateChange", Some("EnvironmentalThreat"), None, None),
    ("Wildfire", Some("EnvironmentalThreat"), None, None),
    ("ConservationEffort", None, None, None),
    ("RecoveryPlan", Some("ConservationEffort"), None, None),
    ("WildlifeCorridor", Some("ConservationEffort"), None, None),
    ("RewildingProgram", Some("ConservationEffort"), None, None),
    ("CommunityEngagement", Some("ConservationEffort"), None, None),
    ("InternationalCooperation", Some("ConservationEffort"), None, None),
    ("MonitoringTechnique", None, None, None),
    ("CameraTrap", Some("MonitoringTechnique"), None, None),
    ("ScatDetection", Some("MonitoringTechnique"), None, None),
    ("GPSTracking", Some("MonitoringTechnique"), None, None),
    ("LegalFramework", None, None, None),
    ("Act", Some("LegalFramework"), None, None),
    ("Convention", Some("LegalFramework"), None, None),
    ("CulturalSignificance", None, None, None),
    ("EconomicBenefit", None, None, None),
    ("Event", None, None, Some("Specific events such as rescue, release or death.")),
];

/// `(property, kind, domain, range, comment)`; data property ranges name XSD datatypes.
type PropertyRow = (
    &'static str,
    PropertyKind,
    &'static str,
    &'static str,
    Option<&'static str>,
);

#[rustfmt::skip]
const PROPERTIES: &[PropertyRow] = &[
    ("hasObservation", PropertyKind::Object, "Animal", "Observation",
        Some("Links an animal to one of its observation events.")),
    ("observedDate", PropertyKind::Data, "Observation", "date",
        Some("The date on which the observation took place.")),
    ("observedBy", PropertyKind::Object, "Observation", "Person",
        Some("The person who recorded the observation.")),
    ("monitoredByOrg", PropertyKind::Object, "Animal", "ConservationOrganization",
        Some("Links an animal to the conservation organization that monitors it.")),
    ("monitoredByTechnique", PropertyKind::Object, "Jaguar", "MonitoringTechnique",
        Some("Indicates the technique used to monitor the jaguar.")),
    ("locatedInCountry", PropertyKind::Object, "State", "Country",
        Some("Specifies the country in which a state is located.")),
    ("locatedIn", PropertyKind::Object, "Habitat", "Location",
        Some("Specifies the state or administrative region in which a habitat is located.")),
    ("occursIn", PropertyKind::Object, "Animal", "Location",
        Some("Indicates a state where an animal has been observed or is known to occur.")),
    ("name", PropertyKind::Data, "Animal", "string", None),
    ("habitat", PropertyKind::Object, "Animal", "Habitat", None),
    ("hasDietType", PropertyKind::Object, "Animal", "DietType", None),
    ("hasLifespan", PropertyKind::Data, "Animal", "integer", Some("Lifespan in years.")),
    ("scientificName", PropertyKind::Data, "Animal", "string", None),
    ("hasGender", PropertyKind::Data, "Jaguar", "string",
        Some("Gender of the jaguar (e.g., Male, Female).")),
    ("hasIdentificationMark", PropertyKind::Data, "Jaguar", "string",
        Some("Unique spot pattern or other distinguishing mark.")),
    ("hasMonitoringStartDate", PropertyKind::Data, "Jaguar", "date",
        Some("Date when monitoring of the individual jaguar began.")),
    ("hasLastSightingDate", PropertyKind::Data, "Jaguar", "date",
        Some("Date of the last confirmed sighting of the individual jaguar.")),
    ("wasKilled", PropertyKind::Data, "Jaguar", "boolean",
        Some("Indicates if the jaguar was killed.")),
    ("causeOfDeath", PropertyKind::Data, "Jaguar", "string",
        Some("The cause of death for the jaguar.")),
    ("originatesFrom", PropertyKind::Object, "Jaguar", "Location",
        Some("Indicates the origin location of a dispersing jaguar.")),
    ("hasOffspring", PropertyKind::Object, "Jaguar", "Jaguar",
        Some("Links a jaguar to its offspring.")),
    ("isOrphaned", PropertyKind::Data, "Jaguar", "boolean",
        Some("Indicates if the jaguar was orphaned.")),
    ("isRehabilitated", PropertyKind::Data, "Jaguar", "boolean",
        Some("Indicates if the jaguar underwent rehabilitation.")),
    ("isReleased", PropertyKind::Data, "Jaguar", "boolean",
        Some("Indicates if the jaguar was released into the wild.")),
    ("rescuedBy", PropertyKind::Object, "Jaguar", "ConservationOrganization",
        Some("The organization that rescued the jaguar.")),
    ("reintroducedBy", PropertyKind::Object, "Jaguar", "ConservationOrganization",
        Some("The organization that reintroduced the jaguar.")),
    ("hasRescueDate", PropertyKind::Data, "Jaguar", "date",
        Some("Date of the jaguar's rescue.")),
    ("hasReleaseDate", PropertyKind::Data, "Jaguar", "date",
        Some("Date of the jaguar's release.")),
    ("facesThreat", PropertyKind::Object, "Jaguar", "Threat",
        Some("Indicates a threat faced by the jaguar.")),
    ("implementsEffort", PropertyKind::Object, "ConservationOrganization", "ConservationEffort",
        Some("Indicates a conservation effort implemented by an organization.")),
    ("connectsHabitat", PropertyKind::Object, "WildlifeCorridor", "HabitatArea",
        Some("Indicates which habitat areas a wildlife corridor connects.")),
    ("hasAcreage", PropertyKind::Data, "HabitatArea", "integer",
        Some("The size of the habitat area in acres.")),
    ("hasPopulationEstimate", PropertyKind::Data, "JaguarPopulation", "integer",
        Some("Estimated number of jaguars in a population.")),
    ("isDependentOn", PropertyKind::Object, "JaguarPopulation", "JaguarPopulation",
        Some("Indicates if one jaguar population is dependent on another (e.g., for dispersal).")),
    ("namedBy", PropertyKind::Object, "Jaguar", "Person",
        Some("The person or group who named the jaguar.")),
];

/// `(individual, class)` declared as part of the schema.
const SCHEMA_INDIVIDUALS: &[(&str, &str)] = &[("CarnivoreDiet", "DietType")];

fn term(local: &str) -> Result<Iri, OntologyError> {
    Ok(Iri::in_namespace(ONTOLOGY_NS, local)?)
}

fn ontology_id() -> Iri {
    Iri::from(oxrdf::NamedNodeRef::new_unchecked(ONTOLOGY_IRI))
}

/// Builds the jaguar conservation ontology (schema only, no jaguars).
pub fn jaguar_ontology() -> Result<Ontology, OntologyError> {
    let mut ontology = Ontology::new(ontology_id()).with_label("Jaguar Conservation Ontology");

    for (local, parent, label, comment) in CLASSES {
        let mut class = Class::new(term(local)?);
        if let Some(parent) = parent {
            class.add_parent(term(parent)?);
        }
        if let Some(label) = label {
            class = class.with_label(*label);
        }
        if let Some(comment) = comment {
            class = class.with_comment(*comment);
        }
        ontology.add_class(class)?;
    }

    for (local, kind, domain, range, comment) in PROPERTIES {
        let mut property = Property::new(term(local)?, *kind);
        property.add_domain(term(domain)?);
        let range = match kind {
            PropertyKind::Object => term(range)?,
            PropertyKind::Data => Iri::from(oxrdf::NamedNodeRef::new_unchecked(
                xsd_datatype(range),
            )),
        };
        property.add_range(range);
        if let Some(comment) = comment {
            property = property.with_comment(*comment);
        }
        ontology.add_property(property)?;
    }

    for (local, class) in SCHEMA_INDIVIDUALS {
        let mut individual = Individual::new(term(local)?);
        individual.assert_type(term(class)?);
        ontology.add_individual(individual)?;
    }

    Ok(ontology)
}

fn xsd_datatype(local: &str) -> &'static str {
    match local {
        "date" => oxrdf::vocab::xsd::DATE.as_str(),
        "boolean" => oxrdf::vocab::xsd::BOOLEAN.as_str(),
        "integer" => oxrdf::vocab::xsd::INTEGER.as_str(),
        _ => oxrdf::vocab::xsd::STRING.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::vocabulary::{self, XSD_NS as XSD};

    #[test]
    fn builds_complete_ontology() {
        let ontology = jaguar_ontology().expect("ontology builds");
        assert_eq!(ontology.classes().len(), CLASSES.len());
        assert_eq!(ontology.properties().len(), PROPERTIES.len());
        assert_eq!(ontology.individuals().len(), 1);
    }

    #[test]
    fn jaguar_descends_from_big_cat() {
        let ontology = jaguar_ontology().unwrap();
        let jaguar = ontology
            .class(&Iri::from(vocabulary::JAGUAR))
            .expect("jaguar class");
        assert!(jaguar
            .parents()
            .contains(&Iri::in_namespace(ONTOLOGY_NS, "BigCat").unwrap()));
        assert_eq!(jaguar.comment(), Some("The Panthera onca species."));
    }

    #[test]
    fn was_killed_is_a_boolean_data_property() {
        let ontology = jaguar_ontology().unwrap();
        let property = ontology
            .property(&Iri::from(vocabulary::WAS_KILLED))
            .expect("wasKilled");
        assert_eq!(property.kind(), PropertyKind::Data);
        assert!(property
            .ranges()
            .contains(&Iri::new(format!("{XSD}boolean")).unwrap()));
    }

    #[test]
    fn vocabulary_terms_are_declared() {
        let ontology = jaguar_ontology().unwrap();
        for class in [
            vocabulary::JAGUAR,
            vocabulary::LOCATION,
            vocabulary::CONSERVATION_ORGANIZATION,
            vocabulary::THREAT,
            vocabulary::MONITORING_TECHNIQUE,
        ] {
            assert!(ontology.class(&Iri::from(class)).is_some(), "{class}");
        }
        for property in [
            vocabulary::NAME,
            vocabulary::HAS_GENDER,
            vocabulary::OCCURS_IN,
            vocabulary::MONITORED_BY_ORG,
            vocabulary::MONITORED_BY_TECHNIQUE,
            vocabulary::HAS_MONITORING_START_DATE,
            vocabulary::WAS_KILLED,
            vocabulary::CAUSE_OF_DEATH,
            vocabulary::HAS_IDENTIFICATION_MARK,
            vocabulary::FACES_THREAT,
        ] {
            assert!(ontology.property(&Iri::from(property)).is_some(), "{property}");
        }
    }
}
