//! IRIs of the jaguar conservation vocabulary used by the import mapping.

use oxrdf::NamedNodeRef;

/// Namespace of ontology classes and properties (`ont:`).
pub const ONTOLOGY_NS: &str = "http://example.org/ontology#";
/// Namespace of individuals (`:`).
pub const RESOURCE_NS: &str = "http://example.org/resource#";
/// Identifier of the ontology itself.
pub const ONTOLOGY_IRI: &str = "http://example.org/ontology";

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";

/// Prefix declarations shared by the Turtle rendering and the SPARQL templates.
pub const PREFIXES: &[(&str, &str)] = &[
    ("ont", ONTOLOGY_NS),
    ("", RESOURCE_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("owl", OWL_NS),
];

macro_rules! ont_terms {
    ($($name:ident => $local:literal),* $(,)?) => {
        $(
            pub const $name: NamedNodeRef<'static> =
                NamedNodeRef::new_unchecked(concat!("http://example.org/ontology#", $local));
        )*
    };
}

ont_terms! {
    JAGUAR => "Jaguar",
    LOCATION => "Location",
    CONSERVATION_ORGANIZATION => "ConservationOrganization",
    THREAT => "Threat",
    MONITORING_TECHNIQUE => "MonitoringTechnique",
    NAME => "name",
    HAS_GENDER => "hasGender",
    OCCURS_IN => "occursIn",
    MONITORED_BY_ORG => "monitoredByOrg",
    MONITORED_BY_TECHNIQUE => "monitoredByTechnique",
    HAS_MONITORING_START_DATE => "hasMonitoringStartDate",
    WAS_KILLED => "wasKilled",
    CAUSE_OF_DEATH => "causeOfDeath",
    HAS_IDENTIFICATION_MARK => "hasIdentificationMark",
    FACES_THREAT => "facesThreat",
}

/// Renders `value` using a registered prefix when one matches.
#[must_use]
pub fn compact(iri: &str) -> String {
    PREFIXES
        .iter()
        .find_map(|(prefix, namespace)| {
            iri.strip_prefix(namespace)
                .filter(|local| is_prefixed_local(local))
                .map(|local| format!("{prefix}:{local}"))
        })
        .unwrap_or_else(|| format!("<{iri}>"))
}

fn is_prefixed_local(local: &str) -> bool {
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
