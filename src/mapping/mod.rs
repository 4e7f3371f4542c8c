//! Maps the tabular jaguar dataset onto ontology individuals.
//!
//! Every CSV row describes one jaguar. The list columns hold `;` separated
//! values which are exploded into separate resources; because individuals are
//! merged by IRI the resulting graph carries each statement only once.

use std::{fs::File, io::Read, path::Path, sync::LazyLock};

use chrono::NaiveDate;
use oxrdf::{vocab::xsd, Literal};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::ontology::{
    vocabulary::{self, RESOURCE_NS},
    Individual, Iri, IriError, Ontology, OntologyError, PropertyAssertion,
};

/// Characters that may not appear in an IRI fragment.
static UNSAFE_LOCAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\s<>"{}|^`\\#%\[\]]+"#).expect("static pattern compiles")
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// One row of `data/jaguars.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JaguarRecord {
    pub jaguar_id: String,
    pub name: String,
    pub gender: String,
    pub location: String,
    pub monitoring_org: String,
    pub first_sighted: String,
    pub is_killed: String,
    pub cause_of_death: String,
    pub identification_mark: String,
    pub threats: String,
    pub monitoring_technique: String,
    pub status_notes: String,
}

/// Counters reported after a mapping run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSummary {
    /// Rows read from the source.
    pub rows: usize,
    /// Distinct jaguars present in the ontology afterwards.
    pub jaguars: usize,
    /// Cell values that were dropped because they could not be typed.
    pub skipped_values: usize,
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read jaguar records: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {record} has no jaguar_id")]
    MissingId { record: usize },
    #[error("record {record}: `{value}` cannot be used as a resource identifier")]
    InvalidResource {
        record: usize,
        value: String,
        #[source]
        source: IriError,
    },
    #[error(transparent)]
    Ontology(#[from] OntologyError),
}

/// Reads jaguar records from any CSV source with a header row.
pub fn read_records<R: Read>(source: R) -> Result<Vec<JaguarRecord>, MappingError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let records = reader
        .deserialize::<JaguarRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Reads jaguar records from a CSV file.
pub fn load_records(path: &Path) -> Result<Vec<JaguarRecord>, MappingError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    let records = read_records(file)?;
    tracing::debug!(path = %path.display(), rows = records.len(), "jaguar_records_loaded");
    Ok(records)
}

/// Splits a list cell into trimmed, non-empty values.
#[must_use]
pub fn split_list(cell: &str) -> Vec<&str> {
    cell.split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect()
}

/// Builds the resource IRI for a cell value, replacing unsafe characters with `_`.
pub fn resource_iri(value: &str) -> Result<Iri, IriError> {
    let local = UNSAFE_LOCAL_NAME.replace_all(value.trim(), "_");
    Iri::in_namespace(RESOURCE_NS, &local)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn text(value: &str) -> PropertyAssertion {
    PropertyAssertion::Literal(Literal::new_simple_literal(value))
}

/// Maps records onto jaguar individuals and the resources they reference.
///
/// Individuals are merged into `ontology`, so the same resource referenced by
/// several rows is described once.
pub fn map_records(
    ontology: &mut Ontology,
    records: &[JaguarRecord],
) -> Result<MappingSummary, MappingError> {
    let mut summary = MappingSummary {
        rows: records.len(),
        ..MappingSummary::default()
    };

    for (index, record) in records.iter().enumerate() {
        let number = index + 1;
        let (jaguar, resources, skipped) = map_record(number, record)?;
        summary.skipped_values += skipped;
        for resource in resources {
            ontology.merge_individual(resource)?;
        }
        ontology.merge_individual(jaguar)?;
    }

    summary.jaguars = ontology.count_instances(&Iri::from(vocabulary::JAGUAR));
    Ok(summary)
}

/// `(column value, class, linking property)` of a list column.
type ListColumn<'a> = (&'a str, oxrdf::NamedNodeRef<'static>, oxrdf::NamedNodeRef<'static>);

fn map_record(
    number: usize,
    record: &JaguarRecord,
) -> Result<(Individual, Vec<Individual>, usize), MappingError> {
    if record.jaguar_id.is_empty() {
        return Err(MappingError::MissingId { record: number });
    }
    let resource = |value: &str| {
        resource_iri(value).map_err(|source| MappingError::InvalidResource {
            record: number,
            value: value.to_string(),
            source,
        })
    };

    let mut jaguar = Individual::new(resource(record.jaguar_id.as_str())?);
    jaguar.assert_type(Iri::from(vocabulary::JAGUAR));
    let mut skipped = 0;

    if !record.name.is_empty() {
        jaguar = jaguar.with_label(record.name.as_str());
        jaguar.add_property_assertion(Iri::from(vocabulary::NAME), text(&record.name));
    }
    if !record.status_notes.is_empty() {
        jaguar = jaguar.with_comment(record.status_notes.as_str());
    }

    for (value, property) in [
        (&record.gender, vocabulary::HAS_GENDER),
        (&record.cause_of_death, vocabulary::CAUSE_OF_DEATH),
        (&record.identification_mark, vocabulary::HAS_IDENTIFICATION_MARK),
    ] {
        if !value.is_empty() {
            jaguar.add_property_assertion(Iri::from(property), text(value));
        }
    }

    if !record.first_sighted.is_empty() {
        match parse_date(&record.first_sighted) {
            Some(date) => jaguar.add_property_assertion(
                Iri::from(vocabulary::HAS_MONITORING_START_DATE),
                PropertyAssertion::Literal(Literal::new_typed_literal(
                    date.format("%Y-%m-%d").to_string(),
                    xsd::DATE,
                )),
            ),
            None => {
                tracing::warn!(
                    record = number,
                    value = %record.first_sighted,
                    "jaguar_record_unparsed_date"
                );
                skipped += 1;
            }
        }
    }

    if !record.is_killed.is_empty() {
        match parse_bool(&record.is_killed) {
            Some(killed) => jaguar.add_property_assertion(
                Iri::from(vocabulary::WAS_KILLED),
                PropertyAssertion::Literal(Literal::from(killed)),
            ),
            None => {
                tracing::warn!(
                    record = number,
                    value = %record.is_killed,
                    "jaguar_record_unparsed_boolean"
                );
                skipped += 1;
            }
        }
    }

    let columns: [ListColumn<'_>; 4] = [
        (record.location.as_str(), vocabulary::LOCATION, vocabulary::OCCURS_IN),
        (
            record.monitoring_org.as_str(),
            vocabulary::CONSERVATION_ORGANIZATION,
            vocabulary::MONITORED_BY_ORG,
        ),
        (record.threats.as_str(), vocabulary::THREAT, vocabulary::FACES_THREAT),
        (
            record.monitoring_technique.as_str(),
            vocabulary::MONITORING_TECHNIQUE,
            vocabulary::MONITORED_BY_TECHNIQUE,
        ),
    ];

    let mut resources = Vec::new();
    for (cell, class, property) in columns {
        for value in split_list(cell) {
            let iri = resource(value)?;
            let mut individual = Individual::new(iri.clone()).with_label(value);
            individual.assert_type(Iri::from(class));
            resources.push(individual);
            jaguar.add_property_assertion(Iri::from(property), PropertyAssertion::Individual(iri));
        }
    }

    Ok((jaguar, resources, skipped))
}
