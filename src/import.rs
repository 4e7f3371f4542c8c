//! One-time population of the triple store.
//!
//! The import builds the jaguar ontology, maps the CSV dataset onto it and
//! uploads the result as N-Triples, followed by any extra Turtle documents.
//! It runs from the command line only; the server never writes to the store.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    mapping::{self, MappingError, MappingSummary},
    ontology::{
        jaguar_ontology,
        rdf::{ontology_triples, to_ntriples},
        OntologyError,
    },
    store::{GraphLoader, StoreError},
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Ontology(#[from] OntologyError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload failed: {0}")]
    Store(#[from] StoreError),
}

/// Everything that will be sent to the store.
#[derive(Debug, Clone)]
pub struct ImportDocument {
    /// Ontology and instance statements.
    pub ntriples: String,
    /// Number of statements in [`Self::ntriples`].
    pub statements: usize,
    /// Extra Turtle documents, loaded verbatim.
    pub turtle: Vec<(PathBuf, String)>,
    pub summary: MappingSummary,
}

/// Builds the import document from a CSV file and extra Turtle files.
///
/// # Errors
/// Fails when a file cannot be read or a record cannot be mapped.
pub fn prepare(csv: &Path, turtle: &[PathBuf]) -> Result<ImportDocument, ImportError> {
    let records = mapping::load_records(csv)?;
    let mut ontology = jaguar_ontology()?;
    let summary = mapping::map_records(&mut ontology, &records)?;
    let triples = ontology_triples(&ontology);

    let turtle = turtle
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .map(|content| (path.clone(), content))
                .map_err(|source| ImportError::Io {
                    path: path.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        rows = summary.rows,
        jaguars = summary.jaguars,
        skipped_values = summary.skipped_values,
        statements = triples.len(),
        turtle_files = turtle.len(),
        "import_prepared"
    );

    Ok(ImportDocument {
        ntriples: to_ntriples(&triples),
        statements: triples.len(),
        turtle,
        summary,
    })
}

/// Uploads `document` through `loader`.
///
/// # Errors
/// Stops at the first document the store rejects.
pub async fn upload(loader: &dyn GraphLoader, document: &ImportDocument) -> Result<(), ImportError> {
    loader.load_ntriples(document.ntriples.clone()).await?;
    for (path, content) in &document.turtle {
        tracing::debug!(path = %path.display(), "turtle_upload_started");
        loader.load_turtle(content.clone()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    const CSV: &str = "\
jaguar_id,name,gender,location,monitoring_org,first_sighted,is_killed,cause_of_death,identification_mark,threats,monitoring_technique,status_notes
El_Jefe,El Jefe,Male,Santa Rita Mountains,Conservation CATalyst,2011-11-19,False,,Rosette pattern,Border wall,Camera trap,Seen in Arizona
Macho_B,Macho B,Male,Atascosa Mountains; Santa Rita Mountains,Arizona Game and Fish,1996-08-31,True,Euthanized,Rosette pattern,,Radio collar,
";

    #[derive(Default)]
    struct RecordingLoader {
        uploads: Mutex<Vec<(&'static str, String)>>,
    }

    #[async_trait]
    impl GraphLoader for RecordingLoader {
        async fn load_ntriples(&self, document: String) -> Result<(), StoreError> {
            self.uploads.lock().unwrap().push(("ntriples", document));
            Ok(())
        }

        async fn load_turtle(&self, document: String) -> Result<(), StoreError> {
            self.uploads.lock().unwrap().push(("turtle", document));
            Ok(())
        }
    }

    #[tokio::test]
    async fn prepares_and_uploads_all_documents() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("jaguars.csv");
        fs::write(&csv, CSV).unwrap();
        let extra = dir.path().join("extra.ttl");
        fs::write(&extra, "@prefix ont: <http://example.org/ontology#> .\n").unwrap();

        let document = prepare(&csv, &[extra]).unwrap();
        assert_eq!(document.summary.rows, 2);
        assert_eq!(document.summary.jaguars, 2);
        assert_eq!(document.ntriples.lines().count(), document.statements);
        assert!(document.ntriples.contains(
            "<http://example.org/resource#Macho_B> <http://example.org/ontology#wasKilled> \"true\"^^<http://www.w3.org/2001/XMLSchema#boolean> ."
        ));
        let santa_rita_types = document
            .ntriples
            .lines()
            .filter(|line| {
                line.starts_with("<http://example.org/resource#Santa_Rita_Mountains> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>")
            })
            .count();
        assert_eq!(santa_rita_types, 1);

        let loader = RecordingLoader::default();
        upload(&loader, &document).await.unwrap();
        let uploads = loader.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].0, "ntriples");
        assert_eq!(uploads[1].0, "turtle");
    }

    #[test]
    fn missing_turtle_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("jaguars.csv");
        fs::write(&csv, CSV).unwrap();
        let err = prepare(&csv, &[dir.path().join("missing.ttl")]).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
