//! Main converter service that ties all components together.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::{parse_source_file_name, Settings};
use crate::error::{ConverterError, Diagnostic, Result};
use crate::grouping::{group_rows, Document};
use crate::output::{save_csv, save_json};
use crate::parser::{parse_source, ParsedFile};
use crate::pattern::MatcherCache;
use crate::schema::SchemaRegistry;
use crate::types::SourceFile;

/// Parsed rows and grouped documents of one source file.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub source: SourceFile,
    pub parsed: ParsedFile,
    pub documents: Vec<Document>,
}

/// Outcome of converting one source file to disk.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: SourceFile,
    pub rows: usize,
    pub documents: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files converted, in source order.
    pub converted: Vec<FileReport>,

    /// Files that failed, each wrapped in `ConverterError::File`.
    pub failures: Vec<ConverterError>,
}

impl BatchReport {
    /// Total rows written to CSV.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.converted.iter().map(|r| r.rows).sum()
    }

    /// Total documents written to JSON.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.converted.iter().map(|r| r.documents).sum()
    }

    /// Total non-fatal diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> usize {
        self.converted.iter().map(|r| r.diagnostics.len()).sum()
    }

    /// Whether every file converted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// List the source files of a directory, sorted by name.
///
/// Hidden entries (names starting with `.`) are skipped. Every other entry
/// must follow the `{collection}{volume}.txt` naming convention; a single
/// stray file fails the whole listing before anything is converted.
pub fn discover_sources(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut paths = fs::read_dir(dir)?
        .filter(|entry| {
            entry
                .as_ref()
                .map_or(true, |e| !e.file_name().to_string_lossy().starts_with('.'))
        })
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    paths.sort();

    paths.iter().map(parse_source_file_name).collect()
}

/// Converts metadata files using shared, read-only settings and matchers.
#[derive(Debug)]
pub struct Converter {
    settings: Settings,
    matchers: MatcherCache,
}

impl Converter {
    /// Create a converter.
    #[must_use]
    pub fn new(settings: Settings, registry: SchemaRegistry) -> Self {
        Self {
            settings,
            matchers: MatcherCache::new(registry),
        }
    }

    /// Create a converter with the built-in settings and schemas.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Settings::builtin()?, SchemaRegistry::builtin()?))
    }

    /// Parse a source file's bytes.
    pub fn parse_bytes(&self, source: &SourceFile, contents: &[u8]) -> Result<ParsedFile> {
        let matcher = self.matchers.get(source.collection)?;
        Ok(parse_source(&matcher, contents))
    }

    /// Parse and group a source file without writing anything.
    pub fn convert_source(&self, source: &SourceFile) -> Result<Conversion> {
        let contents = fs::read(&source.path)?;
        let parsed = self.parse_bytes(source, &contents)?;
        let documents = group_rows(&parsed.rows, source, &self.settings)?;

        Ok(Conversion {
            source: source.clone(),
            parsed,
            documents,
        })
    }

    /// Convert a source file into its CSV and JSON outputs.
    ///
    /// Nothing is written for a file that fails to group.
    pub fn convert_file(&self, source: &SourceFile, output_base: &Path) -> Result<FileReport> {
        tracing::debug!(path = %source.path.display(), "converting");

        let conversion = self.convert_source(source)?;
        let matcher = self.matchers.get(source.collection)?;

        let csv_path = save_csv(&conversion.parsed.rows, matcher.schema(), source, output_base)?;
        let json_path = save_json(&conversion.documents, source, output_base)?;

        tracing::info!(
            file = %source.stem(),
            rows = conversion.parsed.rows.len(),
            documents = conversion.documents.len(),
            warnings = conversion.parsed.diagnostics.len(),
            "converted"
        );

        Ok(FileReport {
            source: conversion.source,
            rows: conversion.parsed.rows.len(),
            documents: conversion.documents.len(),
            diagnostics: conversion.parsed.diagnostics,
            csv_path,
            json_path,
        })
    }

    /// Convert a batch of source files.
    ///
    /// Files are independent: a failing file is recorded and the others
    /// still convert. `on_done` is called once per file as it finishes.
    pub fn convert_all<F>(&self, sources: &[SourceFile], output_base: &Path, on_done: F) -> BatchReport
    where
        F: Fn(&SourceFile) + Sync,
    {
        let convert = |source: &SourceFile| {
            let result = self
                .convert_file(source, output_base)
                .map_err(|e| ConverterError::File {
                    path: source.path.clone(),
                    source: Box::new(e),
                });
            on_done(source);
            result
        };

        #[cfg(feature = "rayon")]
        let results: Vec<Result<FileReport>> = sources.par_iter().map(convert).collect();
        #[cfg(not(feature = "rayon"))]
        let results: Vec<Result<FileReport>> = sources.iter().map(convert).collect();

        let mut report = BatchReport::default();
        for result in results {
            match result {
                Ok(file_report) => report.converted.push(file_report),
                Err(e) => {
                    tracing::error!("{e}");
                    report.failures.push(e);
                }
            }
        }
        report
    }
}
