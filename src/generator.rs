//! Top-level generation run: resolve files, tokenize, aggregate, validate.

use crate::error::Error;
use crate::openapi_builder::{BaseDefinition, BlockOutcome, OpenApiBuilder, OpenApiDocument};
use crate::scanner::FileScanner;
use crate::tokenizer::AnnotationTokenizer;
use crate::validator::DocumentValidator;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs of one generation run
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Directory relative file patterns are resolved against
    pub base_dir: PathBuf,
    /// Glob patterns of the annotated sources
    pub files: Vec<String>,
    /// Document skeleton; required
    pub definition: Option<BaseDefinition>,
}

impl GeneratorOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            files: Vec::new(),
            definition: None,
        }
    }

    pub fn with_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_definition(mut self, definition: BaseDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    /// Fails with [`Error::MissingConfiguration`] when no file pattern or no base
    /// definition was given.
    pub fn check(&self) -> crate::error::Result<&BaseDefinition> {
        if self.files.is_empty() {
            return Err(Error::MissingConfiguration(
                "at least one file pattern is required".to_string(),
            ));
        }
        self.definition.as_ref().ok_or_else(|| {
            Error::MissingConfiguration("a base definition is required".to_string())
        })
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub files_read: usize,
    pub blocks_merged: usize,
    pub blocks_skipped: usize,
    /// Files that could not be resolved or read
    pub warnings: Vec<String>,
}

/// Runs a full generation.
///
/// Missing configuration aborts before any file is touched. Unreadable files are
/// reported as warnings, malformed comment blocks are skipped, and a failing validator
/// leaves the assembled document in place.
///
/// # Arguments
///
/// * `options` - Base directory, file patterns and base definition
/// * `tokenizer` - Splits each file into comment blocks
/// * `validator` - Receives the assembled document
///
/// # Returns
///
/// Returns the final document together with a [`GenerationReport`].
///
/// # Errors
///
/// Returns an error for missing configuration or an invalid file pattern.
pub fn generate(
    options: &GeneratorOptions,
    tokenizer: &dyn AnnotationTokenizer,
    validator: &dyn DocumentValidator,
) -> Result<(OpenApiDocument, GenerationReport)> {
    let definition = options.check()?;

    let scanner = FileScanner::new(options.base_dir.clone());
    let scan_result = scanner.resolve(&options.files)?;
    info!("Resolved {} annotated files", scan_result.files.len());

    let mut report = GenerationReport {
        warnings: scan_result.warnings,
        ..GenerationReport::default()
    };
    let mut builder = OpenApiBuilder::from_definition(definition);

    for file in &scan_result.files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                let warning = format!("Failed to read {}: {}", file.display(), e);
                warn!("{}", warning);
                report.warnings.push(warning);
                continue;
            }
        };

        let blocks = tokenizer.tokenize(&source);
        debug!("{}: {} comment blocks", file.display(), blocks.len());
        builder.add_file(file, &blocks);
        report.files_read += 1;
    }

    for outcome in builder.outcomes() {
        match outcome {
            BlockOutcome::Merged { .. } => report.blocks_merged += 1,
            BlockOutcome::Skipped(_) => report.blocks_skipped += 1,
        }
    }

    let document = builder.build();
    let document = match validator.validate(document.clone()) {
        Ok(validated) => validated,
        Err(e) => {
            warn!("Validation failed, keeping the generated document: {}", e);
            document
        }
    };

    Ok((document, report))
}

/// Loads a base definition, as JSON for `.json` files and YAML otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_definition(path: &Path) -> Result<BaseDefinition> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read base definition: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    let definition = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON base definition: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML base definition: {}", path.display()))?
    };

    Ok(definition)
}
