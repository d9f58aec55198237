use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions collected when a pattern names a directory
const SOURCE_EXTENSIONS: [&str; 8] = ["js", "jsx", "mjs", "cjs", "ts", "tsx", "rs", "go"];

/// Directory names never descended into
const SKIPPED_DIRECTORIES: [&str; 2] = ["target", "node_modules"];

/// File resolver for annotated sources.
///
/// The `FileScanner` resolves glob patterns relative to a base directory. A pattern that
/// names a directory is walked recursively, skipping hidden directories, `target` and
/// `node_modules`.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.resolve(&["routes/**/*.js".to_string()]).unwrap();
/// println!("Found {} files", result.files.len());
/// ```
pub struct FileScanner {
    base_dir: PathBuf,
}

/// Result of resolving a list of patterns.
///
/// Contains the resolved files and any warnings encountered along the way.
pub struct ScanResult {
    /// Resolved files, patterns in the given order, each pattern's matches in lexical order
    pub files: Vec<PathBuf>,
    /// Warning messages for entries that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` resolving patterns against `base_dir`.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Directory relative patterns are joined to
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolves every pattern to the files it matches.
    ///
    /// A file matched by more than one pattern is listed once, at its first position.
    /// Unreadable entries are logged and recorded as warnings, but resolution continues.
    ///
    /// # Arguments
    ///
    /// * `patterns` - Glob patterns, absolute or relative to the base directory
    ///
    /// # Returns
    ///
    /// Returns a `ScanResult` containing the resolved files and any warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn resolve(&self, patterns: &[String]) -> Result<ScanResult> {
        let mut files = Vec::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for pattern in patterns {
            let full_pattern = self.base_dir.join(pattern);
            let full_pattern = full_pattern.to_string_lossy();
            debug!("Resolving pattern {}", full_pattern);

            let entries = glob::glob(&full_pattern)
                .with_context(|| format!("Invalid file pattern: {}", pattern))?;

            let mut matched = 0usize;
            for entry in entries {
                match entry {
                    Ok(path) if path.is_dir() => {
                        for file in walk_directory(&path, &mut warnings) {
                            matched += 1;
                            if seen.insert(file.clone()) {
                                files.push(file);
                            }
                        }
                    }
                    Ok(path) => {
                        matched += 1;
                        if seen.insert(path.clone()) {
                            files.push(path);
                        }
                    }
                    Err(e) => {
                        let warning = format!("Failed to access path: {}", e);
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
            }

            if matched == 0 {
                warn!("Pattern matched no files: {}", pattern);
            }
        }

        Ok(ScanResult { files, warnings })
    }
}

/// Recursively collects source files under `root`.
fn walk_directory(root: &Path, warnings: &mut Vec<String>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Don't filter the root directory itself
            if e.depth() == 0 {
                return true;
            }

            let file_name = e.file_name().to_string_lossy();
            let is_hidden = file_name.starts_with('.');
            let is_skipped =
                e.file_type().is_dir() && SKIPPED_DIRECTORIES.iter().any(|d| file_name == *d);

            !is_hidden && !is_skipped
        })
    {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                let is_source = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext));

                if entry.file_type().is_file() && is_source {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => {
                let warning = format!("Failed to access path: {}", e);
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    files
}
