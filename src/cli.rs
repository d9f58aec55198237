use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI from annotations - Generate an OpenAPI document from annotated source comments
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Glob patterns of annotated source files, relative to the base directory
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Directory the file patterns are resolved against
    #[arg(short = 'b', long = "base-dir", value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Base definition (YAML, or JSON for `.json` files)
    #[arg(short = 'd', long = "definition", value_name = "FILE")]
    pub definition: Option<PathBuf>,

    /// API title, used when no base definition is given
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// API version, used when no base definition is given
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Skip the dangling reference check
    #[arg(long = "skip-validation")]
    pub skip_validation: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.base_dir.is_dir() {
        anyhow::bail!("Base directory is not a directory: {}", args.base_dir.display());
    }

    if let Some(ref definition) = args.definition {
        if !definition.is_file() {
            anyhow::bail!("Base definition does not exist: {}", definition.display());
        }
        info!("Base definition: {}", definition.display());
    }

    info!("Base directory: {}", args.base_dir.display());
    info!("File patterns: {:?}", args.files);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::generator::{generate, load_definition, GeneratorOptions};
    use crate::openapi_builder::BaseDefinition;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::tokenizer::JsDocTokenizer;
    use crate::validator::{DocumentValidator, Passthrough, ReferenceCheck};

    info!("Starting OpenAPI document generation...");

    // Step 1: Assemble the base definition
    let definition = match &args.definition {
        Some(path) => load_definition(path)?,
        None => BaseDefinition::new(args.title.clone(), args.api_version.clone()),
    };

    let options = GeneratorOptions::new(args.base_dir.clone())
        .with_files(args.files.iter().cloned())
        .with_definition(definition);

    // Step 2: Generate and validate
    let validator: &dyn DocumentValidator = if args.skip_validation {
        &Passthrough
    } else {
        &ReferenceCheck
    };
    let (document, report) = generate(&options, &JsDocTokenizer, validator)?;
    info!("OpenAPI document built successfully");

    // Step 3: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    // Step 5: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files read: {}", report.files_read);
    info!("  - Blocks documented: {}", report.blocks_merged);
    info!("  - Blocks skipped: {}", report.blocks_skipped);
    info!("  - Paths: {}", document.paths.len());
    info!("  - Schemas: {}", document.components.schemas.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["openapi-from-annotations", "routes/*.js"]).unwrap();

        assert_eq!(args.files, vec!["routes/*.js".to_string()]);
        assert_eq!(args.base_dir, PathBuf::from("."));
        assert_eq!(args.title, "Generated API");
        assert_eq!(args.api_version, "1.0.0");
        assert!(matches!(args.output_format, OutputFormat::Yaml));
        assert!(args.definition.is_none());
        assert!(!args.skip_validation);
    }

    #[test]
    fn test_all_flags() {
        let args = CliArgs::try_parse_from([
            "openapi-from-annotations",
            "-b",
            "app",
            "-d",
            "base.yaml",
            "-f",
            "json",
            "-o",
            "out/openapi.json",
            "--skip-validation",
            "-v",
            "a.js",
            "b.js",
        ])
        .unwrap();

        assert_eq!(args.files.len(), 2);
        assert_eq!(args.base_dir, PathBuf::from("app"));
        assert_eq!(args.definition, Some(PathBuf::from("base.yaml")));
        assert!(matches!(args.output_format, OutputFormat::Json));
        assert!(args.skip_validation);
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_base_dir_is_rejected() {
        let args = CliArgs::try_parse_from([
            "openapi-from-annotations",
            "-b",
            "/definitely/not/here",
            "a.js",
        ])
        .unwrap();

        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("ping.js"),
            "/**\n * @route GET /ping\n * @returns {string} 200 - pong\n */\n",
        )
        .unwrap();
        let output = temp_dir.path().join("out").join("openapi.json");

        let args = CliArgs::try_parse_from([
            "openapi-from-annotations",
            "-b",
            temp_dir.path().to_str().unwrap(),
            "-f",
            "json",
            "-o",
            output.to_str().unwrap(),
            "*.js",
        ])
        .unwrap();
        run(args).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["paths"]["/ping"]["get"]["responses"]["200"]["description"], "pong");
    }

    #[test]
    fn test_run_without_files_fails() {
        let args = CliArgs::try_parse_from(["openapi-from-annotations"]).unwrap();
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("file pattern"));
    }
}
