//! OpenAPI from annotations - Command-line tool for generating OpenAPI documentation.
//!
//! Reads JSDoc-style `/** ... */` comments carrying `@route`, `@param`, `@returns`,
//! `@typedef` and related tags, and writes a single OpenAPI 3 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] [FILES]...
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-annotations -b ./my-api 'routes/**/*.js' -o openapi.yaml
//! ```
//!
//! Start from a base definition and emit JSON:
//! ```bash
//! openapi-from-annotations -d base.yaml -f json -o openapi.json 'routes/*.js' 'models/*.js'
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-annotations 'routes/*.js' -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from annotations starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
