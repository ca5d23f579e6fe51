//! Command-line interface for the ingredients compiler
//! Reads a recipe document, runs one of the standard pipelines over it and prints the result.
//!
//! Usage:
//!   ingredients `<path>` [--pipeline `<name>`] [--config `<file>`] [--set `<key=value>`]... [--output `<file>`]
//!   ingredients --list-pipelines
//!
//! `<path>` may be `-` to read from stdin; inline images then resolve against the working
//! directory. Set `RUST_LOG=warn` (or `debug`) to see compiler warnings.

use clap::{Arg, ArgAction, ArgMatches, Command};
use ingredients_compiler::recipe::transforms::standard::AVAILABLE_PIPELINES;
use ingredients_compiler::{CompilerSettings, DocumentLoader, LoaderError};
use ingredients_config::Loader;
use std::fs;
use std::io::{self, Read};

fn build_cli() -> Command {
    Command::new("ingredients")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compiles recipe markup into interactive HTML")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the recipe document, or - for stdin")
                .required_unless_present("list-pipelines")
                .index(1),
        )
        .arg(
            Arg::new("pipeline")
                .long("pipeline")
                .short('p')
                .help("Pipeline to run (see --list-pipelines)")
                .default_value("recipe"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a single setting, e.g. render.precision=0.01")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the result to a file instead of stdout"),
        )
        .arg(
            Arg::new("list-pipelines")
                .long("list-pipelines")
                .help("List available pipelines")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    env_logger::init();
    let matches = build_cli().get_matches();

    if matches.get_flag("list-pipelines") {
        handle_list_pipelines_command();
        return;
    }

    let settings = load_settings(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    let path = matches
        .get_one::<String>("path")
        .expect("path is required unless listing pipelines");
    let pipeline = matches
        .get_one::<String>("pipeline")
        .expect("pipeline has a default value");
    let output = matches.get_one::<String>("output");

    handle_compile_command(path, pipeline, &settings, output.map(String::as_str));
}

fn load_settings(matches: &ArgMatches) -> Result<CompilerSettings, ingredients_config::ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    for assignment in matches.get_many::<String>("set").into_iter().flatten() {
        loader = loader.set_assignment(assignment)?;
    }
    Ok(loader.build()?.into_settings())
}

fn load_document(path: &str) -> Result<DocumentLoader, LoaderError> {
    if path == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|source| LoaderError::Io {
                path: path.into(),
                source,
            })?;
        return Ok(DocumentLoader::from_string(source));
    }
    DocumentLoader::from_path(path)
}

/// Handle the compile command
fn handle_compile_command(
    path: &str,
    pipeline: &str,
    settings: &CompilerSettings,
    output: Option<&str>,
) {
    let html = load_document(path)
        .and_then(|loader| loader.run_pipeline(pipeline, settings))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            if let LoaderError::UnknownPipeline(_) = e {
                eprintln!("\nAvailable pipelines:");
                for (name, description) in AVAILABLE_PIPELINES {
                    eprintln!("  {} - {}", name, description);
                }
            }
            std::process::exit(1);
        });

    match output {
        Some(target) => {
            if let Err(e) = fs::write(target, &html) {
                eprintln!("Error writing '{}': {}", target, e);
                std::process::exit(1);
            }
            log::info!("wrote {}", target);
        }
        None => print!("{}", html),
    }
}

/// Handle the list-pipelines command
fn handle_list_pipelines_command() {
    println!("Available pipelines:\n");
    for (name, description) in AVAILABLE_PIPELINES {
        println!("  {}", name);
        println!("    {}", description);
        println!();
    }
}
