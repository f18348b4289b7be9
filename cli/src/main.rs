use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::info;

use liveschema::{check, parse_document, ErrorReporter, ParseOptions};

/// Parses and checks a live storage schema.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema file to check (stdin when omitted or `-`)
    file: Option<PathBuf>,

    /// Accept legacy capitalized scalar keywords such as `Int` or `String`
    #[arg(long, env = "LIVESCHEMA_ALLOW_LEGACY_BUILTINS")]
    allow_legacy_builtins: bool,

    /// Print the checked document as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let text = read_source(cli.file.as_deref())?;
    let mut reporter = ErrorReporter::from_text(text);
    let options = ParseOptions {
        allow_legacy_builtins: cli.allow_legacy_builtins,
    };

    let document = match parse_document(&mut reporter, options) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let checked = match check(&document, &mut reporter) {
        Ok(checked) => checked,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("schema is valid");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&checked)?);
    } else {
        println!("{} (root)", checked.root.name.name);
        for def in &checked.definitions {
            let class = if def.is_static { "static" } else { "live" };
            println!("{} ({})", def.name.name, class);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
