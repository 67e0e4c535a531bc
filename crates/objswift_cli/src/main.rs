//! ObjSwift CLI - translate Objective-C sources to Swift
//!
//! Reads `.h`/`.m` inputs, runs the transpiler pipeline, and writes one
//! `.swift` file per translation unit. Parse failures are fatal for the
//! offending file only; the process exit code is nonzero when any error
//! diagnostic was produced.

use clap::Parser;
use colored::Colorize;
use objswift_ast::{DiagnosticLevel, SourceFile};
use objswift_transpiler::Transpiler;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "objswift")]
#[command(about = "Translate Objective-C source files to Swift", long_about = None)]
struct Cli {
    /// Input Objective-C files (.h, .m)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the generated .swift files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Print generated Swift to stdout instead of writing files
    #[arg(long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            eprintln!("{} {}", "error:".red().bold(), error);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut sources = Vec::new();
    for path in &cli.inputs {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(SourceFile::new(name, content));
    }

    if cli.verbose {
        log::info!("translating {} file(s)", sources.len());
    }

    let output = Transpiler::new().transpile(&sources);

    for diagnostic in output.diagnostics.iter() {
        let level = match diagnostic.level {
            DiagnosticLevel::Error => "error:".red().bold(),
            DiagnosticLevel::Warning => "warning:".yellow().bold(),
            DiagnosticLevel::Note => "note:".cyan(),
        };
        match &diagnostic.origin {
            Some(origin) => eprintln!("{} {} {}", origin, level, diagnostic.message),
            None => eprintln!("{} {}", level, diagnostic.message),
        }
    }

    if cli.print {
        for file in &output.files {
            println!("// {}", file.name.bold());
            println!("{}", file.swift_source);
        }
    } else {
        fs::create_dir_all(&cli.output)?;
        for file in &output.files {
            let path = cli.output.join(&file.name);
            fs::write(&path, &file.swift_source)?;
            if cli.verbose {
                log::info!("wrote {}", path.display());
            }
        }
    }

    let succeeded = output.succeeded();
    if !succeeded {
        eprintln!(
            "{} translation finished with {} error(s)",
            "error:".red().bold(),
            output.diagnostics.errors().count()
        );
    }
    Ok(succeeded)
}
