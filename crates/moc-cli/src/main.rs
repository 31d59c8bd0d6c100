//! Meta-object compiler command-line tool
//!
//! Reads one preprocessed header and writes the generated meta-object
//! source, optionally with a JSON description and a make dependency file.

mod output;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use moc_engine::deps::write_dependency_file;
use moc_engine::{compile_source, FsLoader, KnownTypes, MocConfig, MocError, MocOptions, MocOutput};

use output::{resolve_color_choice, DiagnosticPrinter};

/// Input name used when reading standard input.
const STDIN_NAME: &str = "standard input";

#[derive(Parser)]
#[command(name = "moc")]
#[command(about = "Qt Meta Object Compiler", long_about = None)]
#[command(version)]
struct Cli {
    /// Header file to read, standard input when omitted or `-`
    input: Option<PathBuf>,

    /// Write output to file rather than stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Add dir to the plugin metadata search path
    #[arg(short = 'I', value_name = "DIR")]
    include_paths: Vec<PathBuf>,

    /// Add key/value pair to plugin meta data
    #[arg(short = 'M', value_name = "KEY=VALUE")]
    meta_args: Vec<String>,

    /// Name used in the generated #include
    #[arg(short = 'f', long = "include", value_name = "NAME")]
    include_name: Option<String>,

    /// Do not generate an #include statement
    #[arg(short = 'i')]
    no_include: bool,

    /// Write a JSON description next to the output
    #[arg(long)]
    output_json: bool,

    /// Write a make-style dependency file
    #[arg(long)]
    output_dep_file: bool,

    /// Path of the dependency file, default `<output>.d`
    #[arg(long, value_name = "FILE")]
    dep_file_path: Option<PathBuf>,

    /// Rule name in the dependency file, default the output path
    #[arg(long, value_name = "NAME")]
    dep_file_rule_name: Option<String>,

    /// Do not display warnings
    #[arg(long)]
    no_warnings: bool,

    /// Do not display notes
    #[arg(long)]
    no_notes: bool,

    /// Read options from a moc.toml file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Color output: auto, always, never
    #[arg(long, value_name = "WHEN")]
    color: Option<String>,
}

impl Cli {
    /// Config file first, flags on top.
    fn options(&self) -> anyhow::Result<MocOptions> {
        let mut options = match &self.config {
            Some(path) => MocConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
                .into_options(),
            None => MocOptions::default(),
        };
        options.include_paths.extend(self.include_paths.iter().cloned());
        for arg in &self.meta_args {
            options.add_meta_arg(arg)?;
        }
        if self.include_name.is_some() {
            options.include_name = self.include_name.clone();
        }
        options.no_include |= self.no_include;
        options.no_warnings |= self.no_warnings;
        options.no_notes |= self.no_notes;
        options.output_json |= self.output_json;
        Ok(options)
    }

    fn stdin_input(&self) -> bool {
        self.input.as_deref().map_or(true, |path| path == Path::new("-"))
    }
}

fn main() {
    let cli = Cli::parse();
    let mut printer = DiagnosticPrinter::new(resolve_color_choice(cli.color.as_deref()));
    match run(&cli, &mut printer) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            printer.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

/// Compile the input and write every requested output.
///
/// Returns `Ok(false)` for fatal errors already printed as diagnostics.
fn run(cli: &Cli, printer: &mut DiagnosticPrinter) -> anyhow::Result<bool> {
    let options = cli.options()?;

    let (source, input_name) = if cli.stdin_input() {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read standard input")?;
        (source, STDIN_NAME.to_string())
    } else {
        let path = cli.input.as_deref().unwrap_or(Path::new("-"));
        let source = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        (source, path.display().to_string())
    };

    let mut known = KnownTypes::new();
    let output = match compile_source(&source, &input_name, &mut known, &options, &FsLoader) {
        Ok(output) => output,
        Err(err @ (MocError::Lex(_) | MocError::Parse(_))) => {
            printer.print(&input_name, &source, &err.to_diagnostics());
            return Ok(false);
        }
        Err(err) => return Err(err.into()),
    };
    printer.print(&input_name, &source, &output.diagnostics);

    write_outputs(cli, &output)?;
    Ok(true)
}

fn write_outputs(cli: &Cli, output: &MocOutput) -> anyhow::Result<()> {
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output.code).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.code.as_bytes())?;
            stdout.flush()?;
        }
    }

    if let Some(json) = &output.json {
        match &cli.output {
            Some(path) => {
                let json_path = with_suffix(path, ".json");
                std::fs::write(&json_path, json)
                    .with_context(|| format!("Failed to write {}", json_path.display()))?;
            }
            None => println!("{json}"),
        }
    }

    if cli.output_dep_file {
        let dep_path = match (&cli.dep_file_path, &cli.output) {
            (Some(path), _) => path.clone(),
            (None, Some(output)) => with_suffix(output, ".d"),
            (None, None) => PathBuf::from("moc.d"),
        };
        let rule = match (&cli.dep_file_rule_name, &cli.output) {
            (Some(rule), _) => rule.clone(),
            (None, Some(output)) => output.display().to_string(),
            (None, None) => "moc".to_string(),
        };
        let mut listing = String::new();
        write_dependency_file(&mut listing, &rule, &output.dependencies)?;
        std::fs::write(&dep_path, listing).with_context(|| format!("Failed to write {}", dep_path.display()))?;
    }
    Ok(())
}

/// `moc_a.cpp` + `.json` -> `moc_a.cpp.json`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("moc.toml");
        std::fs::write(&config, "[moc]\ninclude-paths = [\"meta\"]\n\n[metadata]\nuri = [\"a\"]\n").unwrap();

        let cli = Cli::parse_from([
            "moc",
            "--config",
            config.to_str().unwrap(),
            "-I",
            "extra",
            "-M",
            "uri=b",
            "--no-notes",
            "-f",
            "widget.h",
            "input.h",
        ]);
        let options = cli.options().unwrap();
        assert_eq!(options.include_paths, vec![dir.path().join("meta"), PathBuf::from("extra")]);
        assert_eq!(options.meta_args["uri"], vec!["a", "b"]);
        assert!(options.no_notes);
        assert!(!options.no_warnings);
        assert_eq!(options.include_name.as_deref(), Some("widget.h"));
        assert!(!cli.stdin_input());
    }

    #[test]
    fn test_bad_meta_argument() {
        let cli = Cli::parse_from(["moc", "-M", "novalue"]);
        assert!(cli.options().is_err());
        assert!(cli.stdin_input());
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix(Path::new("out/moc_a.cpp"), ".d"), PathBuf::from("out/moc_a.cpp.d"));
    }
}
