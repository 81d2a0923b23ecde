//! csdoc: list C# type declarations and their XML documentation.
//!
//! Two modes:
//!
//! - **stdin mode**: `csdoc < Foo.cs`
//! - **file mode**: `csdoc -f markdown -o docs/api src/ Extra.cs 'gen/**/*.cs'`

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use csdoc::model::{DeclKind, Modifiers, SourceFile};
use csdoc::render::template::TemplateRenderer;
use csdoc::render::{self, Renderer};
use csdoc::{discover, parser};
use rayon::prelude::*;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "csdoc",
    version,
    about = "Extract type declarations and XML documentation from C# sources"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    paths: Vec<String>,

    /// Output directory. Without it everything goes to stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: table (default), json, markdown, template
    #[arg(short = 'f', long, default_value = "table")]
    format: String,

    /// Template file for the template format.
    /// Lines with {{ class }}, {{ struct }}, {{ interface }} or {{ enum }} repeat per type.
    #[arg(short = 't', long)]
    template: Option<PathBuf>,

    /// Only report these kinds. Can be specified multiple times.
    #[arg(long, value_parser = parse_kind)]
    kind: Vec<DeclKind>,

    /// Filter declarations by modifier. Prefix with ! to exclude.
    /// Can be specified multiple times. E.g. --filter public --filter '!static'
    #[arg(long, value_parser = parse_filter)]
    filter: Vec<ModifierFilter>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModifierFilter {
    modifier: Modifiers,
    exclude: bool,
}

/// Everything the pipeline needs, resolved from the command line.
struct RunConfig {
    paths: Vec<String>,
    output: Option<PathBuf>,
    renderer: Box<dyn Renderer>,
    /// File name for single-file template output.
    template_name: Option<String>,
    kinds: Vec<DeclKind>,
    filters: Vec<ModifierFilter>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = RunConfig::from_cli(cli)?;
    let mut files = if config.paths.is_empty() {
        vec![read_stdin()?]
    } else {
        read_files(&config.paths)?
    };

    for file in &mut files {
        filter_declarations(file, &config.kinds, &config.filters);
    }

    match config.output {
        Some(ref dir) => write_outputs(&config, dir, &files),
        None => {
            print!("{}", config.renderer.render(&files)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .init();
}

impl RunConfig {
    fn from_cli(cli: Cli) -> Result<Self> {
        let wants_template = cli.format == "template";
        let template = match cli.template {
            Some(ref path) if wants_template => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("failed to read template: {}", path.display()))?,
            ),
            Some(ref path) => {
                debug!("ignoring template {} for format {}", path.display(), cli.format);
                None
            }
            None => None,
        };

        let renderer: Box<dyn Renderer> = match (cli.format.as_str(), template) {
            ("template", Some(text)) => {
                let ext = cli
                    .template
                    .as_deref()
                    .and_then(|p| p.extension())
                    .and_then(|e| e.to_str())
                    .unwrap_or("md");
                Box::new(TemplateRenderer::new(text).with_extension(ext))
            }
            (format, template) => render::create_renderer(format, template)?,
        };

        let template_name = cli
            .template
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string());

        Ok(Self {
            paths: cli.paths,
            output: cli.output,
            renderer,
            template_name: if wants_template {
                template_name
            } else {
                None
            },
            kinds: cli.kind,
            filters: cli.filter,
        })
    }
}

/// stdin mode: one unnamed source.
fn read_stdin() -> Result<SourceFile> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    let file = parser::parse(input, None);
    log_warnings(&file);
    Ok(file)
}

/// file mode: expand patterns and scan every file in parallel.
///
/// Files that cannot be read are skipped with a warning. Output order
/// follows the sorted input list.
fn read_files(patterns: &[String]) -> Result<Vec<SourceFile>> {
    let paths = discover::expand(patterns)?;
    info!("scanning {} files", paths.len());

    let results: Vec<_> = paths
        .par_iter()
        .map(|path| (path, parser::parse_file(path)))
        .collect();

    let mut files = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(file) => {
                debug!(
                    "{}: {} declarations, {} comments",
                    path.display(),
                    file.declarations.len(),
                    file.comments.len()
                );
                log_warnings(&file);
                files.push(file);
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(files)
}

fn log_warnings(file: &SourceFile) {
    let name = file.display_name();
    for w in &file.warnings {
        warn!("{}:{}: {}", name, w.line, w.kind);
    }
}

fn write_outputs(config: &RunConfig, dir: &Path, files: &[SourceFile]) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    if let Some(ref name) = config.template_name {
        let out_path = dir.join(name);
        write_file(&out_path, &config.renderer.render(files)?)?;
        return Ok(());
    }

    let ext = config.renderer.file_extension();
    for file in files {
        // Nothing to document after filtering
        if file.declarations.is_empty() {
            debug!("{}: no declarations, skipped", file.display_name());
            continue;
        }
        let out_path = dir.join(format!("{}.{}", file.stem(), ext));
        let output = config.renderer.render(std::slice::from_ref(file))?;
        write_file(&out_path, &output)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Keep declarations of the requested kinds that satisfy every modifier filter.
///
/// An empty kind list keeps every kind.
fn filter_declarations(file: &mut SourceFile, kinds: &[DeclKind], filters: &[ModifierFilter]) {
    file.declarations.retain(|decl| {
        if !kinds.is_empty() && !kinds.contains(&decl.kind) {
            return false;
        }
        filters
            .iter()
            .all(|f| decl.modifiers.contains(f.modifier) != f.exclude)
    });
}

fn parse_kind(s: &str) -> Result<DeclKind, String> {
    DeclKind::from_keyword(s)
        .ok_or_else(|| format!("unknown kind '{}'. Use class, struct, interface, or enum", s))
}

fn parse_filter(s: &str) -> Result<ModifierFilter, String> {
    let (word, exclude) = match s.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (s, false),
    };
    let modifier = Modifiers::from_keyword(word).ok_or_else(|| format!("unknown modifier '{}'", word))?;
    Ok(ModifierFilter { modifier, exclude })
}
