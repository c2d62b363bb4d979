//! SCN CLI - export scene snapshots and inspect SCN files.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use scn::chunk::{tags, ChunkHeader, ChunkReader};
use scn::export::{ExportOptions, Exporter, ModifierMode, PathRelativity};
use scn::scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "scn", version, about = "Export and inspect SCN scene files")]
struct Cli {
    /// Verbose logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a JSON scene snapshot to an SCN file.
    #[command(alias = "e")]
    Export(ExportArgs),
    /// Show chunk counts per type.
    #[command(alias = "i")]
    Info { file: PathBuf },
    /// List chunks with their identifiers, versions and lengths.
    #[command(alias = "t")]
    Tree { file: PathBuf },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Input scene snapshot (JSON).
    input: PathBuf,

    /// Output SCN path.
    output: PathBuf,

    /// Embed texture and sound bytes instead of referencing files.
    #[arg(long)]
    embed: bool,

    /// How referenced resource paths are written.
    #[arg(long, value_enum, default_value_t = Relativity::Output)]
    relativity: Relativity,

    /// What to do with object modifier stacks.
    #[arg(long, value_enum, default_value_t = Modifiers::Preserve)]
    modifiers: Modifiers,

    /// Author recorded in the run metadata.
    #[arg(long, env = "USER")]
    author: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Relativity {
    Absolute,
    Project,
    Output,
}

impl From<Relativity> for PathRelativity {
    fn from(r: Relativity) -> Self {
        match r {
            Relativity::Absolute => PathRelativity::Absolute,
            Relativity::Project => PathRelativity::Project,
            Relativity::Output => PathRelativity::Output,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Modifiers {
    Preserve,
    Apply,
    Ignore,
}

impl From<Modifiers> for ModifierMode {
    fn from(m: Modifiers) -> Self {
        match m {
            Modifiers::Preserve => ModifierMode::Preserve,
            Modifiers::Apply => ModifierMode::Apply,
            Modifiers::Ignore => ModifierMode::Ignore,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Info { file } => cmd_info(&file),
        Command::Tree { file } => cmd_tree(&file),
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    info!("Reading scene: {}", args.input.display());
    let file = File::open(&args.input)
        .with_context(|| format!("open scene '{}'", args.input.display()))?;
    let scene = Scene::from_json_reader(BufReader::new(file))
        .with_context(|| format!("parse scene '{}'", args.input.display()))?;
    debug!(
        "Scene: {} objects, {} meshes, {} materials",
        scene.objects.len(),
        scene.meshes.len(),
        scene.materials.len()
    );

    let author = args.author.or_else(|| std::env::var("USERNAME").ok());
    let mut options = ExportOptions::new()
        .with_embed_resources(args.embed)
        .with_relativity(args.relativity.into())
        .with_modifier_mode(args.modifiers.into());
    if let Some(author) = author {
        options = options.with_author(author);
    }

    let stats = Exporter::new(&scene)
        .with_options(options)
        .export_to_path(&args.output)
        .with_context(|| format!("export '{}'", args.output.display()))?;

    println!("{}: {} chunks, {} bytes", args.output.display(), stats.chunks, stats.bytes);
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    info!("Opening file: {}", path.display());
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn cmd_info(path: &Path) -> anyhow::Result<()> {
    let data = read_file(path)?;
    let reader = ChunkReader::new(&data).with_context(|| format!("'{}'", path.display()))?;
    let chunks = reader.chunks()?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0;
    for chunk in &chunks {
        *counts.entry(chunk.tag_str()).or_default() += 1;
        total += 1;
        for child in nested(&reader, chunk)? {
            *counts.entry(child.tag_str()).or_default() += 1;
            total += 1;
        }
    }

    println!("File: {}", path.display());
    println!("Size: {} bytes", data.len());
    println!();
    println!("Chunks:");
    for (tag, count) in &counts {
        println!("  {}: {}", tag, count);
    }
    println!();
    println!("Total chunks: {}", total);
    Ok(())
}

fn cmd_tree(path: &Path) -> anyhow::Result<()> {
    let data = read_file(path)?;
    let reader = ChunkReader::new(&data).with_context(|| format!("'{}'", path.display()))?;

    println!("File: {}", path.display());
    println!();
    for chunk in reader.chunks()? {
        print_chunk(&chunk, 0);
        for child in nested(&reader, &chunk)? {
            print_chunk(&child, 1);
        }
    }
    Ok(())
}

fn print_chunk(chunk: &ChunkHeader, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{}{} id={} v{} len={}",
        indent,
        chunk.tag_str(),
        chunk.id,
        chunk.version,
        chunk.data_len
    );
}

/// Chunks nested inside a spline container.
fn nested(reader: &ChunkReader<'_>, chunk: &ChunkHeader) -> anyhow::Result<Vec<ChunkHeader>> {
    if &chunk.tag != tags::SPLINE {
        return Ok(Vec::new());
    }
    let mut r = reader.payload_reader(chunk);
    r.read_string()?;
    r.read_u32()?;
    Ok(reader.children(chunk, r.pos())?)
}
