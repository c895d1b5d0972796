use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use ckmp::{Layout, Map, MapReader, MapWriter, ReadOptions};

#[derive(Parser)]
#[command(name = "ckmp")]
#[command(about = "Inspect and re-encode CkMp map files")]
struct Cli {
    /// Fail on unknown top-level sections instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    /// Log section-level detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a map
    Info { file: PathBuf },
    /// Dump the parsed model as JSON
    Dump {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Read and write a map back, reporting whether the bytes survive unchanged
    Roundtrip {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the script export layout instead of the full map layout
        #[arg(long)]
        scripts: bool,
    },
}

fn read(path: &PathBuf, strict: bool) -> Result<(Vec<u8>, Map), Box<dyn std::error::Error>> {
    let options = if strict { ReadOptions::strict() } else { ReadOptions::default() };
    let data = std::fs::read(path)?;
    let map = MapReader::new(options).read(&data)?;
    Ok((data, map))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { file } => {
            let (data, map) = read(&file, cli.strict)?;
            let summary = json!({
                "bytes": data.len(),
                "size": map.height_map.as_ref().map(|h| [h.width(), h.height()]),
                "border": map.height_map.as_ref().map(|h| h.border()),
                "textures": map.tiles.as_ref().map(|t| t.textures().iter().map(|x| x.name.clone()).collect::<Vec<_>>()),
                "blend_tiles": map.tiles.as_ref().map(|t| t.blend_tiles().len()),
                "time_of_day": map.lighting.map(|l| l.time_of_day),
                "players": map.players.iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
                "teams": map.teams.len(),
                "objects": map.objects.len(),
                "waypoints": map.waypoints().count(),
                "areas": map.areas.len(),
                "paths": map.paths.len(),
                "scripts": map.scripts().count(),
                "skipped_sections": map.unrecognized_sections,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Dump { file, pretty } => {
            let (_, map) = read(&file, cli.strict)?;
            let out = if pretty {
                serde_json::to_string_pretty(&map)?
            } else {
                serde_json::to_string(&map)?
            };
            println!("{out}");
        }
        Commands::Roundtrip { file, output, scripts } => {
            let (data, map) = read(&file, cli.strict)?;
            let layout = if scripts { Layout::Scripts } else { Layout::Map };
            let written = MapWriter::new(layout).write(&map)?;

            if written == data {
                println!("identical ({} bytes)", data.len());
            } else {
                let first_diff = data
                    .iter()
                    .zip(&written)
                    .position(|(a, b)| a != b)
                    .unwrap_or(data.len().min(written.len()));
                println!(
                    "differs: read {} bytes, wrote {} bytes, first difference at {first_diff:#x}",
                    data.len(),
                    written.len()
                );
            }

            if let Some(path) = output {
                std::fs::write(&path, &written)?;
                eprintln!("wrote {}", path.display());
            }
        }
    }
    Ok(())
}
