//! Terminal driver for the Nektar topology pipelines.
//!
//! Every subcommand runs one core pipeline against the configured service
//! endpoints: decode a packet-tracer file, compile a DSL file, save the
//! result, and list/load/delete saved topologies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use nektar::config::ServiceConfig;
use nektar::remote::{HttpCompileService, HttpDecodeService, HttpSnippetStore};
use nektar::session::{Cabinet, EditorSession};
use nektar::topology::Topology;

#[derive(Parser)]
#[command(name = "nektar", about = "Build, compile and persist network topologies")]
struct Cli {
    /// Decode service endpoint (overrides NEKTAR_DECODE_URL).
    #[arg(long)]
    decode_url: Option<String>,

    /// Compile endpoint (overrides NEKTAR_COMPILE_URL).
    #[arg(long)]
    compile_url: Option<String>,

    /// XML conversion endpoint (overrides NEKTAR_CONVERT_URL).
    #[arg(long)]
    convert_url: Option<String>,

    /// Snippet store API root (overrides NEKTAR_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a .pkt topology file and print the derived DSL.
    Decode { file: PathBuf },

    /// Compile a DSL file and print the resulting topology.
    Compile { file: PathBuf },

    /// Compile a DSL file and save it under a title.
    Save { title: String, file: PathBuf },

    /// List saved topologies, newest first.
    List,

    /// Delete a saved topology by id.
    Delete { id: i64 },

    /// Load a saved topology and print its DSL and contents.
    Load {
        id: i64,
        /// Write the DSL to a file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env();
    if let Some(url) = cli.decode_url {
        config.decode_url = url;
    }
    if let Some(url) = cli.compile_url {
        config.compile_url = url;
    }
    if let Some(url) = cli.convert_url {
        config.convert_url = url;
    }
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    log::debug!("service endpoints: {:?}", config);

    let decoder = Arc::new(HttpDecodeService::new(config.decode_url.clone()));
    let compiler = Arc::new(HttpCompileService::new(
        config.compile_url.clone(),
        config.convert_url.clone(),
    ));
    let store = Arc::new(HttpSnippetStore::new(config.api_url.clone()));
    let mut session = EditorSession::new(decoder, compiler, store.clone());

    match cli.command {
        Command::Decode { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            session.select_file(file_name(&file), bytes)?;
            session.decode_file().await?;

            println!("{}", session.dsl());
            if let Some(topology) = session.topology() {
                print_topology(topology);
            }
        }

        Command::Compile { file } => {
            session.set_dsl(read_dsl(&file)?);
            session.compile().await?;
            if let Some(topology) = session.topology() {
                print_topology(topology);
            }
        }

        Command::Save { title, file } => {
            session.set_dsl(read_dsl(&file)?);
            session.compile().await?;
            let snippet = session.save(&title).await?;
            println!("saved '{}' as snippet {}", snippet.title, snippet.id);
        }

        Command::List => {
            let mut cabinet = Cabinet::new(store);
            cabinet.refresh().await?;
            if cabinet.snippets().is_empty() {
                println!("no saved topologies");
            }
            for snippet in cabinet.snippets() {
                println!(
                    "{:>6}  {}  {}",
                    snippet.id,
                    snippet.created_at.format("%Y-%m-%d %H:%M:%S"),
                    snippet.title
                );
            }
        }

        Command::Delete { id } => {
            let mut cabinet = Cabinet::new(store);
            cabinet.delete(id).await?;
            println!("deleted snippet {}", id);
        }

        Command::Load { id, out } => {
            let mut cabinet = Cabinet::new(store);
            cabinet.refresh().await?;
            let Some(snippet) = cabinet.get(id) else {
                bail!("no saved topology with id {}", id);
            };
            session.load_snippet(snippet)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, session.dsl())
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    println!("wrote DSL to {}", path.display());
                }
                None => println!("{}", session.dsl()),
            }
            if let Some(topology) = session.topology() {
                print_topology(topology);
            }
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_dsl(path: &Path) -> Result<String> {
    let dsl =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    if dsl.trim().is_empty() {
        bail!("{} is empty; nothing to compile", path.display());
    }
    Ok(dsl)
}

fn print_topology(topology: &Topology) {
    println!(
        "{} devices, {} links",
        topology.device_count(),
        topology.link_count()
    );
    for device in &topology.devices {
        println!(
            "  [{}] {} ({}) at {}, power {}, {} {} {} Mbps",
            device.id,
            device.name,
            device.device_type,
            device.coordinates,
            if device.powered_on { "on" } else { "off" },
            device.interface.name,
            device.interface.ip,
            device.interface.bandwidth_mbps,
        );
    }
    for link in &topology.links {
        println!("  {} <-> {}", link.from, link.to);
    }
}
