//! `chordsim` — command-line driver for the Chord simulator.
//!
//! Builds a ring from a config file and command-line overrides, then prints
//! routing state or traces queries.
//!
//! # Usage
//!
//! ```text
//! chordsim snapshot                         # JSON snapshot of the ring
//! chordsim -c ring.toml snapshot            # ring described by a config file
//! chordsim -m 3 -n 1 -n 4 fingers 1         # finger table of node 1
//! chordsim -m 3 -n 0 -n 4 lookup -s 0 -t 3  # trace a lookup
//! chordsim lookup -s 4 --key photo.jpg      # look up a named key
//! chordsim -r 4 churn --steps 20            # random joins and leaves
//! ```

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chord_sim::Simulation;
use chord_types::{NodeId, Route};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "chordsim", version, about = "Chord DHT routing simulator")]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the ring parameter M.
    #[arg(short = 'm', long, global = true)]
    bits: Option<u8>,

    /// Override the RNG seed.
    #[arg(long, global = true, env = "CHORDSIM_SEED")]
    seed: Option<u64>,

    /// Member to add with an explicit identifier (repeatable).
    #[arg(short, long = "node", global = true)]
    nodes: Vec<u32>,

    /// Number of members to add with random identifiers.
    #[arg(short, long, global = true)]
    random_nodes: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full ring snapshot as JSON.
    Snapshot {
        /// Print compact single-line JSON.
        #[arg(long)]
        compact: bool,
    },

    /// Print one member's finger table and owned keys.
    Fingers {
        /// The member to inspect.
        node: u32,
    },

    /// Trace the hops of a lookup.
    Lookup {
        /// Member the query enters the ring at.
        #[arg(short, long)]
        start: u32,

        /// Identifier to look up.
        #[arg(short, long, conflicts_with = "key", required_unless_present = "key")]
        target: Option<u32>,

        /// Key name to hash onto the ring and look up.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Apply random joins and leaves, reporting key migrations.
    Churn {
        /// Number of membership changes to apply.
        #[arg(long, default_value = "10")]
        steps: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if let Some(bits) = cli.bits {
        config.ring.bits = bits;
    }
    if cli.seed.is_some() {
        config.ring.seed = cli.seed;
    }
    if !cli.nodes.is_empty() {
        config.ring.nodes = cli.nodes;
    }
    if let Some(n) = cli.random_nodes {
        config.ring.random_nodes = n;
    }

    let mut sim = build_simulation(&config)?;

    match cli.command {
        Commands::Snapshot { compact } => cmd_snapshot(&sim, compact),
        Commands::Fingers { node } => cmd_fingers(&sim, NodeId::new(node)),
        Commands::Lookup { start, target, key } => {
            cmd_lookup(&mut sim, NodeId::new(start), target, key.as_deref())
        }
        Commands::Churn { steps } => cmd_churn(&mut sim, steps),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so stdout stays machine-readable.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Create a session and add the configured members.
fn build_simulation(config: &CliConfig) -> Result<Simulation> {
    let mut sim =
        Simulation::new(config.sim_config()).context("failed to start simulation session")?;

    for &n in &config.ring.nodes {
        sim.add_node(Some(NodeId::new(n)))
            .with_context(|| format!("failed to add node {n}"))?;
    }
    for _ in 0..config.ring.random_nodes {
        sim.add_node(None).context("failed to add random node")?;
    }

    info!(
        bits = sim.bits(),
        members = sim.members().len(),
        "ring ready"
    );
    Ok(sim)
}

// -----------------------------------------------------------------------
// chordsim snapshot
// -----------------------------------------------------------------------

fn cmd_snapshot(sim: &Simulation, compact: bool) -> Result<()> {
    let snapshot = sim.snapshot();
    let json = if compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{json}");
    Ok(())
}

// -----------------------------------------------------------------------
// chordsim fingers
// -----------------------------------------------------------------------

fn cmd_fingers(sim: &Simulation, node: NodeId) -> Result<()> {
    let table = sim.finger_table(node)?;
    let keys = sim.key_set(node)?;

    println!("Node {node} (M={}, N={})", sim.bits(), sim.space().size());
    println!("  {:>6}  {:>6}  {:>9}", "offset", "start", "successor");
    for (k, entry) in table.iter().enumerate() {
        println!(
            "  {:>6}  {:>6}  {:>9}",
            1u32 << k,
            entry.start,
            entry.successor
        );
    }

    let owned: Vec<String> = keys.iter().map(ToString::to_string).collect();
    println!("Owned keys ({}): {}", keys.len(), owned.join(" "));
    Ok(())
}

// -----------------------------------------------------------------------
// chordsim lookup
// -----------------------------------------------------------------------

fn cmd_lookup(
    sim: &mut Simulation,
    start: NodeId,
    target: Option<u32>,
    key: Option<&str>,
) -> Result<()> {
    let route = match (target, key) {
        (Some(t), _) => sim.lookup(NodeId::new(t), start)?,
        (None, Some(k)) => sim.lookup_key(k.as_bytes(), start)?,
        (None, None) => bail!("either --target or --key is required"),
    };
    print_route(&route);
    Ok(())
}

fn print_route(route: &Route) {
    let path: Vec<String> = route.hops.iter().map(ToString::to_string).collect();
    println!(
        "Lookup {} from {}: {} ({} hops)",
        route.target,
        route.start,
        path.join(" -> "),
        route.hop_count()
    );
    match route.owner() {
        Some(owner) => println!("Owner: {owner}"),
        None => println!("Unresolved: target unreachable under current ring state"),
    }
}

// -----------------------------------------------------------------------
// chordsim churn
// -----------------------------------------------------------------------

fn cmd_churn(sim: &mut Simulation, steps: usize) -> Result<()> {
    let capacity = sim.space().size() as usize;

    for step in 0..steps {
        let members = sim.members().len();
        // Join on even steps while there is room; always leave when full.
        let join = members == 0 || (members < capacity && step % 2 == 0);

        if join {
            let id = sim.add_node(None)?;
            println!(
                "step {step}: node {id} joined, {} keys moved",
                sim.last_migrations().len()
            );
        } else {
            let id = sim.remove_random_node()?;
            println!(
                "step {step}: node {id} left, {} keys moved",
                sim.last_migrations().len()
            );
        }

        for m in sim.last_migrations() {
            debug!(key = %m.key, from = %m.from, to = %m.to, "key migrated");
        }
    }

    let members: Vec<String> = sim.members().iter().map(ToString::to_string).collect();
    println!("Members ({}): {}", members.len(), members.join(" "));
    Ok(())
}
