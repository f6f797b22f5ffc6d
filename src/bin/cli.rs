//! AtlasPage CLI
//!
//! Workload generator and record inspector for the paged byte store.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use atlaspage::{ByteStore, Config};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{fmt, EnvFilter};

/// AtlasPage CLI
#[derive(Parser, Debug)]
#[command(name = "atlaspage-cli")]
#[command(about = "Paged byte store for delta-compressed adjacency records")]
#[command(version)]
struct Args {
    /// Page size in bytes (power of two)
    #[arg(short, long, default_value = "32768")]
    page_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write random adjacency lists from several threads, then read them back
    Bench {
        /// Number of nodes (one record per node)
        #[arg(short, long, default_value = "100000")]
        nodes: u64,

        /// Maximum out-degree per node
        #[arg(short, long, default_value = "64")]
        degree: usize,

        /// Worker threads for both phases
        #[arg(short, long, default_value = "4")]
        threads: u64,

        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Encode one record and dump its bytes and decoded values
    Inspect {
        /// Padding bytes to skip before the record
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Targets, in non-decreasing order
        #[arg(required = true)]
        targets: Vec<u64>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlaspage=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    tracing::info!("AtlasPage CLI v{}", atlaspage::VERSION);

    let config = Config::builder()
        .page_size(args.page_size)
        .pool_capacity(64)
        .build();
    let store = match ByteStore::with_config(config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to create store: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Commands::Bench {
            nodes,
            degree,
            threads,
            seed,
        } => bench(&store, nodes, degree, threads.max(1), seed),
        Commands::Inspect { offset, targets } => inspect(&store, offset, &targets),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
    if let Err(e) = store.release() {
        tracing::error!("Failed to release store: {}", e);
    }
}

/// Targets for `node`, reproducible from `seed`
fn adjacency(seed: u64, node: u64, nodes: u64, max_degree: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed ^ node.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let degree = rng.gen_range(0..=max_degree);
    let mut targets: Vec<u64> = (0..degree).map(|_| rng.gen_range(0..nodes)).collect();
    targets.sort_unstable();
    targets
}

fn bench(
    store: &Arc<ByteStore>,
    nodes: u64,
    degree: usize,
    threads: u64,
    seed: u64,
) -> atlaspage::Result<()> {
    // Write phase
    let started = Instant::now();
    let offsets: Vec<Vec<(u64, u64)>> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                s.spawn(move || -> atlaspage::Result<Vec<(u64, u64)>> {
                    (t..nodes)
                        .step_by(threads as usize)
                        .map(|node| {
                            let targets = adjacency(seed, node, nodes, degree);
                            Ok((node, store.write_record(&targets)?))
                        })
                        .collect()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<atlaspage::Result<_>>()
    })?;
    let write_time = started.elapsed();

    // Read phase; the scope above joined every writer
    let started = Instant::now();
    let decoded: u64 = thread::scope(|s| {
        let handles: Vec<_> = offsets
            .iter()
            .map(|chunk| {
                s.spawn(move || -> atlaspage::Result<u64> {
                    let mut values = 0u64;
                    for &(node, offset) in chunk {
                        let reader = store.read_record(offset)?;
                        let got: Vec<u64> = reader.collect();
                        if got != adjacency(seed, node, nodes, degree) {
                            return Err(atlaspage::AtlasError::InvalidRecord(format!(
                                "node {} decoded incorrectly",
                                node
                            )));
                        }
                        values += got.len() as u64;
                    }
                    Ok(values)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .sum::<atlaspage::Result<u64>>()
    })?;
    let read_time = started.elapsed();

    println!("nodes:        {}", nodes);
    println!("values:       {}", decoded);
    println!("bytes used:   {}", store.allocated());
    println!("pages:        {} x {} B", store.page_count(), store.page_size());
    println!(
        "bytes/value:  {:.2}",
        store.allocated() as f64 / decoded.max(1) as f64
    );
    println!(
        "write:        {:?} ({:.1} M values/s)",
        write_time,
        decoded as f64 / write_time.as_secs_f64() / 1e6
    );
    println!(
        "read:         {:?} ({:.1} M values/s)",
        read_time,
        decoded as f64 / read_time.as_secs_f64() / 1e6
    );
    Ok(())
}

fn inspect(store: &ByteStore, padding: u64, targets: &[u64]) -> atlaspage::Result<()> {
    store.skip(padding);
    let len = atlaspage::codec::record_len(targets)?;
    let offset = store.write_record(targets)?;

    let bytes = store.read_range(offset, len)?;
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    let decoded: Vec<u64> = store.read_record(offset)?.collect();

    println!("offset:  {}", offset);
    println!("length:  {} bytes", len);
    println!("bytes:   {}", hex.join(" "));
    println!("decoded: {:?}", decoded);
    Ok(())
}
