//! pplmed, the pplmatch daemon.
//!
//! Parses flags, builds the engine, populates it (from a CSV file or with
//! synthetic data), then accepts connections one thread per connection,
//! each handling exactly one framed request/response round trip before
//! closing.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};
use pplmatch::engine::{Config, MatchingEngine};
use pplmatch::proto::{PersonRecord, Request, Response};
use pplmatch::{loader, testdata, wire};
use std::fs::File;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

/// pplmed, the pplmatch daemon.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 3333)]
    port: u16,

    /// Number of grid cells per decimal degree.
    #[arg(long, default_value_t = 10)]
    resolution: u32,

    /// Maximum number of matches a single find returns.
    #[arg(long = "result-cap", default_value_t = 10)]
    result_cap: usize,

    /// Maximum age difference (in years) a match may have from the
    /// requested age.
    #[arg(long = "max-age-difference", default_value_t = 10)]
    max_age_difference: u32,

    /// Worker count for a single find; defaults to hardware parallelism.
    #[arg(long = "per-find-concurrency")]
    per_find_concurrency: Option<usize>,

    /// Path to a CSV file of `id,name,date_of_birth,latitude,longitude`
    /// rows. If omitted, synthetic data is generated instead.
    #[arg(long)]
    ppldata: Option<String>,

    /// Size of the synthetic database, used only when `--ppldata` is
    /// omitted.
    #[arg(long = "test-database-size", default_value_t = 10_000_000)]
    test_database_size: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.port == 0 {
        anyhow::bail!("--port must be in 1..=65535");
    }

    let config = Config {
        resolution: args.resolution,
        max_age_difference: args.max_age_difference,
        result_cap: args.result_cap,
        per_find_concurrency: args.per_find_concurrency,
        today_fn: Box::new(today),
    };
    let mut engine = MatchingEngine::build(config).context("failed to build matching engine")?;

    populate(&mut engine, &args)?;

    let engine = Arc::new(engine);
    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .with_context(|| format!("failed to bind port {}", args.port))?;
    info!("pplmed listening on port {}", args.port);
    println!("pplMe: server up and running and listening on port {}", args.port);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("failed to accept connection: {e}");
                continue;
            }
        };
        let engine = Arc::clone(&engine);
        std::thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &engine) {
                warn!("connection handling failed: {e}");
            }
        });
    }

    Ok(())
}

fn populate(engine: &mut MatchingEngine, args: &Args) -> Result<()> {
    match &args.ppldata {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
            let summary = loader::load_csv(engine, file)?;
            info!(
                "loaded {} people from {path} ({} rows skipped)",
                summary.loaded,
                summary.skipped.len()
            );
            for (line, reason) in &summary.skipped {
                warn!("{path}:{line}: {reason}");
            }
        }
        None => {
            info!("no --ppldata given; generating {} synthetic people", args.test_database_size);
            for person in testdata::generate(args.test_database_size, rand::random(), today()) {
                engine.add_person(person);
            }
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream, engine: &MatchingEngine) -> Result<()> {
    let body = match wire::read_message(&mut stream)? {
        Some(body) => body,
        None => return Ok(()), // peer closed without sending a request
    };
    let request = Request::decode(&body)?;
    let origin = pplmatch::GeoPosition::new(request.latitude, request.longitude)?;
    let people = engine.find_matching(origin, request.age);

    let response = Response {
        people: people.iter().map(PersonRecord::from_person).collect(),
    };
    let mut out = Vec::new();
    response.encode(&mut out)?;
    wire::write_message(&mut stream, &out)?;
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
