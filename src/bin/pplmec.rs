//! pplmec, the pplmatch client.
//!
//! Opens one connection, sends one framed request, prints the response
//! people to stdout, and exits.

use anyhow::{Context, Result};
use clap::Parser;
use pplmatch::proto::{Request, Response};
use pplmatch::wire;
use std::net::TcpStream;

/// pplmec, the pplmatch client.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Host the daemon is listening on.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port the daemon is listening on.
    #[arg(long, default_value_t = 3333)]
    port: u16,

    /// Latitude to search near.
    #[arg(long)]
    latitude: f64,

    /// Longitude to search near.
    #[arg(long)]
    longitude: f64,

    /// Age (in years) to search near.
    #[arg(long)]
    age: i32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut stream = TcpStream::connect((args.host.as_str(), args.port))
        .with_context(|| format!("failed to connect to {}:{}", args.host, args.port))?;

    let request = Request {
        latitude: args.latitude,
        longitude: args.longitude,
        age: args.age,
    };
    let mut body = Vec::new();
    request.encode(&mut body)?;
    wire::write_message(&mut stream, &body)?;

    let response_body = wire::read_message(&mut stream)?
        .context("server closed the connection without sending a response")?;
    let response = Response::decode(&response_body)?;

    if response.people.is_empty() {
        println!("No matches found.");
    } else {
        println!("Found {} match(es):", response.people.len());
        for person in &response.people {
            println!(
                "  {}  {}  born {}  at ({:.4}, {:.4})",
                person.id, person.name, person.date_of_birth, person.latitude, person.longitude
            );
        }
    }

    Ok(())
}
