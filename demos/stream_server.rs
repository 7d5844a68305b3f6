//! Stream server demo
//!
//! Run with: cargo run --example stream_server MEDIA_DIR [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example stream_server ./media                  # binds to 0.0.0.0:8765
//!   cargo run --example stream_server ./media localhost        # binds to 127.0.0.1:8765
//!   cargo run --example stream_server ./media 0.0.0.0:9000     # binds to 0.0.0.0:9000
//!
//! MEDIA_DIR is a directory of pre-encoded .jpg files; consecutive windows
//! of four files become the left/center/right/back views of each frame.

use std::net::SocketAddr;

use framecast::{ImageBank, RandomStateFeed, ServerConfig, StreamServer};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8765
/// - "127.0.0.1" -> 127.0.0.1:8765
/// - "127.0.0.1:9000" -> 127.0.0.1:9000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8765;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: stream_server MEDIA_DIR [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  MEDIA_DIR    Directory of pre-encoded .jpg source images");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8765)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let media_dir = match args.get(1) {
        Some(dir) => dir.clone(),
        None => {
            print_usage();
            std::process::exit(1);
        }
    };

    let bind_addr = match args.get(2) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:8765".parse().unwrap(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framecast=info".parse()?)
                .add_directive("stream_server=info".parse()?),
        )
        .init();

    // Fatal before serving if the media source cannot produce frames
    let bank = ImageBank::from_dir(&media_dir)?;
    println!("preloaded {} image sets into RAM", bank.len());

    let config = ServerConfig::default().bind(bind_addr).media_dir(media_dir);
    println!(
        "ws://{} streaming @ {} fps ({}x{})",
        config.bind_addr, config.target_fps, config.image_width, config.image_height
    );

    let server = StreamServer::new(config, bank, RandomStateFeed);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    Ok(())
}
