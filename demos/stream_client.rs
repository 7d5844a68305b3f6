//! Stream client demo
//!
//! Run with: cargo run --example stream_client [WS_URL]
//!
//! Connects to a stream server, keeps the newest frame in a latest-value
//! slot, and logs frame id / latency / state shape once per second. An
//! external viewer would poll the same slot.

use std::time::Duration;

use framecast::{ClientConfig, ImageRole, Receiver, StreamState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8765".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framecast=info".parse()?)
                .add_directive("stream_client=info".parse()?),
        )
        .init();

    let receiver = Receiver::new(ClientConfig::new(url));
    let slot = receiver.slot();

    let reporter = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let Some(latest) = slot.peek() else {
                println!("no frame yet");
                continue;
            };

            let left_bytes = latest
                .frame
                .images
                .get(&ImageRole::Left)
                .map(|img| img.len())
                .unwrap_or(0);

            match StreamState::from_meta(&latest.frame.meta) {
                Ok(state) => println!(
                    "frame {} latency {:.2} ms, left image {} B, {} action chunk rows",
                    latest.frame.frame_id,
                    latest.latency_ms(),
                    left_bytes,
                    state.remaining_action_chunks().len(),
                ),
                Err(e) => println!(
                    "frame {} latency {:.2} ms, invalid meta: {}",
                    latest.frame.frame_id,
                    latest.latency_ms(),
                    e
                ),
            }
        }
    });

    let reason = receiver.run().await?;
    println!("connection closed: {:?}", reason);

    reporter.abort();
    Ok(())
}
