//! Example: Reading mixed points from the expansion areas
//!
//! Run with: cargo run --example read_expansion -- 127.0.0.1:9991
//!
//! This example demonstrates:
//! - Configuring a client and dialing eagerly
//! - One mixed bit/byte/word read across expansion areas
//! - Logging with `RUST_LOG=toyopuc=trace` to see every frame

use std::time::Duration;

use toyopuc::utils::format_frame;
use toyopuc::{Client, ClientConfig, ExpansionMultipoint, ExpansionPoint};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> toyopuc::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9991".to_string());

    let config = ClientConfig::new(address).with_timeout(Duration::from_secs(3));
    let client = Client::new(config)?;
    client.connect()?;

    // One bit, one byte and one word; the reply carries them in that order.
    let points = ExpansionMultipoint::new()
        .with_bit(ExpansionPoint::new(112, 3072))
        .with_byte(ExpansionPoint::new(0, 8192))
        .with_word(ExpansionPoint::new(8, 0));

    match client.read_data_expansion_multipoint(&points) {
        Ok(data) => info!(data = %format_frame(&data), "read expansion points"),
        Err(e) => error!(error = %e, "read failed"),
    }

    client.close()
}
