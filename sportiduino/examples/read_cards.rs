//! Card reading example
//!
//! Polls the master station for cards and prints each one.
//! Set `SPORTIDUINO_PORT` or pass the port as the first argument to skip
//! port discovery.

use std::time::Duration;

use sportiduino::{MasterStation, StationConfig};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    
    let port = std::env::var("SPORTIDUINO_PORT")
        .ok()
        .or_else(|| std::env::args().nth(1));
    
    let mut config = StationConfig::new();
    if let Some(port) = port {
        config = config.with_port(port);
    }
    
    let mut station = MasterStation::connect(config).await?;
    
    println!("Connected on {}", station.port());
    if let Some(version) = station.version() {
        println!("Firmware: {}", version);
    }
    
    println!("Waiting for cards, press Ctrl+C to stop");
    
    loop {
        match station.poll_card().await? {
            Some(card) => {
                println!("{}", card);
                station.beep_ok().await?;
                // Give the runner time to take the card away
                sleep(Duration::from_secs(2)).await;
            }
            None => sleep(Duration::from_millis(500)).await,
        }
    }
}
