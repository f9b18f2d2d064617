//! Scripted session example
//!
//! Registers two simulated technologies, selects one for a stream, drives a
//! session through a short native event script and prints the canonical
//! notifications a host would receive.
//!
//! Run with: RUST_LOG=videotech_core=debug cargo run -p videotech-core --example scripted_session

use std::rc::Rc;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;
use videotech_core::sim::SimulatedProvider;
use videotech_core::{
    downgrade_host, ChannelHost, FactoryConfig, SessionId, StyleMap, TechRegistry, VideoFactory,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    videotech_core::init();

    println!("Videotech Core - Scripted Session Example");
    println!("==========================================\n");

    let html5 = SimulatedProvider::new();
    let plugin = SimulatedProvider::new();

    let mut registry: TechRegistry<()> = TechRegistry::new();
    registry.register(Rc::new(VideoFactory::new(html5.clone(), FactoryConfig::default())?))?;
    registry.register(Rc::new(VideoFactory::new(
        plugin.clone(),
        FactoryConfig::new("plugin", ["f4m", "mp4"]),
    )?))?;

    for caps in registry.capabilities() {
        println!("{}", serde_json::to_string(&caps)?);
    }

    let url = "https://cdn.example.com/live/master.m3u8";
    let technology = registry
        .select_for(url)?
        .ok_or_else(|| anyhow!("no technology can play {url}"))?;
    println!("\nSelected {} for {url}\n", technology.capability().technology_name());

    let (host, mut rx) = ChannelHost::new();
    let host = Rc::new(host);

    let mut style = StyleMap::new();
    style.insert("width".to_string(), "100%".to_string());
    let session = technology.create_session(&(), url, SessionId::generate(), downgrade_host(&host), &style)?;
    let backend = html5.last().ok_or_else(|| anyhow!("backend was not built"))?;

    session.load(false);
    backend.emit("canplaythrough");
    session.play();
    backend.emit("play");
    backend.emit("playing");
    for tick in 1..=4 {
        backend.advance_to(f64::from(tick) * 0.25);
    }

    session.set_volume(0.5);
    backend.emit("volumechange");
    backend.emit("volumechangeNew");

    // Native scrubbing is undone while seeking is locked
    session.set_can_seek(false);
    backend.user_seek(90.0);
    backend.emit("seeked");

    session.set_can_seek(true);
    session.seek(30.0);
    backend.emit("seeking");
    backend.emit("seeked");

    session.pause();
    backend.emit("pause");
    session.destroy();

    println!("Notifications:");
    while let Ok(event) = rx.try_recv() {
        println!("  {}", event.to_json());
    }
    println!("\nFinal state: {}", session.state());

    Ok(())
}
