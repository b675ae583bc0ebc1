//! Show runner: redirector plus fixed-rate tick loop

use anyhow::{Context, Result};
use lightshow_control::{stop_code, Redirector, RedirectorConfig, StartStatus};
use lightshow_core::{ShowEngine, ShowSettings, UniverseBuffer};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::headless::HeadlessHost;

/// Command-line overrides of the show settings
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Listen endpoint, `<ip>[:port]`
    pub listen: Option<String>,
    /// Forward endpoint, `<ip>[:port]`
    pub forward: Option<String>,
    /// Height of the floor plane beams stop at
    pub floor: Option<f32>,
}

/// Run the show until Ctrl-C
pub async fn run(settings: ShowSettings, options: RunOptions) -> Result<()> {
    let messages = &settings.art_net.messages;
    let buffer = UniverseBuffer::new();
    let mut host = HeadlessHost::new(options.floor);

    let mut engine =
        ShowEngine::from_settings(&settings, &mut host).context("Invalid show settings")?;

    let config = match RedirectorConfig::from_settings(&settings.art_net)
        .with_overrides(options.listen.as_deref(), options.forward.as_deref())
    {
        Ok(config) => config,
        Err(e) => {
            println!("{}", messages.for_start(StartStatus::Failed.code()));
            engine.shutdown(&mut host);
            return Err(e).context("Invalid endpoint");
        }
    };

    let redirector = Redirector::new(buffer.clone());
    let started = redirector.start(config).await;
    println!("{}", messages.for_start(StartStatus::from(&started).code()));
    if let Err(e) = started {
        engine.shutdown(&mut host);
        return Err(e).context("Failed to start the Art-Net redirector");
    }

    let mut interval = tokio::time::interval(settings.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let report_every = (u64::from(settings.tick_rate_hz) * 30).max(1);

    info!(
        "Show running: {} fixtures at {} Hz, Ctrl-C to stop",
        engine.fixture_count(),
        settings.tick_rate_hz
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.tick(&buffer, &mut host);
                if engine.tick_index() % report_every == 0 {
                    info!(
                        "Tick {}: {:?}, {} beams lit, universes {:?}",
                        engine.tick_index(),
                        redirector.stats(),
                        host.beam_count(),
                        buffer.populated_universes()
                    );
                }
            }
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                break;
            }
        }
    }

    let stopped = redirector.stop().await;
    println!("{}", messages.for_stop(stop_code(&stopped)));

    engine.shutdown(&mut host);
    if let Some(reason) = redirector.last_error() {
        warn!("Last redirector error: {}", reason);
    }
    info!(
        "Show stopped after {} ticks ({} proxies left)",
        engine.tick_index(),
        host.proxy_count()
    );

    Ok(())
}
