use color_eyre::{eyre::eyre, Result};
use padbridge::adapter::{Adapter, Bridging};
use padbridge::config::AdapterConfig;
use padbridge::controller::GenericHidDecoder;
use padbridge::feedback::{FbType, FeedbackWorker, GenericFb, RawFeedback, WirelessFeedback};
use padbridge::wired::{WiredSystem, WIRED_MAX_DEV};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Logs feedback instead of sending it over the air
struct LogPeer(u8);

impl WirelessFeedback for LogPeer {
    fn send(&mut self, fb: &GenericFb) {
        info!(
            "Peer {} <- {} {} ({}us)",
            self.0,
            fb.fb_type,
            if fb.state { "on" } else { "off" },
            fb.duration_us
        );
    }
}

/// Replays hex-encoded wireless reports from stdin
///
/// Each line is `<dev_id> <report hex>`, or `fb <port> <payload hex>` to
/// inject a console rumble request.
#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(AdapterConfig::default_path);
    let config = AdapterConfig::load(&path).await?;

    let system = match config.system {
        WiredSystem::Auto => {
            warn!("No wired system configured, assuming vampire4sa");
            WiredSystem::Vampire4Sa
        }
        system => system,
    };
    let mut adapter = Adapter::create(config, Arc::new(GenericHidDecoder))
        .configure(system)
        .map_err(|e| eyre!("Failed to configure adapter: {}", e))?;

    let shutdown = CancellationToken::new();
    let bridge = adapter
        .feedback_bridge()
        .ok_or_else(|| eyre!("Adapter has no wired device"))?;
    let mut worker = FeedbackWorker::new(adapter.feedback_queue(), bridge);
    for port in 0..WIRED_MAX_DEV as u8 {
        worker.bridge_mut().bind_peer(port, Box::new(LogPeer(port)));
    }
    let worker_handle = worker.spawn(shutdown.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => handle_line(&mut adapter, line.trim()),
                    None => break,
                }
            }
        }
    }

    shutdown.cancel();
    worker_handle
        .await
        .map_err(|e| eyre!("Feedback worker failed: {}", e))?;
    let dropped = adapter.feedback_queue().dropped();
    if dropped > 0 {
        warn!("{} feedback request(s) dropped", dropped);
    }
    Ok(())
}

fn handle_line(adapter: &mut Adapter<Bridging>, line: &str) {
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        ["fb", port, data] => match (port.parse::<u8>(), hex::decode(data)) {
            (Ok(port), Ok(payload)) => {
                adapter.submit_feedback(RawFeedback::new(port, FbType::Rumble, &payload));
            }
            _ => warn!("Ignoring malformed feedback line: {}", line),
        },
        [dev_id, data] => bridge_report(adapter, dev_id, data),
        _ => warn!("Ignoring malformed line: {}", line),
    }
}

fn bridge_report(adapter: &mut Adapter<Bridging>, dev_id: &str, data: &str) {
    let (dev_id, raw) = match (dev_id.parse::<u8>(), hex::decode(data)) {
        (Ok(dev_id), Ok(raw)) => (dev_id, raw),
        _ => {
            warn!("Ignoring malformed report: {} {}", dev_id, data);
            return;
        }
    };

    match adapter.bridge(dev_id, &raw) {
        Ok(ports) => {
            for port in ports.ports() {
                if let Some(latch) = adapter.latch(port) {
                    info!("Port {} latch cmd 0x{:02X} payload {:08X}", port, latch.cmd, latch.payload);
                }
            }
        }
        Err(e) => debug!("Report from source {} dropped: {}", dev_id, e),
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
