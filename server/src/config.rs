use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_STATIC_DIR: &str = "./static";
const DEFAULT_OUTBOX_CAPACITY: usize = 256;
const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_HEARTBEAT_SECS: u64 = 5;
const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "canvas-relay-server",
    about = "Relays shared canvas drawing events between browsers"
)]
pub struct Config {
    /// Address the HTTP server listens on.
    #[arg(long, env = "RELAY_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Directory served under /static.
    #[arg(long, env = "RELAY_STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// Broadcast frames buffered per connection. A connection whose outbox
    /// overflows is disconnected.
    #[arg(long, env = "RELAY_OUTBOX_CAPACITY", default_value_t = DEFAULT_OUTBOX_CAPACITY)]
    pub outbox_capacity: usize,

    /// Largest inbound message in bytes, after reassembling fragments.
    /// Canvas snapshots are data URLs and easily exceed a few hundred KiB.
    #[arg(long, env = "RELAY_MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Seconds between heartbeat pings sent to each connection.
    #[arg(long, env = "RELAY_HEARTBEAT_SECS", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    pub heartbeat_secs: u64,

    /// Connections silent for longer than this are closed.
    #[arg(long, env = "RELAY_CLIENT_TIMEOUT_SECS", default_value_t = DEFAULT_CLIENT_TIMEOUT_SECS)]
    pub client_timeout_secs: u64,
}

impl Config {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            client_timeout_secs: DEFAULT_CLIENT_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_overrides_from_arguments() {
        let config = Config::parse_from([
            "canvas-relay-server",
            "--bind",
            "0.0.0.0:9000",
            "--outbox-capacity",
            "16",
            "--client-timeout-secs",
            "3",
            "--max-frame-size",
            "1048576",
        ]);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.outbox_capacity, 16);
        assert_eq!(config.client_timeout(), Duration::from_secs(3));
        assert_eq!(config.max_frame_size, 1024 * 1024);
    }

    #[test]
    fn it_allows_frames_larger_than_the_protocol_default() {
        assert!(Config::default().max_frame_size > 64 * 1024);
    }
}
