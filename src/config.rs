use clap::Parser;
use std::path::PathBuf;

use crate::codec::DEFAULT_MAX_FRAME_SIZE;

pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_DUMP_PATH: &str = "dump.my_rdb";
pub const DEFAULT_DUMP_INTERVAL: u64 = 300;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "rudis", version, about)]
pub struct Config {
    /// The port to listen on
    #[arg(short, long, env = "RUDIS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The address to bind to
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Where snapshots are loaded from at startup and written to
    #[arg(long, env = "RUDIS_DUMP_PATH", default_value = DEFAULT_DUMP_PATH)]
    pub dump_path: PathBuf,

    /// Seconds between periodic snapshots, 0 disables them
    #[arg(long, default_value_t = DEFAULT_DUMP_INTERVAL)]
    pub dump_interval: u64,

    /// Largest request, in bytes, the server buffers before dropping it
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            dump_path: PathBuf::from(DEFAULT_DUMP_PATH),
            dump_interval: DEFAULT_DUMP_INTERVAL,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let config = Config::try_parse_from([
            "rudis",
            "-p",
            "7000",
            "--bind",
            "0.0.0.0",
            "--dump-path",
            "/tmp/rudis.rdb",
            "--dump-interval",
            "0",
            "--max-frame-size",
            "1024",
        ])
        .unwrap();

        assert_eq!(
            config,
            Config {
                port: 7000,
                bind: "0.0.0.0".to_string(),
                dump_path: PathBuf::from("/tmp/rudis.rdb"),
                dump_interval: 0,
                max_frame_size: 1024,
            }
        );
    }

    #[test]
    fn invalid_port() {
        assert!(Config::try_parse_from(["rudis", "--port", "http"]).is_err());
    }
}
