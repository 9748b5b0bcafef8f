//! Server configuration from command-line flags and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Default port for the sketch server.
pub const DEFAULT_PORT: u16 = 9474;

/// Default upstream request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Command-line arguments for sketch-server.
#[derive(Debug, Clone, Parser)]
#[command(name = "sketch-server")]
#[command(about = "System Sketch web server and diagram generation endpoint")]
#[command(version)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(long, env = "SKETCH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind (loopback by default)
    #[arg(long, env = "SKETCH_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Upstream diagram generator URL; without it every request falls back
    #[arg(long, env = "SKETCH_GENERATOR_URL")]
    pub generator_url: Option<String>,

    /// Bearer token sent to the generator
    #[arg(long, env = "SKETCH_GENERATOR_KEY", hide_env_values = true)]
    pub generator_key: Option<String>,

    /// Directory with the web client (index.html, pkg/)
    #[arg(long, env = "SKETCH_WEB_DIR")]
    pub web_dir: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Bind address.
    pub bind: IpAddr,
    /// Upstream generator endpoint.
    pub generator_url: Option<String>,
    /// Bearer token for the generator.
    pub generator_key: Option<String>,
    /// Static web client directory.
    pub web_dir: PathBuf,
    /// Upstream request timeout.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            generator_url: None,
            generator_key: None,
            web_dir: default_web_dir(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Socket address to listen on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl From<CliArgs> for ServerConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            port: args.port,
            bind: args.bind,
            generator_url: args
                .generator_url
                .filter(|url| !url.trim().is_empty()),
            generator_key: args.generator_key.filter(|key| !key.trim().is_empty()),
            web_dir: args.web_dir.unwrap_or_else(default_web_dir),
            request_timeout: Duration::from_secs(args.request_timeout_secs.max(1)),
        }
    }
}

fn default_web_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../web")
}
