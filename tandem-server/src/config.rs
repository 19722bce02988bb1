use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use tandem_core::IceServerConfig;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

#[derive(Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ServerConfig {
    /// Read the listening address and ICE server list from the
    /// environment. `TURN_URL` (with optional `TURN_USERNAME` /
    /// `TURN_CREDENTIAL`) is appended after the STUN entry when set.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("TANDEM_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
            .parse()
            .context("TANDEM_ADDR is not a valid socket address")?;

        let stun_url = env::var("STUN_URL").unwrap_or_else(|_| DEFAULT_STUN_URL.to_string());

        let mut ice_servers = vec![IceServerConfig {
            urls: vec![stun_url],
            username: None,
            credential: None,
        }];

        if let Ok(turn_url) = env::var("TURN_URL") {
            ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        Ok(Self {
            listen_addr,
            ice_servers,
        })
    }
}
