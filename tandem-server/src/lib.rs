pub mod config;
pub mod matchmaker;
pub mod relay;

pub use config::ServerConfig;
pub use matchmaker::{Matchmaker, MatchmakerCommand, PartnerMap};
pub use relay::{EventSink, RelayService, router, ws_handler};
