mod event_sink;
mod relay_service;
mod ws_handler;

pub use event_sink::*;
pub use relay_service::*;
pub use ws_handler::*;
