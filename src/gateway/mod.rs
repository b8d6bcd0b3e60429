// Vaultlink — Gateway Module
//
// Carries the typed request/response protocol between client surfaces and
// the record service over a long-lived Unix domain socket. A connection may
// serve many exchanges; no deadline is ever imposed on an in-flight
// operation, since store round trips are allowed to run to completion.

mod client;
mod protocol;
mod uds;

use thiserror::Error;

pub use client::GatewayClient;
pub use protocol::{RecordView, Request, Response};
pub use uds::{default_socket_path, UdsServer};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel closed before a response was received")]
    ChannelClosed,

    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}
