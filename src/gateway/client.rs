// Vaultlink — Gateway Client
//
// The caller side of the gateway channel: connect once, then exchange as
// many request/response pairs as needed over the same connection. No read
// deadline is applied — an in-flight store operation is awaited to
// completion, and only a peer hang-up before a response counts as failure.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use super::protocol::{Request, Response};
use super::GatewayError;

pub struct GatewayClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl GatewayClient {
    /// Connect to a running gateway socket.
    pub async fn connect(socket_path: &Path) -> Result<Self, GatewayError> {
        let stream = UnixStream::connect(socket_path).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Send one request and await its response. Returns
    /// `GatewayError::ChannelClosed` if the peer disconnects before a
    /// response arrives.
    pub async fn exchange(&mut self, request: &Request) -> Result<Response, GatewayError> {
        let mut json = serde_json::to_string(request)?;
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(GatewayError::ChannelClosed);
        }

        Ok(serde_json::from_str(&line)?)
    }
}
