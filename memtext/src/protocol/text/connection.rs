use crate::protocol::text::codec::{MemcacheTextCodec, ProtocolError};
use crate::protocol::text::request::TextRequest;
use crate::protocol::text::response::TextResponse;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Framed;

const READ_BUFFER_CAPACITY: usize = 16 * 1024;

/// A client socket framed with the text codec.
pub struct MemcacheTextConnection<S> {
    framed: Framed<S, MemcacheTextCodec>,
}

impl<S> MemcacheTextConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(socket: S, item_size_limit: u64) -> Self {
        MemcacheTextConnection {
            framed: Framed::with_capacity(
                socket,
                MemcacheTextCodec::new(item_size_limit),
                READ_BUFFER_CAPACITY,
            ),
        }
    }

    /// Next request, `None` on a clean end of stream.
    pub async fn read_frame(&mut self) -> Result<Option<TextRequest>, ProtocolError> {
        self.framed.next().await.transpose()
    }

    pub async fn write(&mut self, response: TextResponse) -> Result<(), ProtocolError> {
        self.framed.send(response).await
    }

    pub async fn shutdown(&mut self) -> Result<(), ProtocolError> {
        SinkExt::<TextResponse>::flush(&mut self.framed).await?;
        self.framed.get_mut().shutdown().await?;
        Ok(())
    }
}
