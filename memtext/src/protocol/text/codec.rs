use crate::protocol::text::decoder::MemcacheTextDecoder;
use crate::protocol::text::encoder::MemcacheTextEncoder;
use crate::protocol::text::request::TextRequest;
use crate::protocol::text::response::TextResponse;
use bytes::BytesMut;
use std::io;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Errors fatal to a connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("line too long: {0} bytes without terminator")]
    LineTooLong(usize),
    #[error("connection closed in the middle of a frame")]
    Incomplete,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Text protocol codec: command lines and payloads in, response lines out.
pub struct MemcacheTextCodec {
    decoder: MemcacheTextDecoder,
    encoder: MemcacheTextEncoder,
}

impl MemcacheTextCodec {
    pub fn new(item_size_limit: u64) -> MemcacheTextCodec {
        MemcacheTextCodec {
            decoder: MemcacheTextDecoder::new(item_size_limit),
            encoder: MemcacheTextEncoder::new(),
        }
    }
}

impl Decoder for MemcacheTextCodec {
    type Item = TextRequest;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode(src)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decoder.decode_eof(buf)
    }
}

impl Encoder<TextResponse> for MemcacheTextCodec {
    type Error = ProtocolError;

    fn encode(&mut self, response: TextResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encoder.encode_response(&response, dst);
        Ok(())
    }
}
