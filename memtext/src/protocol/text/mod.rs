pub mod codec;
pub mod connection;
pub mod decoder;
pub mod encoder;
pub mod request;
pub mod response;

pub use codec::{MemcacheTextCodec, ProtocolError};
pub use request::TextRequest;
pub use response::TextResponse;
