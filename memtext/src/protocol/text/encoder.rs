use crate::protocol::text::response::{TextResponse, ValueEntry};
use bytes::{BufMut, BytesMut};
use std::fmt::Write;

const CRLF: &[u8] = b"\r\n";
const END: &[u8] = b"END\r\n";

#[derive(Default)]
pub struct MemcacheTextEncoder {}

impl MemcacheTextEncoder {
    pub fn new() -> MemcacheTextEncoder {
        MemcacheTextEncoder {}
    }

    pub fn encode_response(&self, response: &TextResponse, dst: &mut BytesMut) {
        match response {
            TextResponse::Stored => dst.put_slice(b"STORED\r\n"),
            TextResponse::NotStored => dst.put_slice(b"NOT_STORED\r\n"),
            TextResponse::Deleted => dst.put_slice(b"DELETED\r\n"),
            TextResponse::NotFound => dst.put_slice(b"NOT_FOUND\r\n"),
            TextResponse::Ok => dst.put_slice(b"OK\r\n"),
            TextResponse::Values(entries) => {
                for entry in entries {
                    self.encode_value(entry, dst);
                }
                dst.put_slice(END);
            }
            TextResponse::Stats(stats) => {
                for (name, value) in stats {
                    self.put_line(dst, format_args!("STAT {} {}", name, value));
                }
                dst.put_slice(END);
            }
            TextResponse::Numeric(value) => self.put_line(dst, format_args!("{}", value)),
            TextResponse::Version(version) => {
                self.put_line(dst, format_args!("VERSION {}", version))
            }
            TextResponse::Error => dst.put_slice(b"ERROR\r\n"),
            TextResponse::ClientError(message) => {
                self.put_line(dst, format_args!("CLIENT_ERROR {}", message))
            }
            TextResponse::ServerError(message) => {
                self.put_line(dst, format_args!("SERVER_ERROR {}", message))
            }
        }
    }

    fn encode_value(&self, entry: &ValueEntry, dst: &mut BytesMut) {
        dst.reserve(entry.key.len() + entry.value.len() + 32);
        dst.put_slice(b"VALUE ");
        dst.put_slice(&entry.key);
        match entry.cas {
            Some(cas) => self.put_line(
                dst,
                format_args!(" {} {} {}", entry.flags, entry.value.len(), cas),
            ),
            None => self.put_line(dst, format_args!(" {} {}", entry.flags, entry.value.len())),
        }
        // value bytes go out verbatim
        dst.put_slice(&entry.value);
        dst.put_slice(CRLF);
    }

    fn put_line(&self, dst: &mut BytesMut, args: std::fmt::Arguments<'_>) {
        // writing into BytesMut cannot fail
        let _ = dst.write_fmt(args);
        dst.put_slice(CRLF);
    }
}
