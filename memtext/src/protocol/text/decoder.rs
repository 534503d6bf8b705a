use crate::cache::cache::MAX_KEY_LENGTH;
use crate::protocol::text::codec::ProtocolError;
use crate::protocol::text::request::{
    DeleteRequest, FlushRequest, GetRequest, IncrDecrRequest, StorageCommand, StorageRequest,
    TextRequest,
};
use bytes::{Buf, Bytes, BytesMut};
use std::{cmp, mem};
use tokio_util::codec::Decoder;

/// Longest command line accepted, terminator included.
pub const MAX_LINE_LENGTH: usize = 8192;

const TERMINATOR_LEN: usize = 2;
const BAD_FORMAT: &str = "bad command line format";
const BAD_DELTA: &str = "invalid numeric delta argument";
const NOREPLY: &[u8] = b"noreply";

/// Storage command line already parsed, waiting for its payload.
#[derive(Debug, PartialEq)]
struct PendingStorage {
    command: StorageCommand,
    key: Bytes,
    flags: u32,
    exptime: i64,
    bytes: usize,
    noreply: bool,
}

#[derive(Debug, PartialEq)]
enum DecoderState {
    AwaitingCommand,
    AwaitingPayload(PendingStorage),
    /// Skips a payload that will not be stored, then yields `reply`.
    Discarding { remaining: usize, reply: TextRequest },
}

/// Result of parsing one command line.
enum ParsedLine {
    Complete(TextRequest),
    Storage(PendingStorage),
    /// Malformed storage line with a usable length, its payload is skipped.
    InvalidWithPayload(usize, &'static str),
}

pub struct MemcacheTextDecoder {
    state: DecoderState,
    item_size_limit: u64,
    // bytes of the buffer already searched for a line terminator
    scanned: usize,
}

impl MemcacheTextDecoder {
    pub fn new(item_size_limit: u64) -> MemcacheTextDecoder {
        MemcacheTextDecoder {
            state: DecoderState::AwaitingCommand,
            item_size_limit,
            scanned: 0,
        }
    }

    /// True when a frame has been partially consumed.
    pub fn is_mid_frame(&self) -> bool {
        self.state != DecoderState::AwaitingCommand
    }

    fn decode_line(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, ProtocolError> {
        let newline = src[self.scanned..].iter().position(|byte| *byte == b'\n');
        match newline {
            Some(offset) => {
                let line_end = self.scanned + offset + 1;
                self.scanned = 0;
                if line_end > MAX_LINE_LENGTH {
                    return Err(ProtocolError::LineTooLong(line_end));
                }
                let mut line = src.split_to(line_end);
                line.truncate(line_end - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                Ok(Some(line.freeze()))
            }
            None => {
                if src.len() > MAX_LINE_LENGTH {
                    return Err(ProtocolError::LineTooLong(src.len()));
                }
                self.scanned = src.len();
                Ok(None)
            }
        }
    }

    fn start_payload(&mut self, pending: PendingStorage) {
        if pending.bytes as u64 > self.item_size_limit {
            debug!(
                "Item too large: {} bytes, limit {}",
                pending.bytes, self.item_size_limit
            );
            self.state = DecoderState::Discarding {
                remaining: pending.bytes.saturating_add(TERMINATOR_LEN),
                reply: TextRequest::ItemTooLarge {
                    noreply: pending.noreply,
                },
            };
        } else {
            self.state = DecoderState::AwaitingPayload(pending);
        }
    }

    fn decode_payload(&mut self, src: &mut BytesMut) -> Option<TextRequest> {
        let needed = match &self.state {
            DecoderState::AwaitingPayload(pending) => pending.bytes + TERMINATOR_LEN,
            _ => return None,
        };
        if src.len() < needed {
            src.reserve(needed - src.len());
            return None;
        }

        let pending = match mem::replace(&mut self.state, DecoderState::AwaitingCommand) {
            DecoderState::AwaitingPayload(pending) => pending,
            _ => return None,
        };
        let value = src.split_to(pending.bytes).freeze();
        let terminator = src.split_to(TERMINATOR_LEN);
        if &terminator[..] != b"\r\n" {
            return Some(TextRequest::BadDataChunk);
        }
        Some(TextRequest::Storage(StorageRequest {
            command: pending.command,
            key: pending.key,
            flags: pending.flags,
            exptime: pending.exptime,
            value,
            noreply: pending.noreply,
        }))
    }

    fn discard(&mut self, src: &mut BytesMut) -> Option<TextRequest> {
        let remaining = match &mut self.state {
            DecoderState::Discarding { remaining, .. } => {
                let skip = cmp::min(*remaining, src.len());
                src.advance(skip);
                *remaining -= skip;
                *remaining
            }
            _ => return None,
        };
        if remaining > 0 {
            return None;
        }
        match mem::replace(&mut self.state, DecoderState::AwaitingCommand) {
            DecoderState::Discarding { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

impl Decoder for MemcacheTextDecoder {
    type Item = TextRequest;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                DecoderState::AwaitingCommand => {
                    let line = match self.decode_line(src)? {
                        Some(line) => line,
                        None => return Ok(None),
                    };
                    match parse_line(&line) {
                        ParsedLine::Complete(request) => return Ok(Some(request)),
                        ParsedLine::Storage(pending) => self.start_payload(pending),
                        ParsedLine::InvalidWithPayload(bytes, reason) => {
                            self.state = DecoderState::Discarding {
                                remaining: bytes.saturating_add(TERMINATOR_LEN),
                                reply: TextRequest::Invalid(reason),
                            };
                        }
                    }
                }
                DecoderState::AwaitingPayload(_) => return Ok(self.decode_payload(src)),
                DecoderState::Discarding { .. } => return Ok(self.discard(src)),
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if buf.is_empty() && !self.is_mid_frame() {
                    Ok(None)
                } else {
                    Err(ProtocolError::Incomplete)
                }
            }
        }
    }
}

/// Splits a command line on spaces, empty tokens are skipped.
pub fn tokenize(line: &[u8]) -> Vec<&[u8]> {
    line.split(|byte| *byte == b' ')
        .filter(|token| !token.is_empty())
        .collect()
}

/// Keys are 1 to 250 bytes without whitespace or control characters.
pub fn is_valid_key(key: &[u8]) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key.iter().all(|byte| *byte > b' ' && *byte != 0x7f)
}

fn parse_number<T: std::str::FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.parse::<T>().ok()
}

fn parse_key(line: &Bytes, token: &[u8]) -> Option<Bytes> {
    if is_valid_key(token) {
        Some(line.slice_ref(token))
    } else {
        None
    }
}

/// Reads an optional trailing `noreply`, `None` when the token is anything else.
fn parse_noreply(token: Option<&&[u8]>) -> Option<bool> {
    match token {
        None => Some(false),
        Some(token) if *token == NOREPLY => Some(true),
        Some(_) => None,
    }
}

fn parse_line(line: &Bytes) -> ParsedLine {
    let tokens = tokenize(line);
    let verb = match tokens.first() {
        Some(verb) => *verb,
        None => return ParsedLine::Complete(TextRequest::Unknown),
    };

    if let Some(command) = StorageCommand::from_verb(verb) {
        return parse_storage(line, command, &tokens);
    }

    let request = match verb {
        b"get" => parse_get(line, &tokens, false),
        b"gets" => parse_get(line, &tokens, true),
        b"delete" => parse_delete(line, &tokens),
        b"incr" => parse_incr_decr(line, &tokens).map_or_else(TextRequest::Invalid, TextRequest::Increment),
        b"decr" => parse_incr_decr(line, &tokens).map_or_else(TextRequest::Invalid, TextRequest::Decrement),
        b"flush_all" => parse_flush(&tokens),
        b"stats" if tokens.len() == 1 => TextRequest::Stats,
        b"version" if tokens.len() == 1 => TextRequest::Version,
        b"verbosity" => parse_verbosity(&tokens),
        b"noop" if tokens.len() == 1 => TextRequest::Noop,
        b"quit" if tokens.len() == 1 => TextRequest::Quit,
        _ => TextRequest::Unknown,
    };
    ParsedLine::Complete(request)
}

fn parse_storage(line: &Bytes, command: StorageCommand, tokens: &[&[u8]]) -> ParsedLine {
    if tokens.len() != 5 && tokens.len() != 6 {
        return ParsedLine::Complete(TextRequest::Invalid(BAD_FORMAT));
    }
    let bytes = match parse_number::<usize>(tokens[4]) {
        Some(bytes) => bytes,
        None => return ParsedLine::Complete(TextRequest::Invalid(BAD_FORMAT)),
    };

    let key = parse_key(line, tokens[1]);
    let flags = parse_number::<u32>(tokens[2]);
    let exptime = parse_number::<i64>(tokens[3]);
    let noreply = parse_noreply(tokens.get(5));
    match (key, flags, exptime, noreply) {
        (Some(key), Some(flags), Some(exptime), Some(noreply)) => {
            ParsedLine::Storage(PendingStorage {
                command,
                key,
                flags,
                exptime,
                bytes,
                noreply,
            })
        }
        _ => ParsedLine::InvalidWithPayload(bytes, BAD_FORMAT),
    }
}

fn parse_get(line: &Bytes, tokens: &[&[u8]], with_cas: bool) -> TextRequest {
    if tokens.len() < 2 {
        return TextRequest::Invalid(BAD_FORMAT);
    }
    let keys: Option<Vec<Bytes>> = tokens[1..]
        .iter()
        .map(|token| parse_key(line, token))
        .collect();
    match keys {
        Some(keys) => TextRequest::Get(GetRequest { keys, with_cas }),
        None => TextRequest::Invalid(BAD_FORMAT),
    }
}

fn parse_delete(line: &Bytes, tokens: &[&[u8]]) -> TextRequest {
    if tokens.len() != 2 && tokens.len() != 3 {
        return TextRequest::Invalid(BAD_FORMAT);
    }
    match (parse_key(line, tokens[1]), parse_noreply(tokens.get(2))) {
        (Some(key), Some(noreply)) => TextRequest::Delete(DeleteRequest { key, noreply }),
        _ => TextRequest::Invalid(BAD_FORMAT),
    }
}

fn parse_incr_decr(line: &Bytes, tokens: &[&[u8]]) -> Result<IncrDecrRequest, &'static str> {
    if tokens.len() != 3 && tokens.len() != 4 {
        return Err(BAD_FORMAT);
    }
    let key = parse_key(line, tokens[1]).ok_or(BAD_FORMAT)?;
    let noreply = parse_noreply(tokens.get(3)).ok_or(BAD_FORMAT)?;
    let delta = parse_number::<u64>(tokens[2]).ok_or(BAD_DELTA)?;
    Ok(IncrDecrRequest {
        key,
        delta,
        noreply,
    })
}

fn parse_flush(tokens: &[&[u8]]) -> TextRequest {
    let (delay, noreply) = match tokens.len() {
        1 => (Some(0), Some(false)),
        2 if tokens[1] == NOREPLY => (Some(0), Some(true)),
        2 => (parse_number::<i64>(tokens[1]), Some(false)),
        3 => (parse_number::<i64>(tokens[1]), parse_noreply(tokens.get(2))),
        _ => (None, None),
    };
    match (delay, noreply) {
        (Some(delay), Some(noreply)) => TextRequest::Flush(FlushRequest { delay, noreply }),
        _ => TextRequest::Invalid(BAD_FORMAT),
    }
}

fn parse_verbosity(tokens: &[&[u8]]) -> TextRequest {
    if tokens.len() != 2 && tokens.len() != 3 {
        return TextRequest::Invalid(BAD_FORMAT);
    }
    match (parse_number::<u32>(tokens[1]), parse_noreply(tokens.get(2))) {
        (Some(_level), Some(noreply)) => TextRequest::Verbosity { noreply },
        _ => TextRequest::Invalid(BAD_FORMAT),
    }
}
