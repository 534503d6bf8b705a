use bytes::Bytes;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageCommand {
    Set,
    Add,
    Replace,
    Append,
    Prepend,
}

impl StorageCommand {
    pub fn from_verb(verb: &[u8]) -> Option<StorageCommand> {
        match verb {
            b"set" => Some(StorageCommand::Set),
            b"add" => Some(StorageCommand::Add),
            b"replace" => Some(StorageCommand::Replace),
            b"append" => Some(StorageCommand::Append),
            b"prepend" => Some(StorageCommand::Prepend),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageCommand::Set => "set",
            StorageCommand::Add => "add",
            StorageCommand::Replace => "replace",
            StorageCommand::Append => "append",
            StorageCommand::Prepend => "prepend",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageRequest {
    pub command: StorageCommand,
    pub key: Bytes,
    pub flags: u32,
    pub exptime: i64,
    pub value: Bytes,
    pub noreply: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetRequest {
    pub keys: Vec<Bytes>,
    /// `gets`: each `VALUE` line also carries the cas unique
    pub with_cas: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub key: Bytes,
    pub noreply: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncrDecrRequest {
    pub key: Bytes,
    pub delta: u64,
    pub noreply: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlushRequest {
    pub delay: i64,
    pub noreply: bool,
}

/// Client request, one per command line (plus payload for storage commands)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextRequest {
    Storage(StorageRequest),
    Get(GetRequest),
    Delete(DeleteRequest),
    Increment(IncrDecrRequest),
    Decrement(IncrDecrRequest),
    Flush(FlushRequest),
    Stats,
    Version,
    Verbosity { noreply: bool },
    Noop,
    Quit,
    /// Storage command whose payload exceeded the item size limit,
    /// the payload has already been discarded.
    ItemTooLarge { noreply: bool },
    /// Payload was not terminated by CRLF.
    BadDataChunk,
    /// Malformed command line, answered with `CLIENT_ERROR <reason>`.
    Invalid(&'static str),
    Unknown,
}

impl TextRequest {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            TextRequest::Storage(request) => request.command.as_str(),
            TextRequest::Get(request) if request.with_cas => "gets",
            TextRequest::Get(_) => "get",
            TextRequest::Delete(_) => "delete",
            TextRequest::Increment(_) => "incr",
            TextRequest::Decrement(_) => "decr",
            TextRequest::Flush(_) => "flush_all",
            TextRequest::Stats => "stats",
            TextRequest::Version => "version",
            TextRequest::Verbosity { .. } => "verbosity",
            TextRequest::Noop => "noop",
            TextRequest::Quit => "quit",
            TextRequest::ItemTooLarge { .. } => "item_too_large",
            TextRequest::BadDataChunk => "bad_data_chunk",
            TextRequest::Invalid(_) => "invalid",
            TextRequest::Unknown => "unknown",
        }
    }
}
