use bytes::Bytes;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueEntry {
    pub key: Bytes,
    pub flags: u32,
    pub value: Bytes,
    pub cas: Option<u64>,
}

/// Server response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextResponse {
    Stored,
    NotStored,
    Deleted,
    NotFound,
    Ok,
    /// `VALUE` blocks in request order followed by `END`
    Values(Vec<ValueEntry>),
    /// `STAT` lines followed by `END`
    Stats(Vec<(&'static str, String)>),
    Numeric(u64),
    Version(String),
    Error,
    ClientError(String),
    ServerError(String),
}
