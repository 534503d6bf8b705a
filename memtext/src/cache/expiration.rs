/// Relative expiration times above this many seconds (30 days) are read as
/// absolute Unix timestamps.
pub const MAX_RELATIVE_EXPTIME: i64 = 60 * 60 * 24 * 30;

/// Absolute point in time after which an entry is dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Expiration {
    #[default]
    Never,
    /// Unix timestamp in seconds.
    At(u64),
}

impl Expiration {
    /// Picks whichever of the two expirations comes first.
    pub fn earliest(self, other: Expiration) -> Expiration {
        match (self, other) {
            (Expiration::Never, other) => other,
            (this, Expiration::Never) => this,
            (Expiration::At(a), Expiration::At(b)) => Expiration::At(a.min(b)),
        }
    }
}

/// Live iff the expiration is `Never` or `now` is strictly before it.
#[inline]
pub fn is_live(expiration: Expiration, now: u64) -> bool {
    match expiration {
        Expiration::Never => true,
        Expiration::At(expires_at) => now < expires_at,
    }
}

/// Maps the `exptime` field of a command onto an absolute expiration.
///
/// - `0` never expires
/// - `1..=2592000` is relative to `now`
/// - larger values are absolute Unix timestamps
/// - negative values are already dead
pub fn resolve_expiration(requested: i64, now: u64) -> Expiration {
    match requested {
        0 => Expiration::Never,
        r if r < 0 => Expiration::At(now.saturating_sub(1)),
        r if r <= MAX_RELATIVE_EXPTIME => Expiration::At(now.saturating_add(r as u64)),
        r => Expiration::At(r as u64),
    }
}
