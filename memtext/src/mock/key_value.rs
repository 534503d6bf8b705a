use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;

/// Random bytes over the whole 0..=255 range, protocol delimiters included.
pub fn create_random_binary_value(capacity: usize) -> Bytes {
    let mut rng = rand::rng();
    let mut value = BytesMut::with_capacity(capacity);
    for _ in 0..capacity {
        value.put_u8(rng.random::<u8>());
    }
    value.freeze()
}
