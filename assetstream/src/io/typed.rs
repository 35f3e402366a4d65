//! Fixed-layout scalar encoding on top of `ByteBuffer`
//!
//! Every scalar is stored little-endian, independent of the host CPU:
//! integers through `to_le_bytes`, floats through their IEEE-754 bit pattern
//! (also little-endian), `bool` as a single `0`/`1` byte.
//!
//! Extraction is all-or-nothing. When fewer bytes remain than the value
//! needs, `get` returns [`BufferError::Exhausted`] and the read cursor does
//! not move.

use super::buffer::{BufferError, ByteBuffer};

/// Largest encoded scalar, in bytes
pub const MAX_SCALAR_SIZE: usize = 8;

/// A scalar with a fixed little-endian byte layout
pub trait Streamable: Sized + Copy {
    /// Encoded size in bytes, at most [`MAX_SCALAR_SIZE`]
    const SIZE: usize;

    /// Encode into `out`, which is exactly `SIZE` bytes long.
    fn encode(self, out: &mut [u8]);

    /// Decode from `bytes`, which is exactly `SIZE` bytes long.
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_streamable_le {
    ($($t:ty),* $(,)?) => {
        $(
            impl Streamable for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn encode(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_streamable_le!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Streamable for bool {
    const SIZE: usize = 1;

    fn encode(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl ByteBuffer<'_> {
    /// Append `value` at the write cursor.
    ///
    /// # Errors
    /// Same as [`ByteBuffer::write`].
    pub fn put<T: Streamable>(&mut self, value: T) -> Result<usize, BufferError> {
        let mut scratch = [0u8; MAX_SCALAR_SIZE];
        let encoded = &mut scratch[..T::SIZE];
        value.encode(encoded);
        self.write(encoded)
    }

    /// Extract a value at the read cursor.
    ///
    /// # Errors
    /// `Exhausted` if fewer than `T::SIZE` bytes remain; nothing is consumed.
    pub fn get<T: Streamable>(&mut self) -> Result<T, BufferError> {
        let available = self.remaining();
        if available < T::SIZE {
            return Err(BufferError::Exhausted {
                needed: T::SIZE,
                available,
            });
        }
        let mut scratch = [0u8; MAX_SCALAR_SIZE];
        let encoded = &mut scratch[..T::SIZE];
        let count = self.read(encoded);
        debug_assert_eq!(count, T::SIZE);
        Ok(T::decode(encoded))
    }

    /// Append a string as a `u32` byte length followed by its UTF-8 bytes.
    ///
    /// # Errors
    /// - `InvalidData` if the string is longer than `u32::MAX` bytes
    /// - otherwise the same as [`ByteBuffer::write`]
    pub fn put_str(&mut self, value: &str) -> Result<usize, BufferError> {
        let len = u32::try_from(value.len()).map_err(|_| {
            BufferError::InvalidData(format!("string of {} bytes is too long", value.len()))
        })?;
        let prefix = self.put(len)?;
        let body = self.write(value.as_bytes())?;
        Ok(prefix + body)
    }

    /// Extract a string written by [`ByteBuffer::put_str`].
    ///
    /// # Errors
    /// - `Exhausted` if the length prefix or the body is truncated
    /// - `InvalidData` if the body is not UTF-8
    ///
    /// The read cursor only moves on success.
    pub fn get_string(&mut self) -> Result<String, BufferError> {
        let start = self.read_offset();
        let len = self.get::<u32>()? as usize;
        let available = self.remaining();
        if available < len {
            self.set_read_offset(start);
            return Err(BufferError::Exhausted {
                needed: <u32 as Streamable>::SIZE + len,
                available: available + <u32 as Streamable>::SIZE,
            });
        }
        let mut body = vec![0u8; len];
        self.read(&mut body);
        String::from_utf8(body).map_err(|e| {
            self.set_read_offset(start);
            BufferError::InvalidData(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_little_endian() {
        let mut buffer = ByteBuffer::new();
        buffer.put(0x0102_0304u32).unwrap();
        buffer.put(-2i16).unwrap();
        assert_eq!(buffer.as_slice(), &[0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn test_float_uses_bit_pattern() {
        let mut buffer = ByteBuffer::new();
        buffer.put(1.0f32).unwrap();
        assert_eq!(buffer.as_slice(), &[0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_bool_is_one_byte() {
        let mut buffer = ByteBuffer::new();
        buffer.put(true).unwrap();
        buffer.put(false).unwrap();
        assert_eq!(buffer.as_slice(), &[1, 0]);
        assert!(buffer.get::<bool>().unwrap());
        assert!(!buffer.get::<bool>().unwrap());
    }

    #[test]
    fn test_short_read_consumes_nothing() {
        let mut buffer = ByteBuffer::from_vec(vec![1, 2, 3]);
        let err = buffer.get::<u32>().unwrap_err();
        assert_eq!(
            err,
            BufferError::Exhausted {
                needed: 4,
                available: 3
            }
        );
        assert_eq!(buffer.read_offset(), 0);
        assert_eq!(buffer.get::<u16>().unwrap(), 0x0201);
    }
}
