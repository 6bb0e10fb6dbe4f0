//! Growable byte buffer with positional patching.
//!
//! [`ByteBuffer`] is the scratch space of the streaming encoders: bytes are
//! appended while a sentence is built and earlier positions are overwritten
//! once values such as arities become known.

use std::fmt;

/// A growable byte buffer that supports in-place patching.
///
/// The logical length can be rewound with [`ByteBuffer::set_len`] and
/// restored afterwards; bytes past the logical length are kept, so
/// corrected bytes can be spliced into the middle of the buffer without
/// disturbing what follows.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    len: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl ByteBuffer {
    /// Create an empty buffer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            len: 0,
        }
    }

    /// Create an empty buffer with a default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn reserve(&mut self, additional: usize) {
        let needed = self.len + additional;
        if needed > self.data.len() {
            let mut cap = self.data.len();
            while cap < needed {
                cap *= 2;
            }
            self.data.resize(cap, 0);
        }
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.reserve(1);
        self.data[self.len] = byte;
        self.len += 1;
    }

    /// Append a byte string.
    #[inline]
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }

    /// Append the UTF-8 bytes of `s` followed by a NUL byte.
    #[inline]
    pub fn push_cstr(&mut self, s: &str) {
        self.extend_from_slice(s.as_bytes());
        self.push(0);
    }

    /// Append the `Display` text of `value`.
    #[inline]
    pub fn push_display(&mut self, value: impl fmt::Display) {
        // Writing into memory never fails, so an error comes from `value`.
        let written = fmt::Write::write_fmt(self, format_args!("{value}"));
        debug_assert!(written.is_ok(), "Display impl reported an error");
    }

    /// Overwrite a previously written byte.
    ///
    /// # Panics
    /// Panics if `pos` is not below the logical length.
    #[inline]
    pub fn set(&mut self, pos: usize, byte: u8) {
        assert!(pos < self.len, "set at {pos} beyond length {}", self.len);
        self.data[pos] = byte;
    }

    /// Move every byte at or after `pos` forward by `amount`, growing the
    /// logical length by `amount`.  The vacated bytes keep stale contents
    /// and are expected to be overwritten by the caller.
    pub fn shift_right(&mut self, pos: usize, amount: usize) {
        assert!(pos <= self.len, "shift at {pos} beyond length {}", self.len);
        self.reserve(amount);
        self.data.copy_within(pos..self.len, pos + amount);
        self.len += amount;
    }

    /// Logical length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the logical length.  Growing past the allocated storage extends
    /// it with zero bytes; shrinking keeps the trailing bytes in storage.
    pub fn set_len(&mut self, len: usize) {
        if len > self.len {
            self.reserve(len - self.len);
        }
        self.len = len;
    }

    /// The bytes up to the logical length.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Reset the logical length to zero.  The allocation is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl fmt::Write for ByteBuffer {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
