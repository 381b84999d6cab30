//! # Byte cursors
//!
//! Typed, forward-only access to the bytes of a video stream. Every
//! multi-byte value is little-endian; this is part of the wire contract and
//! must never change between a writer and a reader build.

use crate::error::{DecodeError, DecodeResult};

/// Append-only writer over a growable buffer.
#[derive(Debug, Default, Clone)]
pub struct Serializer {
    buffer: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Drops the written bytes but keeps the allocation.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drops every byte past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.buffer.truncate(len);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }
}

/// Forward-only reader over a borrowed buffer.
///
/// Reading past the end is an error, never a zero default.
#[derive(Debug, Clone)]
pub struct Deserializer<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Deserializer<'a> {
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        self.take::<1>().map(u8::from_le_bytes)
    }

    #[inline]
    pub fn read_i8(&mut self) -> DecodeResult<i8> {
        self.take::<1>().map(i8::from_le_bytes)
    }

    #[inline]
    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn read_i16(&mut self) -> DecodeResult<i16> {
        self.take::<2>().map(i16::from_le_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    /// Reads a fixed number of raw bytes.
    pub fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        self.take::<N>()
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let remaining = self.remaining();
        if remaining < N {
            return Err(DecodeError::UnexpectedEnd {
                offset: self.position,
                needed: N,
                remaining,
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[self.position..self.position + N]);
        self.position += N;
        Ok(bytes)
    }
}
