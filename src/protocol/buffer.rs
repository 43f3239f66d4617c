//! Packet buffer implementation
//!
//! Provides a byte cursor with the game protocol's read/write operations:
//! - Little-endian fixed width integers and floats
//! - Unsigned LEB128 and zig-zag signed varints (32 and 64 bit)
//! - Length-prefixed byte strings and UTF-8 strings
//! - Vectors and block positions
//!
//! Every read names the field being read so that a short or malformed
//! payload produces a [`ProtocolError`] pointing at the offending field.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::protocol::types::{BlockPosition, Vec3};

/// Default upper bound for a single inbound packet (2 MiB)
pub const MAX_PACKET_SIZE: usize = 2 * 1024 * 1024;

type ReadResult<T> = std::result::Result<T, ProtocolError>;

/// Packet buffer for reading and writing game protocol data
#[derive(Debug, Clone, Default)]
pub struct PacketBuffer {
    /// Internal byte buffer
    data: BytesMut,
    /// Current read position
    read_pos: usize,
}

impl PacketBuffer {
    /// Create a new empty packet buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a packet buffer with a specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Create a packet buffer from existing bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            read_pos: 0,
        }
    }

    // ============ Properties ============

    /// Get the current read position
    #[inline]
    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Get the total length of the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of bytes remaining to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.read_pos)
    }

    /// Check if there are bytes remaining to read
    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Get a reference to the underlying bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Convert into immutable bytes
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    /// Reset read position to start
    pub fn reset(&mut self) {
        self.read_pos = 0;
    }

    // ============ Reading Methods ============

    fn take(&mut self, count: usize, field: &'static str) -> ReadResult<&[u8]> {
        if self.remaining() < count {
            return Err(ProtocolError::InsufficientData {
                field,
                expected: count,
                actual: self.remaining(),
            });
        }
        let start = self.read_pos;
        self.read_pos += count;
        Ok(&self.data[start..self.read_pos])
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> ReadResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    /// Read an unsigned byte
    pub fn read_u8(&mut self, field: &'static str) -> ReadResult<u8> {
        Ok(self.take(1, field)?[0])
    }

    /// Read a boolean byte (non-zero is true)
    pub fn read_bool(&mut self, field: &'static str) -> ReadResult<bool> {
        Ok(self.read_u8(field)? != 0)
    }

    /// Read a signed little-endian short (2 bytes)
    pub fn read_lshort(&mut self, field: &'static str) -> ReadResult<i16> {
        Ok(i16::from_le_bytes(self.take_array(field)?))
    }

    /// Read a signed little-endian int (4 bytes)
    pub fn read_lint(&mut self, field: &'static str) -> ReadResult<i32> {
        Ok(i32::from_le_bytes(self.take_array(field)?))
    }

    /// Read a little-endian float (4 bytes)
    pub fn read_lfloat(&mut self, field: &'static str) -> ReadResult<f32> {
        Ok(f32::from_le_bytes(self.take_array(field)?))
    }

    /// Read an unsigned 32-bit varint
    pub fn read_var_u32(&mut self, field: &'static str) -> ReadResult<u32> {
        let mut value = 0u32;
        for i in 0..5 {
            let byte = self.read_u8(field)?;
            // Only the low 4 bits of the fifth byte fit in a u32
            if i == 4 && byte & 0x70 != 0 {
                return Err(ProtocolError::InvalidValue {
                    field,
                    value: "varint overflows u32".to_string(),
                });
            }
            value |= u32::from(byte & 0x7f) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ProtocolError::InvalidValue {
            field,
            value: "varint exceeds 5 bytes".to_string(),
        })
    }

    /// Read an unsigned 64-bit varint
    pub fn read_var_u64(&mut self, field: &'static str) -> ReadResult<u64> {
        let mut value = 0u64;
        for i in 0..10 {
            let byte = self.read_u8(field)?;
            // Only the low bit of the tenth byte fits in a u64
            if i == 9 && byte & 0x7e != 0 {
                return Err(ProtocolError::InvalidValue {
                    field,
                    value: "varlong overflows u64".to_string(),
                });
            }
            value |= u64::from(byte & 0x7f) << (i * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ProtocolError::InvalidValue {
            field,
            value: "varlong exceeds 10 bytes".to_string(),
        })
    }

    /// Read a zig-zag encoded signed 32-bit varint
    pub fn read_var_i32(&mut self, field: &'static str) -> ReadResult<i32> {
        let raw = self.read_var_u32(field)?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    /// Read a zig-zag encoded signed 64-bit varint
    pub fn read_var_i64(&mut self, field: &'static str) -> ReadResult<i64> {
        let raw = self.read_var_u64(field)?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    /// Read a varint length-prefixed byte string
    pub fn read_byte_string(&mut self, field: &'static str) -> ReadResult<Vec<u8>> {
        let length = self.read_var_u32(field)? as usize;
        Ok(self.take(length, field)?.to_vec())
    }

    /// Read a varint length-prefixed UTF-8 string
    pub fn read_string(&mut self, field: &'static str) -> ReadResult<String> {
        let bytes = self.read_byte_string(field)?;
        String::from_utf8(bytes).map_err(|e| ProtocolError::InvalidValue {
            field,
            value: e.to_string(),
        })
    }

    /// Read everything left in the buffer
    pub fn read_remaining(&mut self) -> Bytes {
        let rest = Bytes::copy_from_slice(&self.data[self.read_pos..]);
        self.read_pos = self.data.len();
        rest
    }

    /// Read a vector of three floats
    pub fn read_vec3(&mut self, field: &'static str) -> ReadResult<Vec3> {
        Ok(Vec3::new(
            self.read_lfloat(field)?,
            self.read_lfloat(field)?,
            self.read_lfloat(field)?,
        ))
    }

    /// Read a block position with an unsigned y coordinate
    pub fn read_block_position(&mut self, field: &'static str) -> ReadResult<BlockPosition> {
        let x = self.read_var_i32(field)?;
        let y = self.read_var_u32(field)? as i32;
        let z = self.read_var_i32(field)?;
        Ok(BlockPosition::new(x, y, z))
    }

    /// Read a block position with all coordinates signed
    pub fn read_signed_block_position(
        &mut self,
        field: &'static str,
    ) -> ReadResult<BlockPosition> {
        Ok(BlockPosition::new(
            self.read_var_i32(field)?,
            self.read_var_i32(field)?,
            self.read_var_i32(field)?,
        ))
    }

    // ============ Writing Methods ============

    /// Write an unsigned byte
    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    /// Write a boolean byte
    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(u8::from(value));
    }

    /// Write a signed little-endian short (2 bytes)
    pub fn write_lshort(&mut self, value: i16) {
        self.data.put_i16_le(value);
    }

    /// Write a signed little-endian int (4 bytes)
    pub fn write_lint(&mut self, value: i32) {
        self.data.put_i32_le(value);
    }

    /// Write a little-endian float (4 bytes)
    pub fn write_lfloat(&mut self, value: f32) {
        self.data.put_f32_le(value);
    }

    /// Write an unsigned 32-bit varint
    pub fn write_var_u32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.data.put_u8((value & 0x7f) as u8 | 0x80);
            value >>= 7;
        }
        self.data.put_u8(value as u8);
    }

    /// Write an unsigned 64-bit varint
    pub fn write_var_u64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.data.put_u8((value & 0x7f) as u8 | 0x80);
            value >>= 7;
        }
        self.data.put_u8(value as u8);
    }

    /// Write a zig-zag encoded signed 32-bit varint
    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_u32(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Write a zig-zag encoded signed 64-bit varint
    pub fn write_var_i64(&mut self, value: i64) {
        self.write_var_u64(((value << 1) ^ (value >> 63)) as u64);
    }

    /// Write a varint length-prefixed byte string
    pub fn write_byte_string(&mut self, bytes: &[u8]) {
        self.write_var_u32(bytes.len() as u32);
        self.data.extend_from_slice(bytes);
    }

    /// Write a varint length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) {
        self.write_byte_string(value.as_bytes());
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a vector of three floats
    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_lfloat(value.x);
        self.write_lfloat(value.y);
        self.write_lfloat(value.z);
    }

    /// Write a block position with an unsigned y coordinate
    pub fn write_block_position(&mut self, value: BlockPosition) {
        self.write_var_i32(value.x);
        self.write_var_u32(value.y as u32);
        self.write_var_i32(value.z);
    }

    /// Write a block position with all coordinates signed
    pub fn write_signed_block_position(&mut self, value: BlockPosition) {
        self.write_var_i32(value.x);
        self.write_var_i32(value.y);
        self.write_var_i32(value.z);
    }
}

impl From<&[u8]> for PacketBuffer {
    fn from(slice: &[u8]) -> Self {
        Self::from_bytes(slice)
    }
}

impl AsRef<[u8]> for PacketBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
