//! Decodes MessagePack bytes into [`Value`]s (spec §4.3).
use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::value::Value;

/// Array/Map nesting depth at which the unpacker gives up rather than
/// recurse further. Not part of the wire format; chosen as a generous cap
/// for realistic documents that still bounds stack growth on adversarial
/// input (spec §9, Open Questions: Depth limiting).
const MAX_DEPTH: usize = 512;

/// Decodes one or more MessagePack values from a byte buffer.
///
/// A shrinking byte slice plays the role of a cursor: `remaining()` is just
/// `self.data.len()`, and advancing is a `split_at` that replaces `data`
/// with the tail. Array and map elements are decoded by recursing directly
/// from `unpack_value` into nested `Value`s.
#[derive(Clone, Debug)]
pub struct Unpacker<'a> {
    data: &'a [u8],
}

impl<'a> Unpacker<'a> {
    /// Positions a new unpacker at the start of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Unpacker<'a> {
        Unpacker { data: buffer }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// True once every byte of the buffer has been consumed.
    pub fn is_complete(&self) -> bool {
        self.data.is_empty()
    }

    /// Re-initializes this unpacker with a new buffer, cursor at 0.
    pub fn reset(&mut self, buffer: &'a [u8]) {
        self.data = buffer;
    }

    /// Decodes exactly one value, advancing past it.
    pub fn unpack(&mut self) -> Result<Value> {
        self.unpack_value(0)
    }

    fn take(&mut self, n: usize, step: &'static str) -> Result<&'a [u8]> {
        if n > self.data.len() {
            return Err(Error::LengthTooShort {
                step,
                needed: n,
                available: self.data.len(),
            });
        }
        let (taken, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(taken)
    }

    fn read_u8(&mut self, step: &'static str) -> Result<u8> {
        Ok(self.take(1, step)?[0])
    }

    fn unpack_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(Error::DepthLimitExceeded);
        }
        let tag_byte = self.read_u8("read format byte")?;
        let marker = Marker::from_u8(tag_byte);
        self.decode_marker(marker, depth)
    }

    fn decode_marker(&mut self, marker: Marker, depth: usize) -> Result<Value> {
        use Marker::*;
        match marker {
            Reserved => Err(Error::ReservedByte),
            Nil => Ok(Value::Nil),
            False => Ok(Value::Bool(false)),
            True => Ok(Value::Bool(true)),
            PosFixInt(v) => Ok(Value::UInt(v as u64)),
            NegFixInt(v) => Ok(Value::Int(v as i64)),
            UInt8 => {
                let mut buf = self.take(1, "decode uint8")?;
                Ok(Value::UInt(buf.read_u8().unwrap() as u64))
            }
            UInt16 => {
                let mut buf = self.take(2, "decode uint16")?;
                Ok(Value::UInt(buf.read_u16::<BigEndian>().unwrap() as u64))
            }
            UInt32 => {
                let mut buf = self.take(4, "decode uint32")?;
                Ok(Value::UInt(buf.read_u32::<BigEndian>().unwrap() as u64))
            }
            UInt64 => {
                let mut buf = self.take(8, "decode uint64")?;
                Ok(Value::UInt(buf.read_u64::<BigEndian>().unwrap()))
            }
            Int8 => {
                let mut buf = self.take(1, "decode int8")?;
                Ok(Value::Int(buf.read_i8().unwrap() as i64))
            }
            Int16 => {
                let mut buf = self.take(2, "decode int16")?;
                Ok(Value::Int(buf.read_i16::<BigEndian>().unwrap() as i64))
            }
            Int32 => {
                let mut buf = self.take(4, "decode int32")?;
                Ok(Value::Int(buf.read_i32::<BigEndian>().unwrap() as i64))
            }
            Int64 => {
                let mut buf = self.take(8, "decode int64")?;
                Ok(Value::Int(buf.read_i64::<BigEndian>().unwrap()))
            }
            F32 => {
                let mut buf = self.take(4, "decode float32")?;
                Ok(Value::Float(buf.read_f32::<BigEndian>().unwrap() as f64))
            }
            F64 => {
                let mut buf = self.take(8, "decode float64")?;
                Ok(Value::Float(buf.read_f64::<BigEndian>().unwrap()))
            }
            FixStr(len) => self.unpack_str(len as usize),
            Str8 => {
                let len = self.read_u8("decode str8 length")? as usize;
                self.unpack_str(len)
            }
            Str16 => {
                let len = self.take(2, "decode str16 length")?.read_u16::<BigEndian>().unwrap() as usize;
                self.unpack_str(len)
            }
            Str32 => {
                let len = self.take(4, "decode str32 length")?.read_u32::<BigEndian>().unwrap() as usize;
                self.unpack_str(len)
            }
            Bin8 => {
                let len = self.read_u8("decode bin8 length")? as usize;
                self.unpack_bin(len)
            }
            Bin16 => {
                let len = self.take(2, "decode bin16 length")?.read_u16::<BigEndian>().unwrap() as usize;
                self.unpack_bin(len)
            }
            Bin32 => {
                let len = self.take(4, "decode bin32 length")?.read_u32::<BigEndian>().unwrap() as usize;
                self.unpack_bin(len)
            }
            FixArray(len) => self.unpack_array(len as usize, depth),
            Array16 => {
                let len = self.take(2, "decode array16 length")?.read_u16::<BigEndian>().unwrap() as usize;
                self.unpack_array(len, depth)
            }
            Array32 => {
                let len = self.take(4, "decode array32 length")?.read_u32::<BigEndian>().unwrap() as usize;
                self.unpack_array(len, depth)
            }
            FixMap(len) => self.unpack_map(len as usize, depth),
            Map16 => {
                let len = self.take(2, "decode map16 length")?.read_u16::<BigEndian>().unwrap() as usize;
                self.unpack_map(len, depth)
            }
            Map32 => {
                let len = self.take(4, "decode map32 length")?.read_u32::<BigEndian>().unwrap() as usize;
                self.unpack_map(len, depth)
            }
            Ext8 => {
                let len = self.read_u8("decode ext8 length")? as usize;
                self.skip_ext(len)
            }
            Ext16 => {
                let len = self.take(2, "decode ext16 length")?.read_u16::<BigEndian>().unwrap() as usize;
                self.skip_ext(len)
            }
            Ext32 => {
                let len = self.take(4, "decode ext32 length")?.read_u32::<BigEndian>().unwrap() as usize;
                self.skip_ext(len)
            }
            FixExt1 => self.skip_ext(1),
            FixExt2 => self.skip_ext(2),
            FixExt4 => self.skip_ext(4),
            FixExt8 => self.skip_ext(8),
            FixExt16 => self.skip_ext(16),
        }
    }

    fn unpack_str(&mut self, len: usize) -> Result<Value> {
        let bytes = self.take(len, "get str content")?;
        Ok(Value::Str(bytes.to_vec()))
    }

    fn unpack_bin(&mut self, len: usize) -> Result<Value> {
        let bytes = self.take(len, "get bin content")?;
        Ok(Value::Bin(bytes.to_vec()))
    }

    fn unpack_array(&mut self, len: usize, depth: usize) -> Result<Value> {
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(self.unpack_value(depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn unpack_map(&mut self, len: usize, depth: usize) -> Result<Value> {
        let mut entries = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            let key = self.unpack_value(depth + 1)?;
            let value = self.unpack_value(depth + 1)?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }

    /// Extension payloads are read and skipped; the wire format recognizes
    /// them only to keep the cursor positioned for continued streaming.
    /// Spec §1/§9: this library decodes no extension types.
    fn skip_ext(&mut self, len: usize) -> Result<Value> {
        self.take(1, "read ext type byte")?;
        self.take(len, "get ext payload")?;
        Ok(Value::Nil)
    }
}

/// Decodes the first value in `bytes`. Trailing bytes, if any, are ignored.
pub fn unpack(bytes: &[u8]) -> Result<Value> {
    Unpacker::new(bytes).unpack()
}

/// Decodes every concatenated value in `bytes` until the buffer is
/// exhausted. The first failure aborts the call and discards any values
/// already decoded.
pub fn unpack_all(bytes: &[u8]) -> Result<Vec<Value>> {
    let mut unpacker = Unpacker::new(bytes);
    let mut values = Vec::new();
    while !unpacker.is_complete() {
        values.push(unpacker.unpack()?);
    }
    Ok(values)
}

/// Decodes the first value in `bytes`, returning `Value::Nil` on any
/// failure instead of propagating it.
pub fn try_unpack(bytes: &[u8]) -> Value {
    unpack(bytes).unwrap_or(Value::Nil)
}
