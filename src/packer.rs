//! Serializes [`Value`]s into MessagePack bytes, always choosing the
//! shortest legal wire encoding (spec §4.2).
use byteorder::{BigEndian, WriteBytesExt};

use crate::marker::Marker;
use crate::value::Value;

/// Encodes [`Value`]s into a growing byte buffer.
///
/// A single match on the value's tag writes a `Marker` byte followed by
/// big-endian payload bytes, recursing directly over the `Value` tree for
/// arrays and maps.
#[derive(Clone, Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    /// Creates a packer with an empty output buffer.
    pub fn new() -> Packer {
        Packer { buf: Vec::new() }
    }

    /// Discards any bytes written so far, for reuse across calls.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the packer, returning the bytes written so far.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Encodes `value` and every value it contains, appending to the output
    /// buffer. This is the incremental building block the one-shot `pack`
    /// free function wraps.
    pub fn pack_value(&mut self, value: &Value) {
        match value {
            Value::Nil => self.buf.push(Marker::Nil.into()),
            Value::Bool(v) => {
                self.buf
                    .push(if *v { Marker::True } else { Marker::False }.into());
            }
            Value::Int(v) => self.pack_int(*v),
            Value::UInt(v) => self.pack_uint_value(*v),
            Value::Float(v) => self.pack_float(*v),
            Value::Str(bytes) => self.pack_str(bytes),
            Value::Bin(bytes) => self.pack_bin(bytes),
            Value::Array(items) => {
                self.pack_array_header(items.len());
                for item in items {
                    self.pack_value(item);
                }
            }
            Value::Map(entries) => {
                self.pack_map_header(entries.len());
                for (k, v) in entries {
                    self.pack_value(k);
                    self.pack_value(v);
                }
            }
        }
    }

    fn pack_int(&mut self, v: i64) {
        if v >= 0 {
            self.pack_uint_value(v as u64);
            return;
        }
        if v >= -32 {
            self.buf.push(Marker::NegFixInt(v as i8).into());
        } else if v >= i8::MIN as i64 {
            self.buf.push(Marker::Int8.into());
            self.buf.write_i8(v as i8).unwrap();
        } else if v >= i16::MIN as i64 {
            self.buf.push(Marker::Int16.into());
            self.buf.write_i16::<BigEndian>(v as i16).unwrap();
        } else if v >= i32::MIN as i64 {
            self.buf.push(Marker::Int32.into());
            self.buf.write_i32::<BigEndian>(v as i32).unwrap();
        } else {
            self.buf.push(Marker::Int64.into());
            self.buf.write_i64::<BigEndian>(v).unwrap();
        }
    }

    fn pack_uint_value(&mut self, v: u64) {
        if v <= 127 {
            self.buf.push(Marker::PosFixInt(v as u8).into());
        } else if v <= u8::MAX as u64 {
            self.buf.push(Marker::UInt8.into());
            self.buf.write_u8(v as u8).unwrap();
        } else if v <= u16::MAX as u64 {
            self.buf.push(Marker::UInt16.into());
            self.buf.write_u16::<BigEndian>(v as u16).unwrap();
        } else if v <= u32::MAX as u64 {
            self.buf.push(Marker::UInt32.into());
            self.buf.write_u32::<BigEndian>(v as u32).unwrap();
        } else {
            self.buf.push(Marker::UInt64.into());
            self.buf.write_u64::<BigEndian>(v).unwrap();
        }
    }

    fn pack_float(&mut self, v: f64) {
        self.buf.push(Marker::F64.into());
        self.buf.write_f64::<BigEndian>(v).unwrap();
    }

    fn pack_str(&mut self, bytes: &[u8]) {
        let len = bytes.len();
        if len <= 31 {
            self.buf.push(Marker::FixStr(len as u8).into());
        } else if len <= u8::MAX as usize {
            self.buf.push(Marker::Str8.into());
            self.buf.write_u8(len as u8).unwrap();
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Str16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Str32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
        self.buf.extend_from_slice(bytes);
    }

    fn pack_bin(&mut self, bytes: &[u8]) {
        let len = bytes.len();
        if len <= u8::MAX as usize {
            self.buf.push(Marker::Bin8.into());
            self.buf.write_u8(len as u8).unwrap();
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Bin16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Bin32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
        self.buf.extend_from_slice(bytes);
    }

    fn pack_array_header(&mut self, len: usize) {
        if len <= 15 {
            self.buf.push(Marker::FixArray(len as u8).into());
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Array16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Array32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
    }

    fn pack_map_header(&mut self, len: usize) {
        if len <= 15 {
            self.buf.push(Marker::FixMap(len as u8).into());
        } else if len <= u16::MAX as usize {
            self.buf.push(Marker::Map16.into());
            self.buf.write_u16::<BigEndian>(len as u16).unwrap();
        } else {
            self.buf.push(Marker::Map32.into());
            self.buf.write_u32::<BigEndian>(len as u32).unwrap();
        }
    }
}

/// Encodes `value` into a fresh byte sequence.
pub fn pack(value: &Value) -> Vec<u8> {
    let mut packer = Packer::new();
    packer.pack_value(value);
    packer.into_vec()
}

pub fn pack_nil() -> Vec<u8> {
    pack(&Value::Nil)
}

pub fn pack_bool(b: bool) -> Vec<u8> {
    pack(&Value::Bool(b))
}

pub fn pack_int(i: i64) -> Vec<u8> {
    pack(&Value::Int(i))
}

pub fn pack_uint(u: u64) -> Vec<u8> {
    pack(&Value::UInt(u))
}

pub fn pack_float(f: f64) -> Vec<u8> {
    pack(&Value::Float(f))
}

pub fn pack_str<T: Into<Vec<u8>>>(s: T) -> Vec<u8> {
    pack(&Value::Str(s.into()))
}

pub fn pack_bin<T: Into<Vec<u8>>>(b: T) -> Vec<u8> {
    pack(&Value::Bin(b.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_one_byte() {
        assert_eq!(pack_nil(), vec![0xc0]);
    }

    #[test]
    fn bool_markers() {
        assert_eq!(pack_bool(false), vec![0xc2]);
        assert_eq!(pack_bool(true), vec![0xc3]);
    }

    #[test]
    fn positive_fixint() {
        assert_eq!(pack_uint(42), vec![0x2a]);
        assert_eq!(pack_uint(0), vec![0x00]);
        assert_eq!(pack_uint(127), vec![0x7f]);
    }

    #[test]
    fn uint_family_boundaries() {
        assert_eq!(pack_uint(128), vec![0xcc, 128]);
        assert_eq!(pack_uint(255), vec![0xcc, 255]);
        assert_eq!(pack_uint(256), vec![0xcd, 0x01, 0x00]);
        assert_eq!(pack_uint(65535), vec![0xcd, 0xff, 0xff]);
        assert_eq!(pack_uint(65536), vec![0xce, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            pack_uint(u32::MAX as u64),
            vec![0xce, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            pack_uint(u32::MAX as u64 + 1),
            vec![0xcf, 0, 0, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn negative_fixint_and_int_family() {
        assert_eq!(pack_int(-1), vec![0xff]);
        assert_eq!(pack_int(-32), vec![0xe0]);
        assert_eq!(pack_int(-33), vec![0xd0, 0xdf]);
        assert_eq!(pack_int(-128), vec![0xd0, 0x80]);
        assert_eq!(pack_int(-129), vec![0xd1, 0xff, 0x7f]);
        assert_eq!(pack_int(-32768), vec![0xd1, 0x80, 0x00]);
        assert_eq!(pack_int(-32769), vec![0xd2, 0xff, 0xff, 0x7f, 0xff]);
        assert_eq!(
            pack_int(i32::MIN as i64),
            vec![0xd2, 0x80, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            pack_int(i32::MIN as i64 - 1),
            vec![0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn non_negative_int_forwards_to_uint_encoding() {
        assert_eq!(pack_int(42), pack_uint(42));
    }

    #[test]
    fn float_is_always_binary64() {
        let bytes = pack_float(1.5);
        assert_eq!(bytes[0], 0xcb);
        assert_eq!(bytes.len(), 9);
    }

    #[test]
    fn str_examples() {
        assert_eq!(
            pack_str("hello"),
            vec![0xa5, 0x68, 0x65, 0x6c, 0x6c, 0x6f]
        );
    }

    #[test]
    fn str_length_boundaries() {
        assert_eq!(pack_str(vec![b'a'; 31])[0], 0xa0 | 31);
        assert_eq!(pack_str(vec![b'a'; 32])[0], 0xd9);
        assert_eq!(pack_str(vec![b'a'; 255])[0], 0xd9);
        assert_eq!(pack_str(vec![b'a'; 256])[0], 0xda);
        assert_eq!(pack_str(vec![b'a'; 65535])[0], 0xda);
        assert_eq!(pack_str(vec![b'a'; 65536])[0], 0xdb);
    }

    #[test]
    fn bin_length_boundaries() {
        assert_eq!(pack_bin(vec![0u8; 255])[0], 0xc4);
        assert_eq!(pack_bin(vec![0u8; 256])[0], 0xc5);
        assert_eq!(pack_bin(vec![0u8; 65535])[0], 0xc5);
        assert_eq!(pack_bin(vec![0u8; 65536])[0], 0xc6);
    }

    #[test]
    fn array_example_and_length_boundaries() {
        let v = Value::from_array(vec![
            Value::from_int(1),
            Value::from_int(2),
            Value::from_int(3),
        ]);
        assert_eq!(pack(&v), vec![0x93, 0x01, 0x02, 0x03]);

        let fifteen = Value::from_array(vec![Value::Nil; 15]);
        assert_eq!(pack(&fifteen)[0], 0x90 | 15);
        let sixteen = Value::from_array(vec![Value::Nil; 16]);
        assert_eq!(pack(&sixteen)[0], 0xdc);
    }

    #[test]
    fn map_example() {
        let m = Value::from_map(vec![
            (Value::from_string("name"), Value::from_string("Alice")),
            (Value::from_string("age"), Value::from_uint(30)),
        ]);
        let expected = vec![
            0x82, 0xa4, 0x6e, 0x61, 0x6d, 0x65, 0xa5, 0x41, 0x6c, 0x69, 0x63, 0x65, 0xa3, 0x61,
            0x67, 0x65, 0x1e,
        ];
        assert_eq!(pack(&m), expected);
    }

    #[test]
    fn map_length_boundaries() {
        let fifteen = Value::from_map(vec![(Value::Nil, Value::Nil); 15]);
        assert_eq!(pack(&fifteen)[0], 0x80 | 15);
        let sixteen = Value::from_map(vec![(Value::Nil, Value::Nil); 16]);
        assert_eq!(pack(&sixteen)[0], 0xde);
    }

    #[test]
    fn encoding_minimality_is_length_exact() {
        assert_eq!(pack_uint(0).len(), 1);
        assert_eq!(pack_uint(128).len(), 2);
        assert_eq!(pack_uint(256).len(), 3);
        assert_eq!(pack_uint(65536).len(), 5);
        assert_eq!(pack_uint(u32::MAX as u64 + 1).len(), 9);
    }

    #[test]
    fn packer_clear_reuses_buffer() {
        let mut packer = Packer::new();
        packer.pack_value(&Value::from_int(1));
        assert_eq!(packer.as_slice(), &[0x01]);
        packer.clear();
        assert!(packer.as_slice().is_empty());
        packer.pack_value(&Value::Nil);
        assert_eq!(packer.as_slice(), &[0xc0]);
    }
}
