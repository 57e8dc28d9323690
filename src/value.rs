//! The self-describing value model shared by the packer and unpacker.
use std::fmt;

/// The tag discriminating which payload of a [`Value`] is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Nil,
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Bin,
    Array,
    Map,
}

/// A dynamically-typed MessagePack value.
///
/// `Int` and `UInt` are distinct tags so that decoding preserves which
/// integer family a value was encoded in; the packer independently
/// re-chooses the shortest encoding on the way out, so `Value::from_int(5)`
/// and `Value::from_uint(5)` pack to the same byte but are not equal.
///
/// `Float` always stores a binary64; a binary32 read off the wire is widened
/// on decode, and the packer always emits binary64.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(Vec<u8>),
    Bin(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn from_bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn from_int(i: i64) -> Value {
        Value::Int(i)
    }

    pub fn from_uint(u: u64) -> Value {
        Value::UInt(u)
    }

    pub fn from_float(f: f64) -> Value {
        Value::Float(f)
    }

    /// Widens a binary32 to the binary64 storage the value model uses.
    pub fn from_float32(f: f32) -> Value {
        Value::Float(f as f64)
    }

    pub fn from_string<T: Into<Vec<u8>>>(bytes: T) -> Value {
        Value::Str(bytes.into())
    }

    pub fn from_bin<T: Into<Vec<u8>>>(bytes: T) -> Value {
        Value::Bin(bytes.into())
    }

    pub fn from_array(seq: Vec<Value>) -> Value {
        Value::Array(seq)
    }

    pub fn from_map(entries: Vec<(Value, Value)>) -> Value {
        Value::Map(entries)
    }

    pub fn tag(&self) -> Tag {
        match self {
            Value::Nil => Tag::Nil,
            Value::Bool(_) => Tag::Bool,
            Value::Int(_) => Tag::Int,
            Value::UInt(_) => Tag::UInt,
            Value::Float(_) => Tag::Float,
            Value::Str(_) => Tag::Str,
            Value::Bin(_) => Tag::Bin,
            Value::Array(_) => Tag::Array,
            Value::Map(_) => Tag::Map,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_uint(&self) -> bool {
        matches!(self, Value::UInt(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_bin(&self) -> bool {
        matches!(self, Value::Bin(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// True for either integer tag.
    pub fn is_integer(&self) -> bool {
        self.is_int() || self.is_uint()
    }

    /// True for either integer tag or `Float`.
    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Returns the payload if this is a `Bool`, else `false`.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            _ => false,
        }
    }

    /// On `Int`, returns the payload. On `UInt`, returns the two's-complement
    /// reinterpretation (a payload of `u64::MAX` becomes `-1`). On any other
    /// tag, returns 0.
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::UInt(v) => *v as i64,
            _ => 0,
        }
    }

    /// On `UInt`, returns the payload. On `Int`, returns the payload if
    /// non-negative, else 0. On any other tag, returns 0.
    pub fn as_uint(&self) -> u64 {
        match self {
            Value::UInt(v) => *v,
            Value::Int(v) if *v >= 0 => *v as u64,
            _ => 0,
        }
    }

    /// On `Float`, returns the payload. On `Int`/`UInt`, widens to f64. On
    /// any other tag, returns 0.0.
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
            Value::UInt(v) => *v as f64,
            _ => 0.0,
        }
    }

    /// Returns the raw bytes if this is a `Str`, else an empty slice. The
    /// codec treats string bytes as opaque; this never validates UTF-8.
    pub fn as_str(&self) -> &[u8] {
        match self {
            Value::Str(v) => v,
            _ => &[],
        }
    }

    /// Returns the raw bytes if this is a `Bin`, else an empty slice.
    pub fn as_bin(&self) -> &[u8] {
        match self {
            Value::Bin(v) => v,
            _ => &[],
        }
    }

    /// Returns the elements if this is an `Array`, else an empty slice.
    pub fn as_array(&self) -> &[Value] {
        match self {
            Value::Array(v) => v,
            _ => &[],
        }
    }

    /// Returns the entries if this is a `Map`, else an empty slice.
    pub fn as_map(&self) -> &[(Value, Value)] {
        match self {
            Value::Map(v) => v,
            _ => &[],
        }
    }

    /// Element count for `Array`/`Map`, byte count for `Str`/`Bin`, else 0.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(v) => v.len(),
            Value::Map(v) => v.len(),
            Value::Str(v) => v.len(),
            Value::Bin(v) => v.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the i-th array element, or `Nil` if out of range or not an
    /// array.
    pub fn get(&self, index: usize) -> Value {
        self.as_array().get(index).cloned().unwrap_or(Value::Nil)
    }

    /// Linear scan for the first map entry whose key is a `Str` equal to
    /// `key`. Not a hash-map lookup: maps preserve duplicate keys and
    /// insertion order, so a hash table would silently change equality and
    /// iteration semantics (spec §4.1, §9).
    pub fn get_key<T: AsRef<[u8]>>(&self, key: T) -> Value {
        let key = key.as_ref();
        self.as_map()
            .iter()
            .find(|(k, _)| matches!(k, Value::Str(s) if s.as_slice() == key))
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Nil)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(bytes) => write!(f, "\"{}\"", String::from_utf8_lossy(bytes)),
            Value::Bin(bytes) => write!(f, "<binary:{} bytes>", bytes.len()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Value {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(Value::nil().tag(), Tag::Nil);
        assert_eq!(Value::from_bool(true).tag(), Tag::Bool);
        assert_eq!(Value::from_int(-1).tag(), Tag::Int);
        assert_eq!(Value::from_uint(1).tag(), Tag::UInt);
        assert_eq!(Value::from_float(1.0).tag(), Tag::Float);
        assert_eq!(Value::from_string("a").tag(), Tag::Str);
        assert_eq!(Value::from_bin(vec![1u8]).tag(), Tag::Bin);
        assert_eq!(Value::from_array(vec![]).tag(), Tag::Array);
        assert_eq!(Value::from_map(vec![]).tag(), Tag::Map);
    }

    #[test]
    fn int_uint_distinct_but_cross_compatible_accessors() {
        let i = Value::from_int(5);
        let u = Value::from_uint(5);
        assert_ne!(i, u);
        assert_eq!(i.as_uint(), 5);
        assert_eq!(u.as_int(), 5);
    }

    #[test]
    fn as_int_on_uint_wraps() {
        let v = Value::from_uint(u64::MAX);
        assert_eq!(v.as_int(), -1);
    }

    #[test]
    fn as_uint_on_negative_int_is_zero() {
        let v = Value::from_int(-5);
        assert_eq!(v.as_uint(), 0);
    }

    #[test]
    fn mismatched_tag_accessors_are_zero_value() {
        let v = Value::nil();
        assert!(!v.as_bool());
        assert_eq!(v.as_int(), 0);
        assert_eq!(v.as_uint(), 0);
        assert_eq!(v.as_float(), 0.0);
        assert_eq!(v.as_str(), b"");
        assert_eq!(v.as_bin(), b"");
        assert!(v.as_array().is_empty());
        assert!(v.as_map().is_empty());
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn float32_widens() {
        let v = Value::from_float32(1.5f32);
        assert_eq!(v, Value::Float(1.5));
    }

    #[test]
    fn array_index_out_of_range_is_nil() {
        let v = Value::from_array(vec![Value::from_int(1)]);
        assert_eq!(v.get(0), Value::from_int(1));
        assert_eq!(v.get(1), Value::Nil);
        assert_eq!(Value::nil().get(0), Value::Nil);
    }

    #[test]
    fn map_key_lookup_is_linear_scan_over_str_keys() {
        let m = Value::from_map(vec![
            (Value::from_string("name"), Value::from_string("Alice")),
            (Value::from_string("age"), Value::from_uint(30)),
        ]);
        assert_eq!(m.get_key("age"), Value::from_uint(30));
        assert_eq!(m.get_key("missing"), Value::Nil);
        assert_eq!(Value::nil().get_key("x"), Value::Nil);
    }

    #[test]
    fn map_equality_is_positional_duplicates_preserved() {
        let a = Value::from_map(vec![
            (Value::from_string("a"), Value::from_int(1)),
            (Value::from_string("a"), Value::from_int(2)),
        ]);
        let b = Value::from_map(vec![
            (Value::from_string("a"), Value::from_int(2)),
            (Value::from_string("a"), Value::from_int(1)),
        ]);
        assert_ne!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let nan = Value::from_float(f64::NAN);
        assert_ne!(nan, nan);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::nil().to_string(), "nil");
        assert_eq!(Value::from_bool(true).to_string(), "true");
        assert_eq!(Value::from_int(-3).to_string(), "-3");
        assert_eq!(Value::from_string("hi").to_string(), "\"hi\"");
        assert_eq!(Value::from_bin(vec![1, 2, 3]).to_string(), "<binary:3 bytes>");
        assert_eq!(
            Value::from_array(vec![Value::from_int(1), Value::from_int(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(
            Value::from_map(vec![(Value::from_string("k"), Value::from_int(1))]).to_string(),
            "{\"k\": 1}"
        );
    }

    #[test]
    fn clone_is_deep() {
        let original = Value::from_array(vec![Value::from_string("x")]);
        let mut copy = original.clone();
        if let Value::Array(items) = &mut copy {
            items.push(Value::Nil);
        }
        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
