//! A self-describing value type and MessagePack codec.
//!
//! [`Value`] is a dynamically-typed value capable of holding every
//! MessagePack-defined type except extension types, which are recognized on
//! the wire only to be skipped over. [`pack`] always chooses the shortest
//! legal on-wire encoding for a given value; [`unpack`]/[`unpack_all`] decode
//! one or more concatenated values back out of a byte buffer.
#![allow(dead_code)]

extern crate byteorder;

mod error;
mod marker;
mod packer;
mod unpacker;
mod value;

pub use error::{Error, Result};
pub use packer::{pack, pack_bin, pack_bool, pack_float, pack_int, pack_nil, pack_str, pack_uint, Packer};
pub use unpacker::{try_unpack, unpack, unpack_all, Unpacker};
pub use value::{Tag, Value};
