//! Serde support: whole rows from `Serialize` values.
//!
//! A row is any struct, tuple, tuple struct or sequence whose members are
//! scalars. Each member becomes one field, in declaration order:
//!
//! | Rust value | Field |
//! |------------|-------|
//! | `bool` | `TRUE` / `FALSE` |
//! | integers, floats | decimal text |
//! | `&str`, `String`, `char` | escaped text |
//! | byte strings (`serialize_bytes`) | `bytea` hex |
//! | `None`, `()` | null marker |
//! | unit enum variants | the variant name |
//!
//! Maps, nested structs and nested sequences have no field representation
//! and fail with [`Error::UnsupportedType`].
//!
//! ## Usage
//!
//! Most users call [`CopySerializer::add_row`] or the crate-level
//! [`to_vec`](crate::to_vec):
//!
//! ```rust
//! use copy_text::to_vec;
//!
//! let rows = vec![(1, "one"), (2, "two")];
//! let bytes = to_vec(&rows, 2).unwrap();
//! assert_eq!(bytes, b"1\tone\n2\ttwo\n");
//! ```

use crate::{CopySerializer, Error, Result};
use serde::ser::{self, Impossible, Serialize, Serializer as _};
use std::io::Write;

/// Serializes one row into a [`CopySerializer`].
///
/// The row is not terminated; [`CopySerializer::add_row`] calls
/// [`CopySerializer::end_row`] afterwards.
pub struct RowSerializer<'a, W: Write> {
    ser: &'a mut CopySerializer<W>,
}

impl<'a, W: Write> RowSerializer<'a, W> {
    pub fn new(ser: &'a mut CopySerializer<W>) -> Self {
        RowSerializer { ser }
    }

    fn field(self) -> FieldSerializer<'a, W> {
        FieldSerializer { ser: self.ser }
    }
}

impl<'a, W: Write> ser::Serializer for RowSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, W>;
    type SerializeTuple = Compound<'a, W>;
    type SerializeTupleStruct = Compound<'a, W>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Compound<'a, W>;
    type SerializeStructVariant = Impossible<(), Error>;

    // A bare scalar is a one-column row.

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.field().serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.field().serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.field().serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.field().serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.field().serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.field().serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.field().serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.field().serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.field().serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.field().serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.field().serialize_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.field().serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.field().serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.field().serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.field().serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.field().serialize_bytes(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.field().serialize_none()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.field().serialize_unit()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.field().serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.field().serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::unsupported_type(&format!(
            "enum variant {}::{} as a row",
            name, variant
        )))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(Compound { ser: self.ser })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(Compound { ser: self.ser })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(Compound { ser: self.ser })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported_type(&format!(
            "enum variant {}::{} as a row",
            name, variant
        )))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::unsupported_type("map as a row; use a struct"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(Compound { ser: self.ser })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::unsupported_type(&format!(
            "enum variant {}::{} as a row",
            name, variant
        )))
    }
}

/// Writes each member of a row as one field.
pub struct Compound<'a, W: Write> {
    ser: &'a mut CopySerializer<W>,
}

impl<'a, W: Write> Compound<'a, W> {
    fn add<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(FieldSerializer {
            ser: &mut *self.ser,
        })
    }
}

impl<'a, W: Write> ser::SerializeSeq for Compound<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.add(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeTuple for Compound<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.add(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeTupleStruct for Compound<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.add(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeStruct for Compound<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.add(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Serializes one scalar into one field.
struct FieldSerializer<'a, W: Write> {
    ser: &'a mut CopySerializer<W>,
}

fn nested(kind: &str) -> Error {
    Error::unsupported_type(&format!("nested {} inside a field", kind))
}

impl<'a, W: Write> ser::Serializer for FieldSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.ser.add_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.ser.add_i16(v as i16)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.ser.add_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.ser.add_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.ser.add_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.ser.add_display(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.ser.add_u32(v as u32)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.ser.add_u32(v as u32)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.ser.add_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.ser.add_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.ser.add_display(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.ser.add_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.ser.add_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.ser.add_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.ser.add_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.ser.add_bytes(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.ser.add_null()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.ser.add_null()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.ser.add_null()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.ser.add_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(nested("enum variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(nested("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(nested("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(nested("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(nested("enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(nested("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(nested("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(nested("enum variant"))
    }
}
