//! Static shape description of bindable values.
//!
//! Each bindable type exposes a [`Slot`]: a mutable view tagged with the
//! capability the coercer and the field walker dispatch on. Shapes are
//! decided by trait impls at compile time, so no runtime type inspection
//! is needed.

use bytes::Bytes;

use crate::coerce::coerce;
use crate::error::{BoxError, CoerceError};
use crate::record::Record;

/// A value that can be populated from raw request strings.
pub trait Bindable {
    fn slot(&mut self) -> Slot<'_>;

    /// Shape of `Vec<Self>`.
    ///
    /// Only `u8` overrides this, which makes `Vec<u8>` bind the raw bytes
    /// of a value instead of parsing one number per element.
    #[doc(hidden)]
    fn vec_slot(vec: &mut Vec<Self>) -> Slot<'_>
    where
        Self: Sized + Default,
    {
        Slot::Sequence(vec)
    }
}

/// Mutable view of a bindable value, tagged by shape.
pub enum Slot<'a> {
    Scalar(Scalar<'a>),
    Bytes(&'a mut dyn ByteSink),
    Sequence(&'a mut dyn Sequence),
    /// Optional storage, allocated on first use.
    Pointer(&'a mut dyn Pointer),
    /// Custom text decoding. Takes precedence over every built-in shape.
    Text(&'a mut dyn TextDecode),
    Record(&'a mut dyn Record),
}

impl Slot<'_> {
    /// Human readable shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Slot::Scalar(scalar) => scalar.kind(),
            Slot::Bytes(_) => "bytes",
            Slot::Sequence(_) => "sequence",
            Slot::Pointer(_) => "pointer",
            Slot::Text(_) => "text",
            Slot::Record(_) => "record",
        }
    }
}

/// Mutable reference to a primitive value.
pub enum Scalar<'a> {
    Bool(&'a mut bool),
    Char(&'a mut char),
    Str(&'a mut String),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    U128(&'a mut u128),
    Usize(&'a mut usize),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    I128(&'a mut i128),
    Isize(&'a mut isize),
    F32(&'a mut f32),
    F64(&'a mut f64),
}

impl Scalar<'_> {
    /// Name of the primitive type.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Char(_) => "char",
            Scalar::Str(_) => "string",
            Scalar::U8(_) => "u8",
            Scalar::U16(_) => "u16",
            Scalar::U32(_) => "u32",
            Scalar::U64(_) => "u64",
            Scalar::U128(_) => "u128",
            Scalar::Usize(_) => "usize",
            Scalar::I8(_) => "i8",
            Scalar::I16(_) => "i16",
            Scalar::I32(_) => "i32",
            Scalar::I64(_) => "i64",
            Scalar::I128(_) => "i128",
            Scalar::Isize(_) => "isize",
            Scalar::F32(_) => "f32",
            Scalar::F64(_) => "f64",
        }
    }
}

/// Custom decoding from a single raw text value.
///
/// ```
/// use reqbind::{Bindable, Slot, TextDecode, BoxError};
///
/// #[derive(Default)]
/// struct Sort {
///     name: String,
///     asc: bool,
/// }
///
/// impl TextDecode for Sort {
///     fn decode_text(&mut self, text: &str) -> Result<(), BoxError> {
///         let (name, dir) = text.split_once(',').unwrap_or((text, "asc"));
///         self.name = name.to_string();
///         self.asc = dir.eq_ignore_ascii_case("asc");
///         Ok(())
///     }
/// }
///
/// impl Bindable for Sort {
///     fn slot(&mut self) -> Slot<'_> {
///         Slot::Text(self)
///     }
/// }
/// ```
pub trait TextDecode {
    fn decode_text(&mut self, text: &str) -> Result<(), BoxError>;
}

/// Opaque byte storage assigned verbatim.
pub trait ByteSink {
    fn set_bytes(&mut self, bytes: &[u8]);
}

impl ByteSink for Vec<u8> {
    fn set_bytes(&mut self, bytes: &[u8]) {
        self.clear();
        self.extend_from_slice(bytes);
    }
}

impl ByteSink for Bytes {
    fn set_bytes(&mut self, bytes: &[u8]) {
        *self = Bytes::copy_from_slice(bytes);
    }
}

/// Growable sequence whose elements are decoded one raw value each.
pub trait Sequence {
    /// Replaces the contents with one element per raw value, in order.
    ///
    /// On error the sequence is left untouched.
    fn replace(&mut self, values: &[String]) -> Result<(), CoerceError>;
}

impl<T> Sequence for Vec<T>
where
    T: Bindable + Default,
{
    fn replace(&mut self, values: &[String]) -> Result<(), CoerceError> {
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            let mut item = T::default();
            coerce(&mut item, std::slice::from_ref(value))?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }
}

/// Optional storage allocated on first use.
pub trait Pointer {
    fn get_or_alloc(&mut self) -> &mut dyn Bindable;
}

impl<T> Pointer for Option<T>
where
    T: Bindable + Default,
{
    fn get_or_alloc(&mut self) -> &mut dyn Bindable {
        self.get_or_insert_with(T::default)
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Bindable for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Scalar(Scalar::$variant(self))
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    char => Char,
    String => Str,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    f32 => F32,
    f64 => F64,
}

impl Bindable for u8 {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Scalar(Scalar::U8(self))
    }

    fn vec_slot(vec: &mut Vec<Self>) -> Slot<'_> {
        Slot::Bytes(vec)
    }
}

impl Bindable for Bytes {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Bytes(self)
    }
}

impl<T> Bindable for Vec<T>
where
    T: Bindable + Default,
{
    fn slot(&mut self) -> Slot<'_> {
        T::vec_slot(self)
    }
}

impl<T> Bindable for Option<T>
where
    T: Bindable + Default,
{
    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T> Bindable for Box<T>
where
    T: Bindable + ?Sized,
{
    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(true.slot().shape(), "bool");
        assert_eq!(String::new().slot().shape(), "string");
        assert_eq!(0u8.slot().shape(), "u8");
        assert_eq!(0i64.slot().shape(), "i64");
        assert_eq!(0f32.slot().shape(), "f32");
    }

    #[test]
    fn test_byte_vec_is_bytes() {
        let mut v: Vec<u8> = Vec::new();
        assert!(matches!(v.slot(), Slot::Bytes(_)));
        let mut b = Bytes::new();
        assert!(matches!(b.slot(), Slot::Bytes(_)));
    }

    #[test]
    fn test_other_vecs_are_sequences() {
        let mut v: Vec<u16> = Vec::new();
        assert!(matches!(v.slot(), Slot::Sequence(_)));
        let mut v: Vec<String> = Vec::new();
        assert!(matches!(v.slot(), Slot::Sequence(_)));
        let mut v: Vec<Vec<u8>> = Vec::new();
        assert!(matches!(v.slot(), Slot::Sequence(_)));
    }

    #[test]
    fn test_option_is_pointer() {
        let mut v: Option<i32> = None;
        assert!(matches!(v.slot(), Slot::Pointer(_)));
    }

    #[test]
    fn test_pointer_allocates_once() {
        let mut v: Option<i32> = None;
        {
            let Slot::Pointer(p) = v.slot() else {
                panic!("expected pointer");
            };
            let Slot::Scalar(Scalar::I32(n)) = p.get_or_alloc().slot() else {
                panic!("expected i32");
            };
            *n = 7;
        }
        assert_eq!(v, Some(7));

        let Slot::Pointer(p) = v.slot() else {
            panic!("expected pointer");
        };
        let Slot::Scalar(Scalar::I32(n)) = p.get_or_alloc().slot() else {
            panic!("expected i32");
        };
        assert_eq!(*n, 7);
    }

    #[test]
    fn test_box_delegates() {
        let mut v: Box<bool> = Box::new(false);
        assert_eq!(v.slot().shape(), "bool");
    }
}
