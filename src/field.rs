use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::error::EncodeError;

/// Writes values positionally, inside an array or object.
///
/// Every typed helper is a shorthand for [`ArrayEncoder::append`] with the
/// matching [`FieldValue`].
pub trait ArrayEncoder {
    fn append(&mut self, value: &FieldValue) -> Result<(), EncodeError>;

    fn append_bool(&mut self, value: bool) -> Result<(), EncodeError> {
        self.append(&FieldValue::Bool(value))
    }

    fn append_i64(&mut self, value: i64) -> Result<(), EncodeError> {
        self.append(&FieldValue::Int(value))
    }

    fn append_u64(&mut self, value: u64) -> Result<(), EncodeError> {
        self.append(&FieldValue::Uint(value))
    }

    fn append_f64(&mut self, value: f64) -> Result<(), EncodeError> {
        self.append(&FieldValue::Float64(value))
    }

    fn append_str(&mut self, value: &str) -> Result<(), EncodeError> {
        self.append(&FieldValue::String(value.to_owned()))
    }

    fn append_duration(&mut self, value: Duration) -> Result<(), EncodeError> {
        self.append(&FieldValue::Duration(value))
    }

    fn append_array(&mut self, value: Arc<dyn ArrayMarshaler>) -> Result<(), EncodeError> {
        self.append(&FieldValue::Array(value))
    }

    fn append_object(&mut self, value: Arc<dyn ObjectMarshaler>) -> Result<(), EncodeError> {
        self.append(&FieldValue::Object(value))
    }
}

/// Writes values under a key.
pub trait ObjectEncoder {
    fn add(&mut self, key: &str, value: &FieldValue) -> Result<(), EncodeError>;

    /// Namespaces are not scoped: fields added afterwards stay flat.
    fn open_namespace(&mut self, key: &str);

    fn add_bool(&mut self, key: &str, value: bool) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Bool(value))
    }

    fn add_i64(&mut self, key: &str, value: i64) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Int(value))
    }

    fn add_u64(&mut self, key: &str, value: u64) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Uint(value))
    }

    fn add_f64(&mut self, key: &str, value: f64) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Float64(value))
    }

    fn add_str(&mut self, key: &str, value: &str) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::String(value.to_owned()))
    }

    fn add_duration(&mut self, key: &str, value: Duration) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Duration(value))
    }

    fn add_array(&mut self, key: &str, value: Arc<dyn ArrayMarshaler>) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Array(value))
    }

    fn add_object(&mut self, key: &str, value: Arc<dyn ObjectMarshaler>) -> Result<(), EncodeError> {
        self.add(key, &FieldValue::Object(value))
    }
}

/// Produces the elements of an array field.
pub trait ArrayMarshaler: Send + Sync {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<(), EncodeError>;
}

/// Produces the members of an object field.
pub trait ObjectMarshaler: Send + Sync {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<(), EncodeError>;
}

impl<T> ArrayMarshaler for Vec<T>
where
    T: Clone + Into<FieldValue> + Send + Sync,
{
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<(), EncodeError> {
        for item in self {
            enc.append(&item.clone().into())?;
        }
        Ok(())
    }
}

struct ArrayFn<F>(F);

impl<F> ArrayMarshaler for ArrayFn<F>
where
    F: Fn(&mut dyn ArrayEncoder) -> Result<(), EncodeError> + Send + Sync,
{
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<(), EncodeError> {
        (self.0)(enc)
    }
}

struct ObjectFn<F>(F);

impl<F> ObjectMarshaler for ObjectFn<F>
where
    F: Fn(&mut dyn ObjectEncoder) -> Result<(), EncodeError> + Send + Sync,
{
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<(), EncodeError> {
        (self.0)(enc)
    }
}

/// An arbitrary value rendered through its `Debug` implementation.
#[derive(Clone)]
pub struct Reflected {
    value: Arc<dyn fmt::Debug + Send + Sync>,
    type_name: &'static str,
}

impl Reflected {
    pub fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn value(&self) -> &(dyn fmt::Debug + Send + Sync) {
        self.value.as_ref()
    }
}

/// One value of any supported kind.
///
/// Every integer width converts into `Int` or `Uint`; their rendering does
/// not depend on the width.
#[derive(Clone)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float64(f64),
    Float32(f32),
    Complex128(f64, f64),
    Complex64(f32, f32),
    String(String),
    /// Raw bytes rendered like a string, without re-encoding.
    ByteString(Vec<u8>),
    /// Opaque bytes rendered as hex.
    Binary(Vec<u8>),
    Duration(Duration),
    Time(DateTime<FixedOffset>),
    Array(Arc<dyn ArrayMarshaler>),
    Object(Arc<dyn ObjectMarshaler>),
    Reflected(Reflected),
    Error(Arc<dyn std::error::Error + Send + Sync>),
    Namespace,
    Skip,
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            FieldValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            FieldValue::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            FieldValue::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            FieldValue::Float32(v) => f.debug_tuple("Float32").field(v).finish(),
            FieldValue::Complex128(re, im) => f.debug_tuple("Complex128").field(re).field(im).finish(),
            FieldValue::Complex64(re, im) => f.debug_tuple("Complex64").field(re).field(im).finish(),
            FieldValue::String(v) => f.debug_tuple("String").field(v).finish(),
            FieldValue::ByteString(v) => f.debug_tuple("ByteString").field(v).finish(),
            FieldValue::Binary(v) => f.debug_tuple("Binary").field(v).finish(),
            FieldValue::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            FieldValue::Time(v) => f.debug_tuple("Time").field(v).finish(),
            FieldValue::Array(_) => f.write_str("Array(..)"),
            FieldValue::Object(_) => f.write_str("Object(..)"),
            FieldValue::Reflected(r) => write!(f, "Reflected({})", r.type_name),
            FieldValue::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            FieldValue::Namespace => f.write_str("Namespace"),
            FieldValue::Skip => f.write_str("Skip"),
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty; $($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from_int!(Int, i64; i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64; u8, u16, u32, u64, usize);

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float64(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float32(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<Duration> for FieldValue {
    fn from(v: Duration) -> Self {
        FieldValue::Duration(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for FieldValue {
    fn from(v: DateTime<Tz>) -> Self {
        FieldValue::Time(v.fixed_offset())
    }
}

/// A keyed value attached to an entry or to a logger's context.
#[derive(Clone, Debug)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, value)
    }

    pub fn int(key: impl Into<String>, value: impl Into<i64>) -> Self {
        Self::new(key, FieldValue::Int(value.into()))
    }

    pub fn uint(key: impl Into<String>, value: impl Into<u64>) -> Self {
        Self::new(key, FieldValue::Uint(value.into()))
    }

    pub fn f64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, value)
    }

    pub fn f32(key: impl Into<String>, value: f32) -> Self {
        Self::new(key, value)
    }

    pub fn complex128(key: impl Into<String>, re: f64, im: f64) -> Self {
        Self::new(key, FieldValue::Complex128(re, im))
    }

    pub fn complex64(key: impl Into<String>, re: f32, im: f32) -> Self {
        Self::new(key, FieldValue::Complex64(re, im))
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn byte_string(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::ByteString(value.into()))
    }

    pub fn binary(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::Binary(value.into()))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, value)
    }

    pub fn time<Tz: TimeZone>(key: impl Into<String>, value: DateTime<Tz>) -> Self {
        Self::new(key, value)
    }

    pub fn array(key: impl Into<String>, value: impl ArrayMarshaler + 'static) -> Self {
        Self::new(key, FieldValue::Array(Arc::new(value)))
    }

    /// Array whose elements are written by `f`.
    pub fn array_with<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn ArrayEncoder) -> Result<(), EncodeError> + Send + Sync + 'static,
    {
        Self::array(key, ArrayFn(f))
    }

    pub fn object(key: impl Into<String>, value: impl ObjectMarshaler + 'static) -> Self {
        Self::new(key, FieldValue::Object(Arc::new(value)))
    }

    /// Object whose members are written by `f`.
    pub fn object_with<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn ObjectEncoder) -> Result<(), EncodeError> + Send + Sync + 'static,
    {
        Self::object(key, ObjectFn(f))
    }

    /// Any `Debug` value.
    pub fn any<T>(key: impl Into<String>, value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self::new(key, FieldValue::Reflected(Reflected::new(value)))
    }

    /// An error under the conventional `error` key.
    pub fn error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::named_error("error", err)
    }

    pub fn named_error<E>(key: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(key, FieldValue::Error(Arc::new(err)))
    }

    /// The current call stack, captured now.
    pub fn stack(key: impl Into<String>) -> Self {
        Self::string(key, Backtrace::force_capture().to_string())
    }

    pub fn namespace(key: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Namespace)
    }

    /// A field that renders nothing.
    pub fn skip() -> Self {
        Self::new(String::new(), FieldValue::Skip)
    }

    /// Adds this field to `enc`.
    ///
    /// When the value fails to render, a string field named `<key>Error`
    /// carrying the message is added instead and the error is returned.
    pub fn add_to(&self, enc: &mut dyn ObjectEncoder) -> Result<(), EncodeError> {
        match enc.add(&self.key, &self.value) {
            Ok(()) => Ok(()),
            Err(err) => {
                enc.add_str(&format!("{}Error", self.key), &err.to_string())?;
                Err(err)
            }
        }
    }
}
