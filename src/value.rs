//! Loggable values
//!
//! Every value handed to the logger is borrowed and turned into a [`LogValue`],
//! a closed set of kinds the formatter knows how to render. The original value
//! is never consumed by this conversion, so the entry point can hand it back to
//! the caller unchanged.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::fs::File;
use std::io::{Stderr, Stdin, Stdout};
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;

/// A numeric value, kept in the widest representation of its family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Signed(n) => write!(f, "{}", n),
            Number::Unsigned(n) => write!(f, "{}", n),
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Signed(i128::from(i))
        } else if let Some(u) = n.as_u64() {
            Number::Unsigned(u128::from(u))
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// The kinds of value the formatter can render
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Boolean(bool),
    Number(Number),
    Text(String),
    /// An absent value (`None`, `()`, JSON `null`)
    Null,
    Sequence(Vec<LogValue>),
    /// Key/value pairs in display order
    Mapping(Vec<(String, LogValue)>),
    /// An opaque object, identified by its type name
    Object(String),
    /// An opaque OS resource, identified by its kind
    Handle(String),
    /// Anything else, already converted to its best-effort string form
    Unknown(String),
}

impl LogValue {
    /// Opaque object value named after `T`
    pub fn object_of<T: ?Sized>() -> Self {
        LogValue::Object(std::any::type_name::<T>().to_string())
    }

    /// Opaque handle value of the given kind
    pub fn handle(kind: impl Into<String>) -> Self {
        LogValue::Handle(kind.into())
    }

    /// Build a tree from anything serde can serialize
    ///
    /// Values serde cannot represent as JSON fall back to an `Unknown` carrying
    /// the serializer's complaint.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => LogValue::from(&json),
            Err(e) => LogValue::Unknown(format!("unserializable value: {}", e)),
        }
    }

    /// Whether this value renders as a tree
    pub fn is_container(&self) -> bool {
        matches!(self, LogValue::Sequence(_) | LogValue::Mapping(_))
    }
}

impl From<&serde_json::Value> for LogValue {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => LogValue::Null,
            serde_json::Value::Bool(b) => LogValue::Boolean(*b),
            serde_json::Value::Number(n) => LogValue::Number(Number::from(n)),
            serde_json::Value::String(s) => LogValue::Text(s.clone()),
            serde_json::Value::Array(items) => {
                LogValue::Sequence(items.iter().map(LogValue::from).collect())
            }
            serde_json::Value::Object(map) => LogValue::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), LogValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A value that can be handed to the logger
///
/// Implementations only borrow `self`; the logger returns the value itself.
pub trait Loggable {
    fn to_log_value(&self) -> LogValue;
}

impl Loggable for LogValue {
    fn to_log_value(&self) -> LogValue {
        self.clone()
    }
}

impl Loggable for bool {
    fn to_log_value(&self) -> LogValue {
        LogValue::Boolean(*self)
    }
}

macro_rules! impl_loggable_number {
    ($variant:ident, $wide:ty: $($ty:ty),+) => {
        $(
            impl Loggable for $ty {
                fn to_log_value(&self) -> LogValue {
                    LogValue::Number(Number::$variant(*self as $wide))
                }
            }
        )+
    };
}

impl_loggable_number!(Signed, i128: i8, i16, i32, i64, i128, isize);
impl_loggable_number!(Unsigned, u128: u8, u16, u32, u64, u128, usize);
impl_loggable_number!(Float, f64: f64);

impl Loggable for f32 {
    fn to_log_value(&self) -> LogValue {
        // Widening with `as` exposes the binary approximation (1.1 -> 1.100000023841858)
        let shortest = self.to_string().parse::<f64>().unwrap_or(f64::from(*self));
        LogValue::Number(Number::Float(shortest))
    }
}

impl Loggable for char {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.to_string())
    }
}

impl Loggable for str {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.to_string())
    }
}

impl Loggable for String {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.clone())
    }
}

impl Loggable for Cow<'_, str> {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.to_string())
    }
}

impl Loggable for Path {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.display().to_string())
    }
}

impl Loggable for PathBuf {
    fn to_log_value(&self) -> LogValue {
        self.as_path().to_log_value()
    }
}

impl Loggable for () {
    fn to_log_value(&self) -> LogValue {
        LogValue::Null
    }
}

impl<T: Loggable> Loggable for Option<T> {
    fn to_log_value(&self) -> LogValue {
        match self {
            Some(value) => value.to_log_value(),
            None => LogValue::Null,
        }
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable + ?Sized> Loggable for &mut T {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable + ?Sized> Loggable for Box<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable + ?Sized> Loggable for Rc<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable + ?Sized> Loggable for Arc<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable> Loggable for [T] {
    fn to_log_value(&self) -> LogValue {
        LogValue::Sequence(self.iter().map(Loggable::to_log_value).collect())
    }
}

impl<T: Loggable, const N: usize> Loggable for [T; N] {
    fn to_log_value(&self) -> LogValue {
        self.as_slice().to_log_value()
    }
}

impl<T: Loggable> Loggable for Vec<T> {
    fn to_log_value(&self) -> LogValue {
        self.as_slice().to_log_value()
    }
}

impl<T: Loggable> Loggable for VecDeque<T> {
    fn to_log_value(&self) -> LogValue {
        LogValue::Sequence(self.iter().map(Loggable::to_log_value).collect())
    }
}

impl<K: fmt::Display, V: Loggable> Loggable for BTreeMap<K, V> {
    fn to_log_value(&self) -> LogValue {
        LogValue::Mapping(
            self.iter()
                .map(|(k, v)| (k.to_string(), v.to_log_value()))
                .collect(),
        )
    }
}

impl<K: fmt::Display, V: Loggable, S> Loggable for HashMap<K, V, S> {
    fn to_log_value(&self) -> LogValue {
        // Hash order changes between runs; sort so the same map logs the same way
        let mut entries: Vec<(String, LogValue)> = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_log_value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        LogValue::Mapping(entries)
    }
}

impl Loggable for serde_json::Value {
    fn to_log_value(&self) -> LogValue {
        LogValue::from(self)
    }
}

/// Implement [`Loggable`] for types that should log as `object(TypeName)`
///
/// ```
/// struct Session;
/// taplog::loggable_object!(Session);
/// ```
#[macro_export]
macro_rules! loggable_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Loggable for $ty {
                fn to_log_value(&self) -> $crate::LogValue {
                    $crate::LogValue::object_of::<$ty>()
                }
            }
        )+
    };
}

/// Implement [`Loggable`] for types that should log as `resource(kind)`
///
/// ```
/// struct Connection;
/// taplog::loggable_handle!(Connection => "database link");
/// ```
#[macro_export]
macro_rules! loggable_handle {
    ($($ty:ty => $kind:expr),+ $(,)?) => {
        $(
            impl $crate::Loggable for $ty {
                fn to_log_value(&self) -> $crate::LogValue {
                    $crate::LogValue::handle($kind)
                }
            }
        )+
    };
}

crate::loggable_handle!(
    File => "file",
    Stdin => "stream",
    Stdout => "stream",
    Stderr => "stream",
    TcpStream => "socket",
    TcpListener => "socket",
    UdpSocket => "socket",
    Child => "process",
    ChildStdin => "pipe",
    ChildStdout => "pipe",
    ChildStderr => "pipe",
);

/// Wrapper that logs any `Debug` value by its debug representation
///
/// Derefs to the inner value, so a `Raw` returned from the logger can be used
/// in place of what it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Raw<T>(pub T);

impl<T> Raw<T> {
    /// Unwrap the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Raw<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Raw<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: fmt::Debug> Loggable for Raw<T> {
    fn to_log_value(&self) -> LogValue {
        LogValue::Unknown(format!("{:?}", self.0))
    }
}

/// A group of heterogeneous values logged in one call
///
/// Implemented for tuples of up to twelve [`Loggable`] values, so each element
/// keeps its own type through the pass-through.
pub trait LogArgs {
    fn to_log_values(&self) -> Vec<LogValue>;
}

impl LogArgs for () {
    fn to_log_values(&self) -> Vec<LogValue> {
        Vec::new()
    }
}

macro_rules! impl_log_args {
    ($($name:ident),+) => {
        impl<$($name: Loggable),+> LogArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_log_values(&self) -> Vec<LogValue> {
                let ($($name,)+) = self;
                vec![$($name.to_log_value()),+]
            }
        }
    };
}

impl_log_args!(A);
impl_log_args!(A, B);
impl_log_args!(A, B, C);
impl_log_args!(A, B, C, D);
impl_log_args!(A, B, C, D, E);
impl_log_args!(A, B, C, D, E, F);
impl_log_args!(A, B, C, D, E, F, G);
impl_log_args!(A, B, C, D, E, F, G, H);
impl_log_args!(A, B, C, D, E, F, G, H, I);
impl_log_args!(A, B, C, D, E, F, G, H, I, J);
impl_log_args!(A, B, C, D, E, F, G, H, I, J, K);
impl_log_args!(A, B, C, D, E, F, G, H, I, J, K, L);
