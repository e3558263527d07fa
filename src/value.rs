// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::collections::{
    btree_map,
    BTreeMap,
    BTreeSet,
};

use bytes::Bytes;

use crate::{
    errs::{
        CodecError,
        Result,
    },
    schema::{
        StructSchema,
        TypeDescriptor,
    },
    ttype::TType,
};

/// A dynamically typed value, as read off the wire or built by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    Binary(Bytes),
    Struct(StructInstance),
    List(Vec<Value>),
    Set(Vec<Value>),
    /// Pairs keep the order they were inserted or read in.
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn ttype(&self) -> TType {
        match self {
            | Value::Bool(_) => TType::Bool,
            | Value::I8(_) => TType::I8,
            | Value::I16(_) => TType::I16,
            | Value::I32(_) => TType::I32,
            | Value::I64(_) => TType::I64,
            | Value::Double(_) => TType::Double,
            | Value::String(_) | Value::Binary(_) => TType::String,
            | Value::Struct(_) => TType::Struct,
            | Value::List(_) => TType::List,
            | Value::Set(_) => TType::Set,
            | Value::Map(_) => TType::Map,
        }
    }

    /// Whether this value, and everything nested in it, has the shape `ty`
    /// describes.
    pub fn conforms_to(&self, ty: &TypeDescriptor) -> bool {
        self.find_mismatch(ty).is_none()
    }

    pub(crate) fn find_mismatch(&self, ty: &TypeDescriptor) -> Option<Mismatch> {
        match (self, ty) {
            | (Value::Bool(_), TypeDescriptor::Bool)
            | (Value::I8(_), TypeDescriptor::I8)
            | (Value::I16(_), TypeDescriptor::I16)
            | (Value::I32(_), TypeDescriptor::I32)
            | (Value::I64(_), TypeDescriptor::I64)
            | (Value::Double(_), TypeDescriptor::Double)
            | (Value::String(_), TypeDescriptor::String)
            | (Value::Binary(_), TypeDescriptor::Binary) => None,
            | (Value::Struct(instance), TypeDescriptor::Struct(schema)) => {
                instance.find_mismatch(schema)
            },
            | (Value::List(items), TypeDescriptor::List(elem))
            | (Value::Set(items), TypeDescriptor::Set(elem)) => {
                items.iter().enumerate().find_map(|(idx, item)| {
                    item.find_mismatch(elem)
                        .map(|m| m.within(format!("[{}]", idx)))
                })
            },
            | (Value::Map(pairs), TypeDescriptor::Map(key_ty, val_ty)) => {
                pairs.iter().enumerate().find_map(|(idx, (key, val))| {
                    key.find_mismatch(key_ty)
                        .map(|m| m.within(format!("{{key {}}}", idx)))
                        .or_else(|| {
                            val.find_mismatch(val_ty)
                                .map(|m| m.within(format!("[{}]", idx)))
                        })
                })
            },
            | _ => Some(Mismatch {
                path: String::new(),
                expected: ty.ttype(),
                found: self.ttype(),
            }),
        }
    }
}

/// Where a value first departs from its descriptor, relative to the value
/// being checked.
#[derive(Debug)]
pub(crate) struct Mismatch {
    path: String,
    expected: TType,
    found: TType,
}

impl Mismatch {
    fn within(mut self, segment: String) -> Self {
        self.path.insert_str(0, &segment);
        self
    }

    pub(crate) fn into_error(self, field: &str) -> CodecError {
        CodecError::Type {
            field: format!("{}{}", field, self.path),
            expected: self.expected,
            found: self.found,
        }
    }
}

/// A record keyed by field name. A field that isn't in the map is absent;
/// there is no null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructInstance {
    fields: BTreeMap<String, Value>,
}

impl StructInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Like [`StructInstance::with`], leaving the field absent on `None`.
    pub fn with_opt<V: Into<Value>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field and convert it to `T`.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<Option<T>> {
        match self.fields.remove(name) {
            | None => Ok(None),
            | Some(value) => T::from_value(name, value).map(Some),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn conforms_to(&self, schema: &StructSchema) -> bool {
        self.find_mismatch(schema).is_none()
    }

    pub(crate) fn find_mismatch(&self, schema: &StructSchema) -> Option<Mismatch> {
        schema.fields().iter().find_map(|field| {
            self.fields
                .get(field.name())
                .and_then(|value| value.find_mismatch(field.ty()))
                .map(|m| m.within(format!(".{}", field.name())))
        })
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for StructInstance {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        StructInstance {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StructInstance {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Conversion out of a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    /// The wire type a value must have to convert.
    const TTYPE: TType;

    /// `field` names the value in the error if its shape is wrong.
    fn from_value(field: &str, value: Value) -> Result<Self>;
}

pub(crate) fn type_error(field: &str, expected: TType, found: &Value) -> CodecError {
    CodecError::Type {
        field: field.to_string(),
        expected,
        found: found.ttype(),
    }
}

macro_rules! primitive_value {
    ($($ty:ty => $variant:ident, $ttype:ident);* $(;)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                const TTYPE: TType = TType::$ttype;

                fn from_value(field: &str, value: Value) -> Result<Self> {
                    match value {
                        | Value::$variant(v) => Ok(v),
                        | other => Err(type_error(field, Self::TTYPE, &other)),
                    }
                }
            }
        )*
    };
}

primitive_value! {
    bool => Bool, Bool;
    i8 => I8, I8;
    i16 => I16, I16;
    i32 => I32, I32;
    i64 => I64, I64;
    f64 => Double, Double;
    String => String, String;
    Bytes => Binary, String;
    StructInstance => Struct, Struct;
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(v: BTreeSet<T>) -> Self {
        Value::Set(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TTYPE: TType = TType::List;

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            | Value::List(items) => items.into_iter().map(|v| T::from_value(field, v)).collect(),
            | other => Err(type_error(field, Self::TTYPE, &other)),
        }
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    const TTYPE: TType = TType::Set;

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            | Value::Set(items) => items.into_iter().map(|v| T::from_value(field, v)).collect(),
            | other => Err(type_error(field, Self::TTYPE, &other)),
        }
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    const TTYPE: TType = TType::Map;

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            | Value::Map(pairs) => pairs
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(field, k)?, V::from_value(field, v)?)))
                .collect(),
            | other => Err(type_error(field, Self::TTYPE, &other)),
        }
    }
}
