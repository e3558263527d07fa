// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use bytes::Bytes;

use crate::{
    codec::StructCodec,
    errs::Result,
    protocol::{
        TInputProtocol,
        TOutputProtocol,
    },
    schema::StructSchema,
    value::StructInstance,
};

/// A shared trait for statically typed structs that travel through the
/// [`StructCodec`]. Implementors only map themselves to and from a
/// [`StructInstance`]; the wire format is the codec's business.
pub trait ThriftStruct: Sized {
    fn struct_schema() -> &'static StructSchema;

    fn to_instance(&self) -> StructInstance;

    fn from_instance(instance: StructInstance) -> Result<Self>;

    /// The struct's name as the schema declares it.
    fn name() -> &'static str {
        Self::struct_schema().name()
    }

    fn write_to<P: TOutputProtocol + ?Sized>(&self, codec: &StructCodec, out: &mut P) -> Result<usize> {
        codec.encode(&self.to_instance(), Self::struct_schema(), out)
    }

    fn read_from<P: TInputProtocol + ?Sized>(codec: &StructCodec, input: &mut P) -> Result<Self> {
        Self::from_instance(codec.decode(Self::struct_schema(), input)?)
    }

    /// Encode with the binary protocol and default settings.
    fn to_bytes(&self) -> Result<Bytes> {
        StructCodec::default().encode_to_bytes(&self.to_instance(), Self::struct_schema())
    }

    fn from_bytes(src: Bytes) -> Result<Self> {
        Self::from_instance(StructCodec::default().decode_from_bytes(Self::struct_schema(), src)?)
    }
}

/// Lets a [`ThriftStruct`] sit inside a [`crate::value::Value`], so it can
/// be a field, list element or map entry of another struct.
macro_rules! struct_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for $crate::value::Value {
                fn from(v: $ty) -> Self {
                    $crate::value::Value::Struct($crate::encoding::ThriftStruct::to_instance(&v))
                }
            }

            impl $crate::value::FromValue for $ty {
                const TTYPE: $crate::ttype::TType = $crate::ttype::TType::Struct;

                fn from_value(field: &str, value: $crate::value::Value) -> $crate::errs::Result<Self> {
                    match value {
                        | $crate::value::Value::Struct(instance) => {
                            <$ty as $crate::encoding::ThriftStruct>::from_instance(instance)
                        },
                        | other => Err($crate::value::type_error(field, Self::TTYPE, &other)),
                    }
                }
            }
        )*
    };
}

pub(crate) use struct_value;
