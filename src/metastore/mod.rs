// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Metastore RPC structures: their static schemas and typed counterparts.
//!
//! Every typed struct keeps each field as an [`Option`], including the ones
//! the schema marks required. The codec only enforces `required` when asked
//! to (see [`crate::config::Validation`]), so a decoded struct may be missing
//! any of them.

/// Defines an i32-backed enum. Values outside the declared set survive as
/// `Unknown` so a newer peer's states don't fail decoding.
macro_rules! thrift_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal => $text:literal),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            Unknown(i32),
        }

        impl From<i32> for $name {
            fn from(v: i32) -> Self {
                match v {
                    $(| $value => $name::$variant,)*
                    | other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> i32 {
                match v {
                    $(| $name::$variant => $value,)*
                    | $name::Unknown(other) => other,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(| $name::$variant => f.write_str($text),)*
                    | $name::Unknown(other) => write!(f, "UNKNOWN({})", other),
                }
            }
        }

        impl From<$name> for $crate::value::Value {
            fn from(v: $name) -> Self {
                $crate::value::Value::I32(v.into())
            }
        }

        impl $crate::value::FromValue for $name {
            const TTYPE: $crate::ttype::TType = $crate::ttype::TType::I32;

            fn from_value(field: &str, value: $crate::value::Value) -> $crate::errs::Result<Self> {
                <i32 as $crate::value::FromValue>::from_value(field, value).map($name::from)
            }
        }
    };
}

mod lock;
mod partition;
mod schema_version;

pub use lock::{
    LockResponse,
    LockState,
    LOCK_RESPONSE,
};
pub use partition::{
    AlterPartitionsWithEnvironmentContextArgs,
    EnvironmentContext,
    Partition,
    ALTER_PARTITIONS_WITH_ENVIRONMENT_CONTEXT_ARGS,
    ENVIRONMENT_CONTEXT,
    PARTITION,
};
pub use schema_version::{
    ISchemaName,
    SchemaVersionDescriptor,
    SchemaVersionState,
    SetSchemaVersionStateRequest,
    ISCHEMA_NAME,
    SCHEMA_VERSION_DESCRIPTOR,
    SET_SCHEMA_VERSION_STATE_REQUEST,
};

use crate::schema::StructSchema;

/// Every metastore schema this crate defines.
pub fn schemas() -> [&'static StructSchema; 7] {
    [
        &LOCK_RESPONSE,
        &ISCHEMA_NAME,
        &SCHEMA_VERSION_DESCRIPTOR,
        &SET_SCHEMA_VERSION_STATE_REQUEST,
        &ENVIRONMENT_CONTEXT,
        &PARTITION,
        &ALTER_PARTITIONS_WITH_ENVIRONMENT_CONTEXT_ARGS,
    ]
}
