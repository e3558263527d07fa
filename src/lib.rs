// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Schema-driven Thrift binary struct serialization.
//!
//! A [`schema::StructSchema`] describes a struct's fields by id, name and
//! type. The [`codec::StructCodec`] walks that schema to move a
//! [`value::StructInstance`] to and from any [`protocol::TOutputProtocol`] /
//! [`protocol::TInputProtocol`], with [`binary`] providing the strict
//! big-endian binary protocol. Typed structs implement
//! [`encoding::ThriftStruct`] on top of that, and [`metastore`] carries the
//! Hive metastore structures this crate was built for.

pub mod binary;
pub mod codec;
pub mod config;
pub mod encoding;
pub mod errs;
pub mod metastore;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod ttype;
pub mod value;

pub use crate::{
    binary::{
        TBinaryInputProtocol,
        TBinaryOutputProtocol,
    },
    codec::StructCodec,
    config::{
        CodecConfig,
        Validation,
    },
    encoding::ThriftStruct,
    errs::{
        CodecError,
        Result,
        SchemaError,
        StreamError,
    },
    schema::{
        FieldSchema,
        StructSchema,
        TypeDescriptor,
    },
    ttype::TType,
    value::{
        StructInstance,
        Value,
    },
};
