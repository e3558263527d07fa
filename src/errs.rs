// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::ttype::TType;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    /// A value's shape disagrees with the wire type its field declares.
    #[error("bad type in structure: field `{field}` expects {expected:?}, found {found:?}")]
    Type {
        field: String,
        expected: TType,
        found: TType,
    },
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error("nesting depth exceeds limit of {0}")]
    DepthLimit(usize),
    #[error("required field `{field}` is unset in `{name}`")]
    MissingRequired {
        name: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CodecError {
    pub fn is_type_error(&self) -> bool {
        matches!(self, CodecError::Type { .. })
    }
}

/// Failures raised by the primitive readers and writers.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("output buffer full: needed {needed} bytes, {remaining} remaining")]
    BufferFull { needed: usize, remaining: usize },
    #[error("invalid wire type tag {0:#04x}")]
    InvalidType(u8),
    #[error("negative size {0}")]
    NegativeSize(i32),
    #[error("size {size} exceeds the limit of {limit}")]
    SizeLimit { size: usize, limit: usize },
    #[error("string is not valid utf-8")]
    InvalidUtf8(#[from] FromUtf8Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate field id {id} in `{name}`")]
    DuplicateFieldId { name: &'static str, id: u16 },
    #[error("duplicate field name `{field}` in `{name}`")]
    DuplicateFieldName {
        name: &'static str,
        field: &'static str,
    },
    #[error("a different schema is already registered as `{0}`")]
    Conflict(&'static str),
}
