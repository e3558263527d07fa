// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! The primitive vocabulary the struct codec drives. Anything that can read
//! and write these markers and primitives can carry a struct; the codec never
//! touches bytes directly.

use bytes::Bytes;
use tracing::trace;

use crate::{
    config::DEFAULT_MAX_DEPTH,
    errs::{
        CodecError,
        Result,
        StreamError,
    },
    ttype::TType,
};

/// The `(type, id)` pair announced ahead of every field. A [`TType::Stop`]
/// header ends the struct and carries id `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub ttype: TType,
    pub id: u16,
}

impl FieldHeader {
    pub const STOP: FieldHeader = FieldHeader {
        ttype: TType::Stop,
        id: 0,
    };

    #[inline]
    pub fn is_stop(&self) -> bool {
        self.ttype == TType::Stop
    }
}

/// Header of a list or a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub elem: TType,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key: TType,
    pub value: TType,
    pub size: usize,
}

pub trait TInputProtocol {
    fn read_struct_begin(&mut self) -> Result<()>;
    fn read_struct_end(&mut self) -> Result<()>;
    fn read_field_begin(&mut self) -> Result<FieldHeader>;
    fn read_field_end(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_i8(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    /// Read a length-prefixed string, which must be valid utf-8.
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Bytes>;

    fn read_list_begin(&mut self) -> Result<ListHeader>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<ListHeader>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<MapHeader>;
    fn read_map_end(&mut self) -> Result<()>;

    /// How deep [`TInputProtocol::skip`] may recurse into nested values.
    fn max_depth(&self) -> usize {
        DEFAULT_MAX_DEPTH
    }

    /// Consume one value of `ttype` without materializing it.
    fn skip(&mut self, ttype: TType) -> Result<()> {
        let depth = self.max_depth();
        self.skip_till_depth(ttype, depth)
    }

    /// Like [`TInputProtocol::skip`], with `depth` levels of struct and
    /// collection nesting left. Primitives need no depth.
    fn skip_till_depth(&mut self, ttype: TType, depth: usize) -> Result<()> {
        let nested = matches!(ttype, TType::Struct | TType::List | TType::Set | TType::Map);
        if nested && depth == 0 {
            return Err(CodecError::DepthLimit(self.max_depth()));
        }

        match ttype {
            | TType::Bool => self.read_bool().map(|_| ()),
            | TType::I8 => self.read_i8().map(|_| ()),
            | TType::I16 => self.read_i16().map(|_| ()),
            | TType::I32 => self.read_i32().map(|_| ()),
            | TType::I64 => self.read_i64().map(|_| ()),
            | TType::Double => self.read_double().map(|_| ()),
            | TType::String => self.read_binary().map(|_| ()),
            | TType::Struct => {
                self.read_struct_begin()?;
                loop {
                    let header = self.read_field_begin()?;
                    if header.is_stop() {
                        break;
                    }
                    trace!(field_id = header.id, ttype = ?header.ttype, "skipping nested field");
                    self.skip_till_depth(header.ttype, depth - 1)?;
                    self.read_field_end()?;
                }
                self.read_struct_end()
            },
            | TType::List => {
                let header = self.read_list_begin()?;
                for _ in 0..header.size {
                    self.skip_till_depth(header.elem, depth - 1)?;
                }
                self.read_list_end()
            },
            | TType::Set => {
                let header = self.read_set_begin()?;
                for _ in 0..header.size {
                    self.skip_till_depth(header.elem, depth - 1)?;
                }
                self.read_set_end()
            },
            | TType::Map => {
                let header = self.read_map_begin()?;
                for _ in 0..header.size {
                    self.skip_till_depth(header.key, depth - 1)?;
                    self.skip_till_depth(header.value, depth - 1)?;
                }
                self.read_map_end()
            },
            | TType::Stop | TType::Void => Err(StreamError::InvalidType(ttype.as_u8()).into()),
        }
    }
}

/// Every write returns the number of bytes it put on the wire.
pub trait TOutputProtocol {
    fn write_struct_begin(&mut self, name: &str) -> Result<usize>;
    fn write_struct_end(&mut self) -> Result<usize>;
    fn write_field_begin(&mut self, name: &str, ttype: TType, id: u16) -> Result<usize>;
    fn write_field_end(&mut self) -> Result<usize>;
    fn write_field_stop(&mut self) -> Result<usize>;

    fn write_bool(&mut self, v: bool) -> Result<usize>;
    fn write_i8(&mut self, v: i8) -> Result<usize>;
    fn write_i16(&mut self, v: i16) -> Result<usize>;
    fn write_i32(&mut self, v: i32) -> Result<usize>;
    fn write_i64(&mut self, v: i64) -> Result<usize>;
    fn write_double(&mut self, v: f64) -> Result<usize>;
    fn write_string(&mut self, v: &str) -> Result<usize>;
    fn write_binary(&mut self, v: &[u8]) -> Result<usize>;

    fn write_list_begin(&mut self, elem: TType, size: usize) -> Result<usize>;
    fn write_list_end(&mut self) -> Result<usize>;
    fn write_set_begin(&mut self, elem: TType, size: usize) -> Result<usize>;
    fn write_set_end(&mut self) -> Result<usize>;
    fn write_map_begin(&mut self, key: TType, value: TType, size: usize) -> Result<usize>;
    fn write_map_end(&mut self) -> Result<usize>;
}
