// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! The strict binary protocol. Every integer is fixed-width big-endian, and
//! struct, field and collection end markers occupy no bytes.
//!
//! ```text
//! field   := type:u8 id:i16 value
//! stop    := 0x00
//! string  := len:i32 bytes[len]
//! list    := elem:u8 count:i32 elem*
//! map     := key:u8 value:u8 count:i32 (key value)*
//! ```

use bytes::{
    Buf,
    BufMut,
    Bytes,
};

use crate::{
    config::CodecConfig,
    errs::{
        CodecError,
        Result,
        StreamError,
    },
    protocol::{
        FieldHeader,
        ListHeader,
        MapHeader,
        TInputProtocol,
        TOutputProtocol,
    },
    ttype::TType,
};

const FIELD_HEADER_SIZE: usize = size_of::<u8>() + size_of::<i16>();
const LIST_HEADER_SIZE: usize = size_of::<u8>() + size_of::<i32>();
const MAP_HEADER_SIZE: usize = 2 * size_of::<u8>() + size_of::<i32>();

/// Reads the binary protocol out of any [`Buf`]. Reading from a [`Bytes`]
/// hands out binary fields without copying.
pub struct TBinaryInputProtocol<B> {
    buf: B,
    max_depth: usize,
    max_string_len: Option<usize>,
    max_container_len: Option<usize>,
}

impl<B: Buf> TBinaryInputProtocol<B> {
    pub fn new(buf: B) -> Self {
        Self::with_config(buf, &CodecConfig::default())
    }

    pub fn with_config(buf: B, config: &CodecConfig) -> Self {
        TBinaryInputProtocol {
            buf,
            max_depth: config.max_depth,
            max_string_len: config.max_string_len,
            max_container_len: config.max_container_len,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(StreamError::UnexpectedEof { needed, remaining }.into());
        }
        Ok(())
    }

    fn read_type(&mut self) -> Result<TType> {
        self.ensure(1)?;
        Ok(TType::try_from(self.buf.get_u8())?)
    }

    fn read_size(&mut self, limit: Option<usize>) -> Result<usize> {
        self.ensure(size_of::<i32>())?;
        let size = self.buf.get_i32();
        if size < 0 {
            return Err(StreamError::NegativeSize(size).into());
        }
        let size = size as usize;
        if let Some(limit) = limit {
            if size > limit {
                return Err(StreamError::SizeLimit { size, limit }.into());
            }
        }
        Ok(size)
    }

    fn read_collection_header(&mut self) -> Result<ListHeader> {
        let elem = self.read_type()?;
        let size = self.read_size(self.max_container_len)?;
        Ok(ListHeader { elem, size })
    }
}

impl<B: Buf> TInputProtocol for TBinaryInputProtocol<B> {
    fn read_struct_begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader> {
        let ttype = self.read_type()?;
        if ttype == TType::Stop {
            return Ok(FieldHeader::STOP);
        }
        self.ensure(size_of::<i16>())?;
        let id = self.buf.get_u16();
        Ok(FieldHeader { ttype, id })
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.ensure(1)?;
        Ok(self.buf.get_u8() != 0)
    }

    fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.buf.get_i8())
    }

    fn read_i16(&mut self) -> Result<i16> {
        self.ensure(size_of::<i16>())?;
        Ok(self.buf.get_i16())
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.ensure(size_of::<i32>())?;
        Ok(self.buf.get_i32())
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.ensure(size_of::<i64>())?;
        Ok(self.buf.get_i64())
    }

    fn read_double(&mut self) -> Result<f64> {
        self.ensure(size_of::<f64>())?;
        Ok(self.buf.get_f64())
    }

    fn read_string(&mut self) -> Result<String> {
        let raw = self.read_binary()?;
        String::from_utf8(raw.to_vec()).map_err(|e| CodecError::Stream(e.into()))
    }

    fn read_binary(&mut self) -> Result<Bytes> {
        let len = self.read_size(self.max_string_len)?;
        self.ensure(len)?;
        Ok(self.buf.copy_to_bytes(len))
    }

    fn read_list_begin(&mut self) -> Result<ListHeader> {
        self.read_collection_header()
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<ListHeader> {
        self.read_collection_header()
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader> {
        let key = self.read_type()?;
        let value = self.read_type()?;
        let size = self.read_size(self.max_container_len)?;
        Ok(MapHeader { key, value, size })
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Writes the binary protocol into any [`BufMut`]. Growable buffers such as
/// [`bytes::BytesMut`] never fill up; a fixed `&mut [u8]` reports
/// [`StreamError::BufferFull`] instead of panicking.
pub struct TBinaryOutputProtocol<B> {
    buf: B,
}

impl<B: BufMut> TBinaryOutputProtocol<B> {
    pub fn new(buf: B) -> Self {
        TBinaryOutputProtocol { buf }
    }

    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.buf.remaining_mut();
        if remaining < needed {
            return Err(StreamError::BufferFull { needed, remaining }.into());
        }
        Ok(())
    }

    fn size_to_i32(size: usize) -> Result<i32> {
        i32::try_from(size).map_err(|_| {
            StreamError::SizeLimit {
                size,
                limit: i32::MAX as usize,
            }
            .into()
        })
    }

    fn write_collection_header(&mut self, elem: TType, size: usize) -> Result<usize> {
        let size = Self::size_to_i32(size)?;
        self.ensure(LIST_HEADER_SIZE)?;
        self.buf.put_u8(elem.as_u8());
        self.buf.put_i32(size);
        Ok(LIST_HEADER_SIZE)
    }
}

impl<B: BufMut> TOutputProtocol for TBinaryOutputProtocol<B> {
    fn write_struct_begin(&mut self, _name: &str) -> Result<usize> {
        Ok(0)
    }

    fn write_struct_end(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn write_field_begin(&mut self, _name: &str, ttype: TType, id: u16) -> Result<usize> {
        self.ensure(FIELD_HEADER_SIZE)?;
        self.buf.put_u8(ttype.as_u8());
        self.buf.put_u16(id);
        Ok(FIELD_HEADER_SIZE)
    }

    fn write_field_end(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn write_field_stop(&mut self) -> Result<usize> {
        self.ensure(1)?;
        self.buf.put_u8(TType::Stop.as_u8());
        Ok(1)
    }

    fn write_bool(&mut self, v: bool) -> Result<usize> {
        self.ensure(1)?;
        self.buf.put_u8(v as u8);
        Ok(1)
    }

    fn write_i8(&mut self, v: i8) -> Result<usize> {
        self.ensure(1)?;
        self.buf.put_i8(v);
        Ok(1)
    }

    fn write_i16(&mut self, v: i16) -> Result<usize> {
        self.ensure(size_of::<i16>())?;
        self.buf.put_i16(v);
        Ok(size_of::<i16>())
    }

    fn write_i32(&mut self, v: i32) -> Result<usize> {
        self.ensure(size_of::<i32>())?;
        self.buf.put_i32(v);
        Ok(size_of::<i32>())
    }

    fn write_i64(&mut self, v: i64) -> Result<usize> {
        self.ensure(size_of::<i64>())?;
        self.buf.put_i64(v);
        Ok(size_of::<i64>())
    }

    fn write_double(&mut self, v: f64) -> Result<usize> {
        self.ensure(size_of::<f64>())?;
        self.buf.put_f64(v);
        Ok(size_of::<f64>())
    }

    fn write_string(&mut self, v: &str) -> Result<usize> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<usize> {
        let len = Self::size_to_i32(v.len())?;
        self.ensure(size_of::<i32>() + v.len())?;
        self.buf.put_i32(len);
        self.buf.put_slice(v);
        Ok(size_of::<i32>() + v.len())
    }

    fn write_list_begin(&mut self, elem: TType, size: usize) -> Result<usize> {
        self.write_collection_header(elem, size)
    }

    fn write_list_end(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn write_set_begin(&mut self, elem: TType, size: usize) -> Result<usize> {
        self.write_collection_header(elem, size)
    }

    fn write_set_end(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn write_map_begin(&mut self, key: TType, value: TType, size: usize) -> Result<usize> {
        let size = Self::size_to_i32(size)?;
        self.ensure(MAP_HEADER_SIZE)?;
        self.buf.put_u8(key.as_u8());
        self.buf.put_u8(value.as_u8());
        self.buf.put_i32(size);
        Ok(MAP_HEADER_SIZE)
    }

    fn write_map_end(&mut self) -> Result<usize> {
        Ok(0)
    }
}
