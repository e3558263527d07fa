// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! The struct codec walks a [`StructSchema`] and drives a protocol with it.
//!
//! Schema evolution rests on one rule: a reader never fails on a field it
//! doesn't understand. Ids the schema doesn't list, and fields whose wire type
//! disagrees with the schema, are skipped and decoding carries on. Old readers
//! accept messages from newer writers and the other way around.

use bytes::{
    Bytes,
    BytesMut,
};
use tracing::{
    debug,
    instrument,
    trace,
};

use crate::{
    binary::{
        TBinaryInputProtocol,
        TBinaryOutputProtocol,
    },
    config::{
        CodecConfig,
        Validation,
    },
    errs::{
        CodecError,
        Result,
    },
    protocol::{
        ListHeader,
        MapHeader,
        TInputProtocol,
        TOutputProtocol,
    },
    schema::{
        StructSchema,
        TypeDescriptor,
    },
    value::{
        type_error,
        StructInstance,
        Value,
    },
    ttype::TType,
};

#[cfg(test)]
mod test;

/// Sizes read off the wire aren't trusted for preallocation past this.
const MAX_PREALLOC: usize = 1024;

#[derive(Debug, Clone, Default)]
pub struct StructCodec {
    config: CodecConfig,
}

impl StructCodec {
    pub fn new(config: CodecConfig) -> Self {
        StructCodec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Write `instance` as a `schema` struct, returning the bytes written.
    ///
    /// Fields go out in ascending id order and absent fields are left out.
    /// Each present value is checked against its descriptor before any byte
    /// of that field is written, so a [`CodecError::Type`] never leaves half a
    /// field behind. Names the schema doesn't know are ignored.
    #[instrument(level = "trace", skip_all, fields(schema = schema.name()))]
    pub fn encode<P: TOutputProtocol + ?Sized>(
        &self,
        instance: &StructInstance,
        schema: &StructSchema,
        out: &mut P,
    ) -> Result<usize> {
        if self.config.validation == Validation::Required {
            validate_instance(instance, schema)?;
        }
        self.write_struct(instance, schema, out)
    }

    /// Read one `schema` struct off `input`.
    #[instrument(level = "trace", skip_all, fields(schema = schema.name()))]
    pub fn decode<P: TInputProtocol + ?Sized>(
        &self,
        schema: &StructSchema,
        input: &mut P,
    ) -> Result<StructInstance> {
        self.read_struct(schema, input, self.config.max_depth)
    }

    /// Encode with the binary protocol into a fresh buffer.
    pub fn encode_to_bytes(&self, instance: &StructInstance, schema: &StructSchema) -> Result<Bytes> {
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        self.encode(instance, schema, &mut out)?;
        Ok(out.into_inner().freeze())
    }

    /// Decode a binary protocol struct. Bytes past the struct's stop marker
    /// are left unread.
    pub fn decode_from_bytes(&self, schema: &StructSchema, src: Bytes) -> Result<StructInstance> {
        let mut input = TBinaryInputProtocol::with_config(src, &self.config);
        self.decode(schema, &mut input)
    }

    fn write_struct<P: TOutputProtocol + ?Sized>(
        &self,
        instance: &StructInstance,
        schema: &StructSchema,
        out: &mut P,
    ) -> Result<usize> {
        let mut xfer = out.write_struct_begin(schema.name())?;
        for field in schema.fields() {
            let Some(value) = instance.get(field.name()) else {
                continue;
            };
            if let Some(mismatch) = value.find_mismatch(field.ty()) {
                return Err(mismatch.into_error(field.name()));
            }
            xfer += out.write_field_begin(field.name(), field.ttype(), field.id())?;
            xfer += self.write_value(field.name(), value, field.ty(), out)?;
            xfer += out.write_field_end()?;
        }
        xfer += out.write_field_stop()?;
        xfer += out.write_struct_end()?;
        Ok(xfer)
    }

    fn write_value<P: TOutputProtocol + ?Sized>(
        &self,
        field: &str,
        value: &Value,
        ty: &TypeDescriptor,
        out: &mut P,
    ) -> Result<usize> {
        match (value, ty) {
            | (Value::Bool(v), TypeDescriptor::Bool) => out.write_bool(*v),
            | (Value::I8(v), TypeDescriptor::I8) => out.write_i8(*v),
            | (Value::I16(v), TypeDescriptor::I16) => out.write_i16(*v),
            | (Value::I32(v), TypeDescriptor::I32) => out.write_i32(*v),
            | (Value::I64(v), TypeDescriptor::I64) => out.write_i64(*v),
            | (Value::Double(v), TypeDescriptor::Double) => out.write_double(*v),
            | (Value::String(v), TypeDescriptor::String) => out.write_string(v),
            | (Value::Binary(v), TypeDescriptor::Binary) => out.write_binary(v),
            | (Value::Struct(nested), TypeDescriptor::Struct(schema)) => {
                self.write_struct(nested, schema, out)
            },
            | (Value::List(items), TypeDescriptor::List(elem)) => {
                let mut xfer = out.write_list_begin(elem.ttype(), items.len())?;
                for item in items {
                    xfer += self.write_value(field, item, elem, out)?;
                }
                xfer += out.write_list_end()?;
                Ok(xfer)
            },
            | (Value::Set(items), TypeDescriptor::Set(elem)) => {
                let mut xfer = out.write_set_begin(elem.ttype(), items.len())?;
                for item in items {
                    xfer += self.write_value(field, item, elem, out)?;
                }
                xfer += out.write_set_end()?;
                Ok(xfer)
            },
            | (Value::Map(pairs), TypeDescriptor::Map(key_ty, val_ty)) => {
                let mut xfer = out.write_map_begin(key_ty.ttype(), val_ty.ttype(), pairs.len())?;
                for (key, val) in pairs {
                    xfer += self.write_value(field, key, key_ty, out)?;
                    xfer += self.write_value(field, val, val_ty, out)?;
                }
                xfer += out.write_map_end()?;
                Ok(xfer)
            },
            | (other, _) => Err(type_error(field, ty.ttype(), other)),
        }
    }

    fn read_struct<P: TInputProtocol + ?Sized>(
        &self,
        schema: &StructSchema,
        input: &mut P,
        depth: usize,
    ) -> Result<StructInstance> {
        if depth == 0 {
            return Err(CodecError::DepthLimit(self.config.max_depth));
        }

        input.read_struct_begin()?;
        let mut instance = StructInstance::new();
        loop {
            let header = input.read_field_begin()?;
            if header.is_stop() {
                break;
            }

            match schema.field(header.id) {
                | Some(field) if field.ttype() == header.ttype => {
                    match self.read_value(field.ty(), input, depth - 1)? {
                        | Some(value) => {
                            instance.set(field.name(), value);
                        },
                        | None => debug!(
                            field = field.name(),
                            "collection element types disagree with schema, field skipped"
                        ),
                    }
                },
                | Some(field) => {
                    debug!(
                        field = field.name(),
                        expected = ?field.ttype(),
                        found = ?header.ttype,
                        "wire type mismatch, skipping field"
                    );
                    self.skip(input, header.ttype, depth - 1)?;
                },
                | None => {
                    trace!(field_id = header.id, ttype = ?header.ttype, "skipping unknown field");
                    self.skip(input, header.ttype, depth - 1)?;
                },
            }
            input.read_field_end()?;
        }
        input.read_struct_end()?;

        if self.config.validation == Validation::Required {
            if let Some(field) = schema.required_fields().find(|f| !instance.is_set(f.name())) {
                return Err(CodecError::MissingRequired {
                    name: schema.name(),
                    field: field.name(),
                });
            }
        }

        Ok(instance)
    }

    /// `None` means the value was consumed but had to be skipped, because a
    /// collection header named element types the schema doesn't expect.
    fn read_value<P: TInputProtocol + ?Sized>(
        &self,
        ty: &TypeDescriptor,
        input: &mut P,
        depth: usize,
    ) -> Result<Option<Value>> {
        let value = match ty {
            | TypeDescriptor::Bool => Value::Bool(input.read_bool()?),
            | TypeDescriptor::I8 => Value::I8(input.read_i8()?),
            | TypeDescriptor::I16 => Value::I16(input.read_i16()?),
            | TypeDescriptor::I32 => Value::I32(input.read_i32()?),
            | TypeDescriptor::I64 => Value::I64(input.read_i64()?),
            | TypeDescriptor::Double => Value::Double(input.read_double()?),
            | TypeDescriptor::String => Value::String(input.read_string()?),
            | TypeDescriptor::Binary => Value::Binary(input.read_binary()?),
            | TypeDescriptor::Struct(schema) => Value::Struct(self.read_struct(schema, input, depth)?),
            | TypeDescriptor::List(elem) => {
                let header = input.read_list_begin()?;
                let items = self.read_elements(elem, header, input, depth)?;
                input.read_list_end()?;
                match items {
                    | Some(items) => Value::List(items),
                    | None => return Ok(None),
                }
            },
            | TypeDescriptor::Set(elem) => {
                let header = input.read_set_begin()?;
                let items = self.read_elements(elem, header, input, depth)?;
                input.read_set_end()?;
                match items {
                    | Some(items) => Value::Set(items),
                    | None => return Ok(None),
                }
            },
            | TypeDescriptor::Map(key_ty, val_ty) => {
                let header = input.read_map_begin()?;
                let pairs = self.read_pairs(key_ty, val_ty, header, input, depth)?;
                input.read_map_end()?;
                match pairs {
                    | Some(pairs) => Value::Map(pairs),
                    | None => return Ok(None),
                }
            },
        };
        Ok(Some(value))
    }

    fn read_elements<P: TInputProtocol + ?Sized>(
        &self,
        elem: &TypeDescriptor,
        header: ListHeader,
        input: &mut P,
        depth: usize,
    ) -> Result<Option<Vec<Value>>> {
        if depth == 0 {
            return Err(CodecError::DepthLimit(self.config.max_depth));
        }

        // an empty collection carries no elements to disagree about
        if header.size > 0 && header.elem != elem.ttype() {
            debug!(expected = ?elem.ttype(), found = ?header.elem, "element type mismatch");
            for _ in 0..header.size {
                self.skip(input, header.elem, depth - 1)?;
            }
            return Ok(None);
        }

        let mut items = Vec::with_capacity(header.size.min(MAX_PREALLOC));
        let mut intact = true;
        for _ in 0..header.size {
            match self.read_value(elem, input, depth - 1)? {
                | Some(item) => items.push(item),
                | None => intact = false,
            }
        }
        Ok(intact.then_some(items))
    }

    fn read_pairs<P: TInputProtocol + ?Sized>(
        &self,
        key_ty: &TypeDescriptor,
        val_ty: &TypeDescriptor,
        header: MapHeader,
        input: &mut P,
        depth: usize,
    ) -> Result<Option<Vec<(Value, Value)>>> {
        if depth == 0 {
            return Err(CodecError::DepthLimit(self.config.max_depth));
        }

        if header.size > 0 && (header.key != key_ty.ttype() || header.value != val_ty.ttype()) {
            debug!(
                expected_key = ?key_ty.ttype(),
                expected_value = ?val_ty.ttype(),
                found_key = ?header.key,
                found_value = ?header.value,
                "map entry type mismatch"
            );
            for _ in 0..header.size {
                self.skip(input, header.key, depth - 1)?;
                self.skip(input, header.value, depth - 1)?;
            }
            return Ok(None);
        }

        let mut pairs = Vec::with_capacity(header.size.min(MAX_PREALLOC));
        let mut intact = true;
        for _ in 0..header.size {
            let key = self.read_value(key_ty, input, depth - 1)?;
            let val = self.read_value(val_ty, input, depth - 1)?;
            match (key, val) {
                | (Some(key), Some(val)) => pairs.push((key, val)),
                | _ => intact = false,
            }
        }
        Ok(intact.then_some(pairs))
    }

    /// Skipped values count against the same remaining depth as decoded ones.
    fn skip<P: TInputProtocol + ?Sized>(&self, input: &mut P, ttype: TType, depth: usize) -> Result<()> {
        input.skip_till_depth(ttype, depth).map_err(|e| match e {
            | CodecError::DepthLimit(_) => CodecError::DepthLimit(self.config.max_depth),
            | e => e,
        })
    }
}

fn validate_instance(instance: &StructInstance, schema: &StructSchema) -> Result<()> {
    for field in schema.fields() {
        match instance.get(field.name()) {
            | None if field.required() => {
                return Err(CodecError::MissingRequired {
                    name: schema.name(),
                    field: field.name(),
                });
            },
            | None => {},
            | Some(value) => validate_value(value, field.ty())?,
        }
    }
    Ok(())
}

fn validate_value(value: &Value, ty: &TypeDescriptor) -> Result<()> {
    match (value, ty) {
        | (Value::Struct(nested), TypeDescriptor::Struct(schema)) => validate_instance(nested, schema),
        | (Value::List(items), TypeDescriptor::List(elem))
        | (Value::Set(items), TypeDescriptor::Set(elem)) => {
            items.iter().try_for_each(|item| validate_value(item, elem))
        },
        | (Value::Map(pairs), TypeDescriptor::Map(key_ty, val_ty)) => {
            pairs.iter().try_for_each(|(key, val)| {
                validate_value(key, key_ty)?;
                validate_value(val, val_ty)
            })
        },
        | _ => Ok(()),
    }
}
