// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::collections::HashSet;

use getset::{
    CopyGetters,
    Getters,
};

use crate::{
    errs::SchemaError,
    ttype::TType,
};

/// [`TypeDescriptor`] describes how a field's value is shaped, all the way
/// down. Nested structs link straight to their schema rather than being
/// looked up by name.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Double,
    /// utf-8 text.
    String,
    /// Arbitrary bytes. Same wire tag as [`TypeDescriptor::String`].
    Binary,
    Struct(&'static StructSchema),
    List(Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn list(elem: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(elem))
    }

    pub fn set(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Set(Box::new(elem))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(key), Box::new(value))
    }

    /// The tag this descriptor goes by on the wire.
    pub fn ttype(&self) -> TType {
        match self {
            | TypeDescriptor::Bool => TType::Bool,
            | TypeDescriptor::I8 => TType::I8,
            | TypeDescriptor::I16 => TType::I16,
            | TypeDescriptor::I32 => TType::I32,
            | TypeDescriptor::I64 => TType::I64,
            | TypeDescriptor::Double => TType::Double,
            | TypeDescriptor::String | TypeDescriptor::Binary => TType::String,
            | TypeDescriptor::Struct(_) => TType::Struct,
            | TypeDescriptor::List(_) => TType::List,
            | TypeDescriptor::Set(_) => TType::Set,
            | TypeDescriptor::Map(..) => TType::Map,
        }
    }
}

#[derive(Debug, Clone, PartialEq, CopyGetters, Getters)]
pub struct FieldSchema {
    #[getset(get_copy = "pub")]
    id: u16,
    #[getset(get_copy = "pub")]
    name: &'static str,
    #[getset(get = "pub")]
    ty: TypeDescriptor,
    #[getset(get_copy = "pub")]
    required: bool,
}

impl FieldSchema {
    pub fn new(id: u16, name: &'static str, ty: TypeDescriptor, required: bool) -> Self {
        FieldSchema {
            id,
            name,
            ty,
            required,
        }
    }

    #[inline]
    pub fn ttype(&self) -> TType {
        self.ty.ttype()
    }
}

/// The static description of one struct type. Fields are kept sorted by id,
/// which is the order the encoder writes them in regardless of how they were
/// declared.
#[derive(Debug, Clone, PartialEq, CopyGetters)]
pub struct StructSchema {
    #[getset(get_copy = "pub")]
    name: &'static str,
    fields: Vec<FieldSchema>,
}

impl StructSchema {
    pub fn builder(name: &'static str) -> StructSchemaBuilder {
        StructSchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }

    /// All fields, ascending by id.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, id: u16) -> Option<&FieldSchema> {
        self.fields
            .binary_search_by_key(&id, |f| f.id)
            .ok()
            .map(|idx| &self.fields[idx])
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.required)
    }
}

pub struct StructSchemaBuilder {
    name: &'static str,
    fields: Vec<FieldSchema>,
}

impl StructSchemaBuilder {
    pub fn required(self, id: u16, name: &'static str, ty: TypeDescriptor) -> Self {
        self.field(FieldSchema::new(id, name, ty, true))
    }

    pub fn optional(self, id: u16, name: &'static str, ty: TypeDescriptor) -> Self {
        self.field(FieldSchema::new(id, name, ty, false))
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn try_build(mut self) -> Result<StructSchema, SchemaError> {
        let mut names = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !names.insert(field.name) {
                return Err(SchemaError::DuplicateFieldName {
                    name: self.name,
                    field: field.name,
                });
            }
        }

        self.fields.sort_by_key(|f| f.id);
        if let Some(pair) = self.fields.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(SchemaError::DuplicateFieldId {
                name: self.name,
                id: pair[0].id,
            });
        }

        Ok(StructSchema {
            name: self.name,
            fields: self.fields,
        })
    }

    /// Build the schema.
    ///
    /// # Panics
    /// If two fields share an id or a name. Static schema tables are written
    /// by hand, so this is a programming error; use
    /// [`StructSchemaBuilder::try_build`] for schemas assembled at runtime.
    pub fn build(self) -> StructSchema {
        match self.try_build() {
            | Ok(schema) => schema,
            | Err(e) => panic!("invalid struct schema: {}", e),
        }
    }
}
