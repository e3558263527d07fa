// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::sync::LazyLock;

use getset::{
    CopyGetters,
    Getters,
};

use crate::{
    encoding::{
        struct_value,
        ThriftStruct,
    },
    errs::Result,
    schema::{
        StructSchema,
        TypeDescriptor,
    },
    value::StructInstance,
};

thrift_enum! {
    /// Lifecycle of one version of a registered schema.
    SchemaVersionState {
        Initiated = 1 => "INITIATED",
        StartReview = 2 => "START_REVIEW",
        ChangesRequired = 3 => "CHANGES_REQUIRED",
        Reviewed = 4 => "REVIEWED",
        Enabled = 5 => "ENABLED",
        Disabled = 6 => "DISABLED",
        Archived = 7 => "ARCHIVED",
        Deleted = 8 => "DELETED",
    }
}

pub static ISCHEMA_NAME: LazyLock<StructSchema> = LazyLock::new(|| {
    StructSchema::builder("ISchemaName")
        .optional(1, "catName", TypeDescriptor::String)
        .optional(2, "dbName", TypeDescriptor::String)
        .optional(3, "schemaName", TypeDescriptor::String)
        .build()
});

pub static SCHEMA_VERSION_DESCRIPTOR: LazyLock<StructSchema> = LazyLock::new(|| {
    StructSchema::builder("SchemaVersionDescriptor")
        .optional(1, "schema", TypeDescriptor::Struct(&ISCHEMA_NAME))
        .optional(2, "version", TypeDescriptor::I32)
        .build()
});

pub static SET_SCHEMA_VERSION_STATE_REQUEST: LazyLock<StructSchema> = LazyLock::new(|| {
    StructSchema::builder("SetSchemaVersionStateRequest")
        .optional(
            1,
            "schemaVersion",
            TypeDescriptor::Struct(&SCHEMA_VERSION_DESCRIPTOR),
        )
        .optional(2, "state", TypeDescriptor::I32)
        .build()
});

/// Identifies a schema by catalog, database and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct ISchemaName {
    cat_name: Option<String>,
    db_name: Option<String>,
    schema_name: Option<String>,
}

impl ISchemaName {
    pub fn new(
        cat_name: impl Into<String>,
        db_name: impl Into<String>,
        schema_name: impl Into<String>,
    ) -> Self {
        ISchemaName {
            cat_name: Some(cat_name.into()),
            db_name: Some(db_name.into()),
            schema_name: Some(schema_name.into()),
        }
    }
}

impl ThriftStruct for ISchemaName {
    fn struct_schema() -> &'static StructSchema {
        &ISCHEMA_NAME
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new()
            .with_opt("catName", self.cat_name.clone())
            .with_opt("dbName", self.db_name.clone())
            .with_opt("schemaName", self.schema_name.clone())
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(ISchemaName {
            cat_name: instance.take("catName")?,
            db_name: instance.take("dbName")?,
            schema_name: instance.take("schemaName")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, CopyGetters, Getters)]
pub struct SchemaVersionDescriptor {
    #[getset(get = "pub")]
    schema: Option<ISchemaName>,
    #[getset(get_copy = "pub")]
    version: Option<i32>,
}

impl SchemaVersionDescriptor {
    pub fn new(schema: ISchemaName, version: i32) -> Self {
        SchemaVersionDescriptor {
            schema: Some(schema),
            version: Some(version),
        }
    }
}

impl ThriftStruct for SchemaVersionDescriptor {
    fn struct_schema() -> &'static StructSchema {
        &SCHEMA_VERSION_DESCRIPTOR
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new()
            .with_opt("schema", self.schema.clone())
            .with_opt("version", self.version)
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(SchemaVersionDescriptor {
            schema: instance.take("schema")?,
            version: instance.take("version")?,
        })
    }
}

/// Moves a schema version to a new [`SchemaVersionState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, CopyGetters, Getters)]
pub struct SetSchemaVersionStateRequest {
    #[getset(get = "pub")]
    schema_version: Option<SchemaVersionDescriptor>,
    #[getset(get_copy = "pub")]
    state: Option<SchemaVersionState>,
}

impl SetSchemaVersionStateRequest {
    pub fn new(schema_version: SchemaVersionDescriptor, state: SchemaVersionState) -> Self {
        SetSchemaVersionStateRequest {
            schema_version: Some(schema_version),
            state: Some(state),
        }
    }
}

impl ThriftStruct for SetSchemaVersionStateRequest {
    fn struct_schema() -> &'static StructSchema {
        &SET_SCHEMA_VERSION_STATE_REQUEST
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new()
            .with_opt("schemaVersion", self.schema_version.clone())
            .with_opt("state", self.state)
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(SetSchemaVersionStateRequest {
            schema_version: instance.take("schemaVersion")?,
            state: instance.take("state")?,
        })
    }
}

struct_value!(ISchemaName, SchemaVersionDescriptor);
