// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    collections::BTreeMap,
    sync::LazyLock,
};

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

pub static ENVIRONMENT_CONTEXT: LazyLock<StructSchema> = LazyLock::new(|| {
    StructSchema::builder("EnvironmentContext")
        .optional(
            1,
            "properties",
            TypeDescriptor::map(TypeDescriptor::String, TypeDescriptor::String),
        )
        .build()
});

// ids 6 (sd), 8 (privileges), 12 (colStats) and 13 (fileMetadata) aren't
// modelled and get skipped like any other unknown field
pub static PARTITION: LazyLock<StructSchema> = LazyLock::new(|| {
    StructSchema::builder("Partition")
        .optional(1, "values", TypeDescriptor::list(TypeDescriptor::String))
        .optional(2, "dbName", TypeDescriptor::String)
        .optional(3, "tableName", TypeDescriptor::String)
        .optional(4, "createTime", TypeDescriptor::I32)
        .optional(5, "lastAccessTime", TypeDescriptor::I32)
        .optional(
            7,
            "parameters",
            TypeDescriptor::map(TypeDescriptor::String, TypeDescriptor::String),
        )
        .optional(9, "catName", TypeDescriptor::String)
        .optional(10, "writeId", TypeDescriptor::I64)
        .optional(11, "isStatsCompliant", TypeDescriptor::Bool)
        .build()
});

pub static ALTER_PARTITIONS_WITH_ENVIRONMENT_CONTEXT_ARGS: LazyLock<StructSchema> =
    LazyLock::new(|| {
        StructSchema::builder("ThriftHiveMetastore_alter_partitions_with_environment_context_args")
            .optional(1, "db_name", TypeDescriptor::String)
            .optional(2, "tbl_name", TypeDescriptor::String)
            .optional(
                3,
                "new_parts",
                TypeDescriptor::list(TypeDescriptor::Struct(&PARTITION)),
            )
            .optional(
                4,
                "environment_context",
                TypeDescriptor::Struct(&ENVIRONMENT_CONTEXT),
            )
            .build()
    });

/// Free-form key/value properties passed along with a metastore call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct EnvironmentContext {
    #[getset(get = "pub")]
    properties: Option<BTreeMap<String, String>>,
}

impl EnvironmentContext {
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        EnvironmentContext {
            properties: Some(properties),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

impl ThriftStruct for EnvironmentContext {
    fn struct_schema() -> &'static StructSchema {
        &ENVIRONMENT_CONTEXT
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new().with_opt("properties", self.properties.clone())
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(EnvironmentContext {
            properties: instance.take("properties")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, CopyGetters, Getters)]
pub struct Partition {
    #[getset(get = "pub")]
    values: Option<Vec<String>>,
    #[getset(get = "pub")]
    db_name: Option<String>,
    #[getset(get = "pub")]
    table_name: Option<String>,
    #[getset(get_copy = "pub")]
    create_time: Option<i32>,
    #[getset(get_copy = "pub")]
    last_access_time: Option<i32>,
    #[getset(get = "pub")]
    parameters: Option<BTreeMap<String, String>>,
    #[getset(get = "pub")]
    cat_name: Option<String>,
    #[getset(get_copy = "pub")]
    write_id: Option<i64>,
    #[getset(get_copy = "pub")]
    is_stats_compliant: Option<bool>,
}

impl Partition {
    pub fn new(
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Partition {
            values: Some(values),
            db_name: Some(db_name.into()),
            table_name: Some(table_name.into()),
            ..Default::default()
        }
    }

    pub fn with_times(mut self, create_time: i32, last_access_time: i32) -> Self {
        self.create_time = Some(create_time);
        self.last_access_time = Some(last_access_time);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_cat_name(mut self, cat_name: impl Into<String>) -> Self {
        self.cat_name = Some(cat_name.into());
        self
    }

    pub fn with_write_id(mut self, write_id: i64) -> Self {
        self.write_id = Some(write_id);
        self
    }

    pub fn with_stats_compliant(mut self, compliant: bool) -> Self {
        self.is_stats_compliant = Some(compliant);
        self
    }
}

impl ThriftStruct for Partition {
    fn struct_schema() -> &'static StructSchema {
        &PARTITION
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new()
            .with_opt("values", self.values.clone())
            .with_opt("dbName", self.db_name.clone())
            .with_opt("tableName", self.table_name.clone())
            .with_opt("createTime", self.create_time)
            .with_opt("lastAccessTime", self.last_access_time)
            .with_opt("parameters", self.parameters.clone())
            .with_opt("catName", self.cat_name.clone())
            .with_opt("writeId", self.write_id)
            .with_opt("isStatsCompliant", self.is_stats_compliant)
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(Partition {
            values: instance.take("values")?,
            db_name: instance.take("dbName")?,
            table_name: instance.take("tableName")?,
            create_time: instance.take("createTime")?,
            last_access_time: instance.take("lastAccessTime")?,
            parameters: instance.take("parameters")?,
            cat_name: instance.take("catName")?,
            write_id: instance.take("writeId")?,
            is_stats_compliant: instance.take("isStatsCompliant")?,
        })
    }
}

/// Arguments of the `alter_partitions_with_environment_context` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct AlterPartitionsWithEnvironmentContextArgs {
    db_name: Option<String>,
    tbl_name: Option<String>,
    new_parts: Option<Vec<Partition>>,
    environment_context: Option<EnvironmentContext>,
}

impl AlterPartitionsWithEnvironmentContextArgs {
    pub fn new(
        db_name: impl Into<String>,
        tbl_name: impl Into<String>,
        new_parts: Vec<Partition>,
    ) -> Self {
        AlterPartitionsWithEnvironmentContextArgs {
            db_name: Some(db_name.into()),
            tbl_name: Some(tbl_name.into()),
            new_parts: Some(new_parts),
            environment_context: None,
        }
    }

    pub fn with_environment_context(mut self, context: EnvironmentContext) -> Self {
        self.environment_context = Some(context);
        self
    }
}

impl ThriftStruct for AlterPartitionsWithEnvironmentContextArgs {
    fn struct_schema() -> &'static StructSchema {
        &ALTER_PARTITIONS_WITH_ENVIRONMENT_CONTEXT_ARGS
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new()
            .with_opt("db_name", self.db_name.clone())
            .with_opt("tbl_name", self.tbl_name.clone())
            .with_opt("new_parts", self.new_parts.clone())
            .with_opt("environment_context", self.environment_context.clone())
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(AlterPartitionsWithEnvironmentContextArgs {
            db_name: instance.take("db_name")?,
            tbl_name: instance.take("tbl_name")?,
            new_parts: instance.take("new_parts")?,
            environment_context: instance.take("environment_context")?,
        })
    }
}

struct_value!(Partition, EnvironmentContext);
