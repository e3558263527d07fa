// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    collections::HashMap,
    sync::LazyLock,
};

use parking_lot::RwLock;
use tracing::warn;

use crate::{
    errs::{
        Result,
        SchemaError,
    },
    metastore,
    schema::StructSchema,
};

static GLOBAL: LazyLock<SchemaRegistry> = LazyLock::new(|| {
    let registry = SchemaRegistry::new();
    for schema in metastore::schemas() {
        if let Err(e) = registry.register(schema) {
            warn!(schema = schema.name(), error = %e, "metastore schema not registered");
        }
    }
    registry
});

/// The process-wide registry, preloaded with every metastore schema.
pub fn global() -> &'static SchemaRegistry {
    &GLOBAL
}

/// Maps struct names to their schemas, for callers that only learn which
/// struct to expect at runtime.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<&'static str, &'static StructSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under its name. Registering the same schema twice is
    /// fine; a different schema under a taken name is not.
    pub fn register(&self, schema: &'static StructSchema) -> Result<()> {
        let mut schemas = self.schemas.write();
        match schemas.get(schema.name()) {
            | Some(existing) if *existing != schema => {
                Err(SchemaError::Conflict(schema.name()).into())
            },
            | Some(_) => Ok(()),
            | None => {
                schemas.insert(schema.name(), schema);
                Ok(())
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static StructSchema> {
        self.schemas.read().get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.schemas.read().keys().copied().collect();
        names.sort_unstable();
        names
    }
}
