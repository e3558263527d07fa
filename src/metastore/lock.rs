// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::sync::LazyLock;

use getset::{
    CopyGetters,
    Getters,
};

use crate::{
    encoding::ThriftStruct,
    errs::Result,
    schema::{
        StructSchema,
        TypeDescriptor,
    },
    value::StructInstance,
};

thrift_enum! {
    /// Where a lock request stands.
    LockState {
        Acquired = 1 => "ACQUIRED",
        Waiting = 2 => "WAITING",
        Abort = 3 => "ABORT",
        NotAcquired = 4 => "NOT_ACQUIRED",
    }
}

pub static LOCK_RESPONSE: LazyLock<StructSchema> = LazyLock::new(|| {
    StructSchema::builder("LockResponse")
        .required(1, "lockid", TypeDescriptor::I64)
        .required(2, "state", TypeDescriptor::I32)
        .optional(3, "errorMessage", TypeDescriptor::String)
        .build()
});

/// The metastore's answer to a lock request.
#[derive(Debug, Clone, Default, PartialEq, Eq, CopyGetters, Getters)]
pub struct LockResponse {
    #[getset(get_copy = "pub")]
    lockid: Option<i64>,
    #[getset(get_copy = "pub")]
    state: Option<LockState>,
    #[getset(get = "pub")]
    error_message: Option<String>,
}

impl LockResponse {
    pub fn new(lockid: i64, state: LockState) -> Self {
        LockResponse {
            lockid: Some(lockid),
            state: Some(state),
            error_message: None,
        }
    }

    pub fn with_error_message(mut self, msg: impl Into<String>) -> Self {
        self.error_message = Some(msg.into());
        self
    }
}

impl ThriftStruct for LockResponse {
    fn struct_schema() -> &'static StructSchema {
        &LOCK_RESPONSE
    }

    fn to_instance(&self) -> StructInstance {
        StructInstance::new()
            .with_opt("lockid", self.lockid)
            .with_opt("state", self.state)
            .with_opt("errorMessage", self.error_message.clone())
    }

    fn from_instance(mut instance: StructInstance) -> Result<Self> {
        Ok(LockResponse {
            lockid: instance.take("lockid")?,
            state: instance.take("state")?,
            error_message: instance.take("errorMessage")?,
        })
    }
}
