// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use crate::errs::StreamError;

/// [`TType`] is the one-byte tag identifying how a value is laid out on the
/// wire.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TType {
    /// Terminates the field list of a struct.
    Stop = 0,
    Void = 1,
    Bool = 2,
    I8 = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// Shared by utf-8 strings and raw binary.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TType {
    #[inline]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            | 0 => Some(Self::Stop),
            | 1 => Some(Self::Void),
            | 2 => Some(Self::Bool),
            | 3 => Some(Self::I8),
            | 4 => Some(Self::Double),
            | 6 => Some(Self::I16),
            | 8 => Some(Self::I32),
            | 10 => Some(Self::I64),
            | 11 => Some(Self::String),
            | 12 => Some(Self::Struct),
            | 13 => Some(Self::Map),
            | 14 => Some(Self::Set),
            | 15 => Some(Self::List),
            | _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TType {
    type Error = StreamError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        TType::from_u8(v).ok_or(StreamError::InvalidType(v))
    }
}
