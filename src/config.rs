// Copyright (c) Metawire Authors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

/// The default nesting depth for structs and collections. Matches what the
/// reference thrift libraries allow before refusing to recurse further.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// [`Validation`] tells the codec whether to enforce `required` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Missing required fields are written and read without complaint.
    /// Callers check presence themselves.
    #[default]
    Off,
    /// Encoding fails before writing anything if a required field is unset,
    /// and decoding fails once the struct is read if one never arrived.
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub validation: Validation,
    /// Maximum nesting of structs and collections, for both decoding and
    /// skipping.
    pub max_depth: usize,
    /// Upper bound on string and binary lengths read off the wire.
    pub max_string_len: Option<usize>,
    /// Upper bound on list, set and map element counts read off the wire.
    pub max_container_len: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            validation: Validation::Off,
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_len: None,
            max_container_len: None,
        }
    }
}

impl CodecConfig {
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_string_len(mut self, limit: usize) -> Self {
        self.max_string_len = Some(limit);
        self
    }

    pub fn with_max_container_len(mut self, limit: usize) -> Self {
        self.max_container_len = Some(limit);
        self
    }
}
