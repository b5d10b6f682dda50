// Copyright 2016 Hroi Sigurdsson
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except according to those terms.

use crate::AddressFamily;

/// Errors reported by table and parser operations.
///
/// A missing entry is not an error: lookups and removals return `Ok(None)`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("address family mismatch: table is {expected}, address is {found}")]
    FamilyMismatch {
        expected: AddressFamily,
        found: AddressFamily,
    },

    #[error("cannot parse {0:?} as an address or CIDR prefix")]
    Parse(String),

    #[error("out of memory")]
    OutOfMemory,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
