// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Generic, category-tagged ULID wrapper shared by every typed ID in this
//! crate (`RunId`, `StageExecutionId`, ...). A marker type implementing
//! [`IdCategory`] supplies the category name and any category-specific
//! validation; `GenericId<Marker>` supplies storage, ordering, and
//! (de)serialization once for all of them.

use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use ulid::Ulid;

/// Per-category validation and naming, implemented by a zero-sized marker
/// type (e.g. `RunMarker`).
pub trait IdCategory {
    fn category_name() -> &'static str;
    fn validate_id(ulid: &Ulid) -> Result<(), IngestError>;
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct GenericId<C: IdCategory> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<C>,
}

impl<C: IdCategory> GenericId<C> {
    pub fn new() -> Self {
        Self {
            ulid: Ulid::new(),
            _marker: PhantomData,
        }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, IngestError> {
        C::validate_id(&ulid)?;
        Ok(Self {
            ulid,
            _marker: PhantomData,
        })
    }

    pub fn from_string(s: &str) -> Result<Self, IngestError> {
        let ulid = Ulid::from_string(s).map_err(|e| {
            IngestError::validation(C::category_name(), format!("invalid ULID '{s}': {e}"))
        })?;
        Self::from_ulid(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.ulid.timestamp_ms()
    }
}

impl<C: IdCategory> Default for GenericId<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: IdCategory> Display for GenericId<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ulid)
    }
}

impl<C: IdCategory> Copy for GenericId<C> {}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestMarker;
    impl IdCategory for TestMarker {
        fn category_name() -> &'static str {
            "test"
        }
        fn validate_id(ulid: &Ulid) -> Result<(), IngestError> {
            if ulid.0 == 0 {
                return Err(IngestError::validation("test", "nil ULID"));
            }
            Ok(())
        }
    }

    #[test]
    fn roundtrips_through_string() {
        let id: GenericId<TestMarker> = GenericId::new();
        let s = id.to_string();
        let parsed: GenericId<TestMarker> = GenericId::from_string(&s).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_nil_ulid() {
        let err = GenericId::<TestMarker>::from_ulid(Ulid(0)).unwrap_err();
        assert!(matches!(err, IngestError::Validation { .. }));
    }
}
