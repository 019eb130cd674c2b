// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! [`DataAccessError`] and [`DomainError`] are per-entity and non-fatal: the
//! render loop hides the affected entity and reports an
//! [`EntityDegradedEvent`](crate::trace::EntityDegradedEvent) to the trace
//! sink. [`LayoutProfileError`] is a configuration error returned to the
//! caller of the resize handler.

use alloc::string::String;
use core::fmt;

use crate::model::{EntityKey, ParamField};

/// A required per-entity field is missing or unusable at the current time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataAccessError {
    /// The entity whose field could not be read.
    pub key: EntityKey,
    /// The offending field.
    pub field: ParamField,
}

impl fmt::Display for DataAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entity {}: {} is missing or invalid",
            self.key,
            self.field.as_str()
        )
    }
}

impl core::error::Error for DataAccessError {}

/// The sampling domain cannot be evaluated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DomainError {
    /// A log-scale domain bound is zero or negative.
    NonPositiveLogBound {
        /// The offending bound.
        bound: f64,
    },
    /// The domain bounds are non-finite or not increasing.
    EmptyDomain {
        /// Lower bound.
        from: f64,
        /// Upper bound.
        to: f64,
    },
    /// Fewer than two samples were requested.
    ZeroResolution,
    /// A sampled density or the curve's total mass is not finite.
    NonFiniteDensity,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveLogBound { bound } => {
                write!(f, "log-scale domain bound {bound} is not positive")
            }
            Self::EmptyDomain { from, to } => {
                write!(f, "domain [{from}, {to}] is empty or non-finite")
            }
            Self::ZeroResolution => f.write_str("sampling resolution must be at least 2"),
            Self::NonFiniteDensity => f.write_str("sampled density is not finite"),
        }
    }
}

impl core::error::Error for DomainError {}

/// A per-entity failure that hides the entity for one redraw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityError {
    /// Parameters could not be read.
    Data(DataAccessError),
    /// The sampling domain is invalid.
    Domain(DomainError),
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(e) => e.fmt(f),
            Self::Domain(e) => e.fmt(f),
        }
    }
}

impl core::error::Error for EntityError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            Self::Domain(e) => Some(e),
        }
    }
}

impl From<DataAccessError> for EntityError {
    fn from(e: DataAccessError) -> Self {
        Self::Data(e)
    }
}

impl From<DomainError> for EntityError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

/// An unrecognized layout-profile name was supplied to the resize handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutProfileError {
    /// The rejected name.
    pub name: String,
}

impl fmt::Display for LayoutProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown layout profile {:?} (expected small, medium, or large)",
            self.name
        )
    }
}

impl core::error::Error for LayoutProfileError {}
