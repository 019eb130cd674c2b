// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Floating-point fields are stored as their IEEE-754 bit patterns, so a
//! recording reproduces values exactly, including NaN payloads.

use mountain_core::error::{DataAccessError, DomainError, EntityError};
use mountain_core::layout::LayoutProfile;
use mountain_core::model::{EntityKey, ParamField};
use mountain_core::stack::StackUse;
use mountain_core::trace::{
    EntitiesRebuiltEvent, EntityDegradedEvent, EntitySampledEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, RedrawSummary, ResizedEvent, TimeChangedEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_ENTITIES_REBUILT: u8 = 1;
const TAG_TIME_CHANGED: u8 = 2;
const TAG_RESIZED: u8 = 3;
const TAG_PHASE_BEGIN: u8 = 4;
const TAG_PHASE_END: u8 = 5;
const TAG_ENTITY_DEGRADED: u8 = 6;
const TAG_REDRAW_SUMMARY: u8 = 7;
const TAG_ENTITY_SAMPLED: u8 = 8;

const ERROR_DATA: u8 = 0;
const ERROR_NON_POSITIVE_LOG_BOUND: u8 = 1;
const ERROR_EMPTY_DOMAIN: u8 = 2;
const ERROR_ZERO_RESOLUTION: u8 = 3;
const ERROR_NON_FINITE_DENSITY: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Rank => 0,
            PhaseKind::Sample => 1,
            PhaseKind::Stack => 2,
            PhaseKind::Paint => 3,
        });
    }

    fn write_profile(&mut self, p: LayoutProfile) {
        self.write_u8(match p {
            LayoutProfile::Small => 0,
            LayoutProfile::Medium => 1,
            LayoutProfile::Large => 2,
        });
    }

    fn write_stacking(&mut self, s: StackUse) {
        self.write_u8(match s {
            StackUse::Value => 0,
            StackUse::Property => 1,
            StackUse::None => 2,
        });
    }

    fn write_field(&mut self, f: ParamField) {
        self.write_u8(match f {
            ParamField::Weight => 0,
            ParamField::Center => 1,
            ParamField::Spread => 2,
        });
    }

    /// Errors are a kind byte followed by a fixed 17-byte payload.
    fn write_error(&mut self, error: &EntityError) {
        match *error {
            EntityError::Data(DataAccessError { key, field }) => {
                self.write_u8(ERROR_DATA);
                self.write_u64(key.0);
                self.write_field(field);
                self.write_u64(0);
            }
            EntityError::Domain(DomainError::NonPositiveLogBound { bound }) => {
                self.write_u8(ERROR_NON_POSITIVE_LOG_BOUND);
                self.write_f64(bound);
                self.write_u8(0);
                self.write_u64(0);
            }
            EntityError::Domain(DomainError::EmptyDomain { from, to }) => {
                self.write_u8(ERROR_EMPTY_DOMAIN);
                self.write_f64(from);
                self.write_u8(0);
                self.write_f64(to);
            }
            EntityError::Domain(DomainError::ZeroResolution) => {
                self.write_u8(ERROR_ZERO_RESOLUTION);
                self.write_u64(0);
                self.write_u8(0);
                self.write_u64(0);
            }
            EntityError::Domain(DomainError::NonFiniteDensity) => {
                self.write_u8(ERROR_NON_FINITE_DENSITY);
                self.write_u64(0);
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_entities_rebuilt(&mut self, e: &EntitiesRebuiltEvent) {
        self.write_u8(TAG_ENTITIES_REBUILT);
        self.write_u64(e.cycle);
        self.write_u64(e.version);
        self.write_u32(e.total);
        self.write_u32(e.added);
        self.write_u32(e.removed);
        self.write_f64(e.y_max);
    }

    fn on_time_changed(&mut self, e: &TimeChangedEvent) {
        self.write_u8(TAG_TIME_CHANGED);
        self.write_u64(e.cycle);
        self.write_f64(e.time);
    }

    fn on_resized(&mut self, e: &ResizedEvent) {
        self.write_u8(TAG_RESIZED);
        self.write_u64(e.cycle);
        self.write_profile(e.profile);
        self.write_f64(e.width);
        self.write_f64(e.height);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u32(e.entities);
    }

    fn on_entity_degraded(&mut self, e: &EntityDegradedEvent) {
        self.write_u8(TAG_ENTITY_DEGRADED);
        self.write_u64(e.cycle);
        self.write_u64(e.key.0);
        self.write_error(&e.error);
    }

    fn on_redraw_summary(&mut self, s: &RedrawSummary) {
        self.write_u8(TAG_REDRAW_SUMMARY);
        self.write_u64(s.cycle);
        self.write_u64(s.version);
        self.write_u32(s.entities);
        self.write_u32(s.visible);
        self.write_u32(s.degraded);
        self.write_u32(s.resampled);
        self.write_u32(s.samples_per_curve);
        self.write_stacking(s.stacking);
        self.write_u8(u8::from(s.restacked));
        self.write_f64(s.y_max);
    }

    fn on_entity_sampled(&mut self, e: &EntitySampledEvent) {
        self.write_u8(TAG_ENTITY_SAMPLED);
        self.write_u64(e.cycle);
        self.write_u64(e.key.0);
        self.write_u32(e.samples);
        self.write_f64(e.mass);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// An [`EntitiesRebuiltEvent`].
    EntitiesRebuilt(EntitiesRebuiltEvent),
    /// A [`TimeChangedEvent`].
    TimeChanged(TimeChangedEvent),
    /// A [`ResizedEvent`].
    Resized(ResizedEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// An [`EntityDegradedEvent`].
    EntityDegraded(EntityDegradedEvent),
    /// A [`RedrawSummary`].
    RedrawSummary(RedrawSummary),
    /// An [`EntitySampledEvent`].
    EntitySampled(EntitySampledEvent),
}

impl RecordedEvent {
    /// Returns the redraw cycle the event belongs to.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        match self {
            Self::EntitiesRebuilt(e) => e.cycle,
            Self::TimeChanged(e) => e.cycle,
            Self::Resized(e) => e.cycle,
            Self::PhaseBegin(e) => e.cycle,
            Self::PhaseEnd(e) => e.cycle,
            Self::EntityDegraded(e) => e.cycle,
            Self::RedrawSummary(s) => s.cycle,
            Self::EntitySampled(e) => e.cycle,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Rank,
            1 => PhaseKind::Sample,
            2 => PhaseKind::Stack,
            _ => PhaseKind::Paint,
        })
    }

    fn read_profile(&mut self) -> Option<LayoutProfile> {
        Some(match self.read_u8()? {
            0 => LayoutProfile::Small,
            1 => LayoutProfile::Medium,
            _ => LayoutProfile::Large,
        })
    }

    fn read_stacking(&mut self) -> Option<StackUse> {
        Some(match self.read_u8()? {
            0 => StackUse::Value,
            1 => StackUse::Property,
            _ => StackUse::None,
        })
    }

    fn read_field(&mut self) -> Option<ParamField> {
        Some(match self.read_u8()? {
            0 => ParamField::Weight,
            1 => ParamField::Center,
            _ => ParamField::Spread,
        })
    }

    fn read_error(&mut self) -> Option<EntityError> {
        let kind = self.read_u8()?;
        let a = self.read_u64()?;
        let field = self.read_field()?;
        let b = self.read_u64()?;
        Some(match kind {
            ERROR_DATA => EntityError::Data(DataAccessError {
                key: EntityKey(a),
                field,
            }),
            ERROR_NON_POSITIVE_LOG_BOUND => EntityError::Domain(DomainError::NonPositiveLogBound {
                bound: f64::from_bits(a),
            }),
            ERROR_EMPTY_DOMAIN => EntityError::Domain(DomainError::EmptyDomain {
                from: f64::from_bits(a),
                to: f64::from_bits(b),
            }),
            ERROR_ZERO_RESOLUTION => EntityError::Domain(DomainError::ZeroResolution),
            ERROR_NON_FINITE_DENSITY => EntityError::Domain(DomainError::NonFiniteDensity),
            _ => return None,
        })
    }

    fn decode_entities_rebuilt(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EntitiesRebuilt(EntitiesRebuiltEvent {
            cycle: self.read_u64()?,
            version: self.read_u64()?,
            total: self.read_u32()?,
            added: self.read_u32()?,
            removed: self.read_u32()?,
            y_max: self.read_f64()?,
        }))
    }

    fn decode_time_changed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TimeChanged(TimeChangedEvent {
            cycle: self.read_u64()?,
            time: self.read_f64()?,
        }))
    }

    fn decode_resized(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Resized(ResizedEvent {
            cycle: self.read_u64()?,
            profile: self.read_profile()?,
            width: self.read_f64()?,
            height: self.read_f64()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            entities: self.read_u32()?,
        }))
    }

    fn decode_entity_degraded(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EntityDegraded(EntityDegradedEvent {
            cycle: self.read_u64()?,
            key: EntityKey(self.read_u64()?),
            error: self.read_error()?,
        }))
    }

    fn decode_redraw_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RedrawSummary(RedrawSummary {
            cycle: self.read_u64()?,
            version: self.read_u64()?,
            entities: self.read_u32()?,
            visible: self.read_u32()?,
            degraded: self.read_u32()?,
            resampled: self.read_u32()?,
            samples_per_curve: self.read_u32()?,
            stacking: self.read_stacking()?,
            restacked: self.read_u8()? != 0,
            y_max: self.read_f64()?,
        }))
    }

    fn decode_entity_sampled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EntitySampled(EntitySampledEvent {
            cycle: self.read_u64()?,
            key: EntityKey(self.read_u64()?),
            samples: self.read_u32()?,
            mass: self.read_f64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_ENTITIES_REBUILT => self.decode_entities_rebuilt(),
            TAG_TIME_CHANGED => self.decode_time_changed(),
            TAG_RESIZED => self.decode_resized(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_ENTITY_DEGRADED => self.decode_entity_degraded(),
            TAG_REDRAW_SUMMARY => self.decode_redraw_summary(),
            TAG_ENTITY_SAMPLED => self.decode_entity_sampled(),
            _ => None, // unknown tag: stop
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
