// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! The render loop is not clocked, so recordings carry no wall time. Each
//! event is placed one microsecond after the previous one, which keeps phase
//! spans nested and ordered in the viewer. Redraw cycles map to threads so
//! that each cycle reads as its own row.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        let tid = recorded.cycle();
        match recorded {
            RecordedEvent::EntitiesRebuilt(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "EntitiesRebuilt",
                    "cat": "Model",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "s": "t",
                    "args": {
                        "version": e.version,
                        "total": e.total,
                        "added": e.added,
                        "removed": e.removed,
                        "y_max": e.y_max,
                    }
                }));
            }
            RecordedEvent::TimeChanged(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TimeChanged",
                    "cat": "Model",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "s": "t",
                    "args": {
                        "time": e.time,
                    }
                }));
            }
            RecordedEvent::Resized(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Resized",
                    "cat": "Layout",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "s": "t",
                    "args": {
                        "profile": e.profile.as_str(),
                        "width": e.width,
                        "height": e.height,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.as_str(),
                    "cat": "Redraw",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.as_str(),
                    "cat": "Redraw",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "args": {
                        "entities": e.entities,
                    }
                }));
            }
            RecordedEvent::EntityDegraded(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "EntityDegraded",
                    "cat": "Redraw",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "s": "t",
                    "args": {
                        "key": e.key.0,
                        "error": e.error.to_string(),
                    }
                }));
            }
            RecordedEvent::EntitySampled(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "EntitySampled",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "s": "t",
                    "args": {
                        "key": e.key.0,
                        "samples": e.samples,
                        "mass": e.mass,
                    }
                }));
            }
            RecordedEvent::RedrawSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RedrawSummary",
                    "cat": "Summary",
                    "ts": ts,
                    "pid": 0,
                    "tid": tid,
                    "s": "g",
                    "args": {
                        "version": s.version,
                        "entities": s.entities,
                        "visible": s.visible,
                        "degraded": s.degraded,
                        "resampled": s.resampled,
                        "samples_per_curve": s.samples_per_curve,
                        "stacking": format!("{:?}", s.stacking),
                        "restacked": s.restacked,
                        "y_max": s.y_max,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use mountain_core::error::{DomainError, EntityError};
    use mountain_core::model::EntityKey;
    use mountain_core::stack::StackUse;
    use mountain_core::trace::{
        EntityDegradedEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, RedrawSummaryBuilder,
        TimeChangedEvent, TraceSink,
    };

    fn parse(bytes: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        export(bytes, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_time_changed(&TimeChangedEvent {
            cycle: 0,
            time: 2000.0,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            cycle: 0,
            phase: PhaseKind::Sample,
        });
        rec.on_phase_end(&PhaseEndEvent {
            cycle: 0,
            phase: PhaseKind::Sample,
            entities: 3,
        });

        let parsed = parse(rec.as_bytes());
        assert_eq!(parsed.len(), 3, "one object per event");
        assert_eq!(parsed[0]["name"], "TimeChanged", "instant event");
        assert_eq!(parsed[0]["args"]["time"], 2000.0, "time argument");
        assert_eq!(parsed[1]["ph"], "B", "phase begin");
        assert_eq!(parsed[1]["name"], "sample", "phase name");
        assert_eq!(parsed[2]["ph"], "E", "phase end");
        assert_eq!(parsed[2]["args"]["entities"], 3, "entity count");
    }

    #[test]
    fn timestamps_follow_recording_order() {
        let mut rec = RecorderSink::new();
        for cycle in 0..3 {
            rec.on_redraw_summary(&RedrawSummaryBuilder::new(cycle, 1, StackUse::Value).finish());
        }
        let parsed = parse(rec.as_bytes());
        let ts: Vec<u64> = parsed.iter().map(|e| e["ts"].as_u64().unwrap()).collect();
        let tids: Vec<u64> = parsed.iter().map(|e| e["tid"].as_u64().unwrap()).collect();
        assert_eq!(ts, [0, 1, 2], "sequential timestamps");
        assert_eq!(tids, [0, 1, 2], "one row per cycle");
    }

    #[test]
    fn degraded_error_is_described() {
        let mut rec = RecorderSink::new();
        rec.on_entity_degraded(&EntityDegradedEvent {
            cycle: 1,
            key: EntityKey(8),
            error: EntityError::Domain(DomainError::NonPositiveLogBound { bound: 0.0 }),
        });
        let parsed = parse(rec.as_bytes());
        assert_eq!(parsed[0]["args"]["key"], 8, "entity key");
        let error = parsed[0]["args"]["error"].as_str().unwrap();
        assert!(error.contains("not positive"), "got: {error}");
    }

    #[test]
    fn empty_recording_exports_empty_array() {
        assert!(parse(&[]).is_empty(), "no events");
    }
}
