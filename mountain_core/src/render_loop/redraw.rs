// Copyright 2026 the Mountain Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw: resample dirty entities, restack, and paint.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{BezPath, Point, Shape};

use super::{RenderLoop, tracer};
use crate::accessor::MarkerSource;
use crate::density::{DistributionEngine, check_finite};
use crate::error::{DomainError, EntityError};
use crate::model::{EntityKey, Parameters, Sample};
use crate::paint::{PaintFrame, PaintItem, area_path};
use crate::scale::ScaleType;
use crate::stack;
use crate::trace::{
    EntityDegradedEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, RedrawSummaryBuilder,
    saturate,
};

impl RenderLoop {
    /// Resamples dirty entities, restacks if needed, and paints one frame.
    ///
    /// Entities whose parameters are missing or invalid, whose domain
    /// cannot be sampled, or whose curve is not finite are hidden and reported to the trace sink; the
    /// rest of the frame is unaffected.
    ///
    /// # Panics
    ///
    /// Panics if the render loop is not ready.
    pub fn redraw(&mut self) {
        self.assert_ready();
        let cycle = self.cycle;
        let time = self.time;
        let stacking = self.models.marker.stacking();

        if self.refresh_grid() {
            self.dirty.mark_all();
        }
        let dirty_slots = self.dirty.drain_samples();
        let restack_marked = self.dirty.drain_restack();

        let mut tracer = tracer(&mut self.sink);
        let mut summary = RedrawSummaryBuilder::new(cycle, self.buffer.version(), stacking.use_);
        let marker = &*self.models.marker;

        // Sample
        tracer.phase_begin(&PhaseBeginEvent {
            cycle,
            phase: PhaseKind::Sample,
        });
        let mut is_dirty = vec![false; self.buffer.len()];
        for slot in dirty_slots {
            if let Some(flag) = is_dirty.get_mut(slot as usize) {
                *flag = true;
            }
        }
        let grid = self.engine.as_ref().map_err(|e| *e);
        let mut resampled = 0_usize;
        for record in self.buffer.records_mut() {
            if !is_dirty[record.slot as usize] {
                continue;
            }
            resampled += 1;
            record.time = time;
            record.group = marker.group(record.key, time);
            match sample_into(grid, marker, record.key, time, &mut record.points) {
                Ok(()) => {
                    record.refresh_all_zeros();
                    summary.resampled(record.points.len());
                    #[cfg(feature = "trace-rich")]
                    tracer.entity_sampled(&crate::trace::EntitySampledEvent {
                        cycle,
                        key: record.key,
                        samples: saturate(record.points.len()),
                        mass: record.mass(),
                    });
                }
                Err(error) => {
                    record.degrade();
                    summary.degraded();
                    tracer.entity_degraded(&EntityDegradedEvent {
                        cycle,
                        key: record.key,
                        error,
                    });
                }
            }
        }
        tracer.phase_end(&PhaseEndEvent {
            cycle,
            phase: PhaseKind::Sample,
            entities: saturate(resampled),
        });

        // Stack
        let restack = resampled > 0 || restack_marked || stacking != self.stacking;
        if restack {
            tracer.phase_begin(&PhaseBeginEvent {
                cycle,
                phase: PhaseKind::Stack,
            });
            stack::apply(self.buffer.records_mut(), &stacking, &mut self.stack_scratch);
            tracer.phase_end(&PhaseEndEvent {
                cycle,
                phase: PhaseKind::Stack,
                entities: saturate(self.buffer.len()),
            });
        }
        self.stacking = stacking;
        summary.set_restacked(restack);

        // Paint
        tracer.phase_begin(&PhaseBeginEvent {
            cycle,
            phase: PhaseKind::Paint,
        });
        {
            let x = self.scales.x.borrow();
            let y = self.scales.y.borrow();
            self.items.clear();
            for record in self.buffer.records() {
                let visible = !record.all_zeros;
                summary.painted(visible);
                self.items.push(if visible {
                    let color = marker.color_value(record.key, time);
                    PaintItem {
                        key: record.key,
                        visible,
                        fill: Some(self.scales.color.color(color.as_deref())),
                        path: area_path(&record.points, &*x, &*y),
                    }
                } else {
                    PaintItem {
                        key: record.key,
                        visible,
                        fill: None,
                        path: BezPath::new(),
                    }
                });
            }
        }
        self.painter.apply(&PaintFrame {
            cycle,
            time_label: &self.time_label,
            x_title: &self.x_title,
            layout: &self.layout,
            items: &self.items,
            added: &self.pending_added,
            removed: &self.pending_removed,
        });
        self.pending_added.clear();
        self.pending_removed.clear();
        tracer.phase_end(&PhaseEndEvent {
            cycle,
            phase: PhaseKind::Paint,
            entities: saturate(self.items.len()),
        });

        summary.set_y_max(self.y_max);
        tracer.redraw_summary(&summary.finish());
        self.cycle += 1;
    }

    /// Recomputes baselines and repaints without resampling any curve.
    ///
    /// Use after the marker's stacking configuration changed.
    ///
    /// # Panics
    ///
    /// Panics if the render loop is not ready.
    pub fn restack(&mut self) {
        self.assert_ready();
        self.dirty.mark_restack();
        self.redraw();
    }

    /// Marks one entity for resampling on the next redraw.
    ///
    /// Returns `false` if `key` is not in the buffer.
    pub fn invalidate_entity(&mut self, key: EntityKey) -> bool {
        let Some(slot) = self.buffer.get(key).map(|r| r.slot) else {
            return false;
        };
        self.dirty.mark_slot(slot);
        true
    }

    /// Samples one entity at `time` over the current horizontal domain.
    ///
    /// This does not touch the entity buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::Data`] if the entity's parameters are missing
    /// or invalid at `time`, and [`EntityError::Domain`] if the horizontal
    /// domain cannot be sampled or the curve is not finite.
    pub fn generate_distribution(
        &self,
        key: EntityKey,
        time: f64,
    ) -> Result<Vec<Sample>, EntityError> {
        let params = Parameters::read(&*self.models.marker, key, time)?;
        let (kind, domain, resolution) = self.grid_spec();
        let points = match &self.engine {
            Ok(engine) if grid_matches(engine, kind, domain, resolution) => {
                engine.generate(&params)
            }
            _ => DistributionEngine::new(kind, domain, resolution)?.generate(&params),
        };
        check_finite(&points)?;
        Ok(points)
    }

    /// Returns the top-most visible entity whose area contains `point`.
    ///
    /// `point` is in plot coordinates. Tests the last painted frame.
    #[must_use]
    pub fn pick(&self, point: Point) -> Option<EntityKey> {
        self.items
            .iter()
            .rev()
            .find(|item| item.visible && item.path.contains(point))
            .map(|item| item.key)
    }

    /// Forwards a pointer selection to the entity-set model.
    pub fn select(&self, key: EntityKey) {
        self.models.entities.select_entity(key);
    }

    /// Returns the tooltip text for `key`.
    #[must_use]
    pub fn tooltip(&self, key: EntityKey) -> String {
        self.models.marker.label(key)
    }

    /// Formats a horizontal axis tick.
    #[must_use]
    pub fn tick_label(&self, value: f64) -> String {
        self.models.marker.tick(value)
    }

    /// Scale type, domain, and resolution the next redraw samples with.
    fn grid_spec(&self) -> (ScaleType, [f64; 2], usize) {
        let kind = self.models.marker.scale_type();
        let domain = self.scales.x.borrow().domain();
        let width = (self.layout.width > 0.0).then_some(self.layout.width);
        (kind, domain, self.config.sampling.resolution(width))
    }

    /// Brings the sampling grid in line with [`grid_spec`](Self::grid_spec).
    ///
    /// Returns `true` if the grid changed (or failed to build).
    fn refresh_grid(&mut self) -> bool {
        let (kind, domain, resolution) = self.grid_spec();
        if let Ok(engine) = &self.engine
            && grid_matches(engine, kind, domain, resolution)
        {
            return false;
        }
        let rebuilt = match &mut self.engine {
            Ok(engine) => engine.rebuild(kind, domain, resolution).map(|()| None),
            Err(_) => DistributionEngine::new(kind, domain, resolution).map(Some),
        };
        match rebuilt {
            Ok(Some(engine)) => self.engine = Ok(engine),
            Ok(None) => {}
            Err(error) => self.engine = Err(error),
        }
        true
    }
}

fn grid_matches(
    engine: &DistributionEngine,
    kind: ScaleType,
    domain: [f64; 2],
    resolution: usize,
) -> bool {
    engine.scale_type() == kind && engine.domain() == domain && engine.resolution() == resolution
}

/// Samples one entity into `out`.
fn sample_into(
    grid: Result<&DistributionEngine, DomainError>,
    marker: &dyn MarkerSource,
    key: EntityKey,
    time: f64,
    out: &mut Vec<Sample>,
) -> Result<(), EntityError> {
    let params = Parameters::read(marker, key, time)?;
    let grid = grid?;
    grid.generate_into(&params, out);
    check_finite(out)?;
    Ok(())
}
