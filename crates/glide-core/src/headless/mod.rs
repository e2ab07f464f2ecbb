//! In-memory platform
//!
//! - `HeadlessPage` - `Viewport` over a static, TOML-describable layout
//! - `HeadlessEngine` - `AnimationEngine` with a manually advanced clock
//! - `EventLog` - `EventBus` that records every dispatched event
//!
//! Used by the `glide` CLI to replay input scripts and by the test-suite.

mod engine;
mod page;

pub use engine::HeadlessEngine;
pub use page::{ElementSpec, HeadlessPage, PageSpec};

use crate::platform::{EventBus, ScrollEvent, Viewport};
use crate::scroller::Scroller;

/// Records dispatched scroll events in order
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ScrollEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ScrollEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&ScrollEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return every recorded event
    pub fn take(&mut self) -> Vec<ScrollEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventBus for EventLog {
    fn dispatch(&mut self, event: &ScrollEvent) {
        self.events.push(*event);
    }
}

impl Scroller<HeadlessPage, HeadlessEngine, EventLog> {
    /// Let `dt` seconds of host time pass
    ///
    /// Order matches a browser frame: a running native scroll animation moves
    /// the scrollbar (and fires `scroll`), element tweens advance, then the
    /// frame callback runs if subscribed.
    pub fn advance_frame(&mut self, dt: f64) {
        let position = self.viewport().scroll_position();
        if let Some(y) = self.engine_mut().advance_scroll(dt, position) {
            self.viewport_mut().set_scroll_position(y);
            self.on_scroll();
        }

        self.engine_mut().advance(dt);

        if self.is_ticking() {
            self.raf();
        } else {
            self.pump();
        }
    }

    /// Advance frames of `dt` seconds until the frame loop stops, at most `limit` frames
    ///
    /// Returns the number of frames run.
    pub fn settle(&mut self, dt: f64, limit: usize) -> usize {
        let mut frames = 0;
        while frames < limit && (self.is_ticking() || self.engine().is_scrolling()) {
            self.advance_frame(dt);
            frames += 1;
        }
        frames
    }

    /// Simulate the user dragging the native scrollbar to `y`
    pub fn native_scroll(&mut self, y: f64) {
        self.viewport_mut().set_scroll_position(y);
        self.on_scroll();
    }
}
