//! The per-frame pass: child translation, membership and transition evaluation

use crate::child::ChildKey;
use crate::geometry::{self, Probe};
use crate::platform::{AnimationEngine, ElementHandle, EventBus, Transform, Viewport};
use crate::scroll::timing;
use crate::scroller::Scroller;

/// Which halves of the frame pass to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pass {
    /// Recompute membership and fire enter/reset transitions
    pub animations: bool,
    /// Recompute and apply child transforms
    pub transforms: bool,
}

impl Pass {
    pub const FULL: Pass = Pass {
        animations: true,
        transforms: true,
    };
    pub const ANIMATIONS: Pass = Pass {
        animations: true,
        transforms: false,
    };
    pub const TRANSFORMS: Pass = Pass {
        animations: false,
        transforms: true,
    };
}

/// Gap containing the current position
#[derive(Debug, Clone, Copy)]
struct ActiveGap {
    owner: ChildKey,
    track: ElementHandle,
    from: f64,
    to: f64,
}

impl<V, A, E> Scroller<V, A, E>
where
    V: Viewport,
    A: AnimationEngine,
    E: EventBus,
{
    pub(crate) fn run(&mut self, pass: Pass) {
        self.pump();
        self.state.update_direction();

        let current = self.state.current();
        self.horizontal = self.gaps.horizontal_offset(current);
        let gap = self.gaps.lookup(current).map(|gap| ActiveGap {
            owner: gap.owner,
            track: gap.track,
            from: gap.from,
            to: gap.to,
        });

        match gap {
            None => {
                if pass.transforms {
                    self.translate_children(current);
                }
                // Inside a gap the vertical axis is horizontal motion; membership is frozen
                if pass.animations {
                    self.evaluate_transitions(current);
                }
            }
            Some(gap) => {
                if pass.transforms {
                    self.translate_in_gap(current, gap);
                }
            }
        }

        self.check_settled();
        self.dispatch();
        self.state.commit_frame();
    }

    fn probe(&self, current: f64) -> Probe {
        Probe {
            current,
            horizontal: self.horizontal,
            window_height: self.window.height,
        }
    }

    fn translate_children(&mut self, current: f64) {
        let probe = self.probe(current);
        let horizontal = self.horizontal;
        let screen_height = self.size.screen_h;

        for (_, child) in self.children.iter_mut() {
            if !child.flags.scroll {
                continue;
            }

            let y = if child.flags.sticky {
                geometry::sticky_position(current, child.sticky_bounding).trunc()
            } else if geometry::in_scroll(child.bounding, child.scroll_offset, probe) {
                (current - horizontal).trunc()
            } else if current > child.bounding.top + horizontal {
                child.bounding.top + child.bounding.height + child.scroll_offset
            } else {
                0.0
            };

            self.viewport
                .set_transform(child.element, Some(Transform::lift(y)));
            child.progress.y = geometry::scroll_progress_y(y, child.bounding, screen_height);

            if let (Some(range), Some(track)) = (child.horizontal, child.horizontal_track) {
                if current < range.from {
                    child.progress.x = 0.0;
                    self.viewport.set_transform(track, Some(Transform::IDENTITY));
                } else {
                    child.progress.x = 1.0;
                    self.viewport
                        .set_transform(track, Some(Transform::slide(range.width())));
                }
            }
        }
    }

    fn translate_in_gap(&mut self, current: f64, gap: ActiveGap) {
        let pinned = Transform::lift((gap.from - self.horizontal).trunc());
        for (_, child) in self.children.iter_mut() {
            if child.flags.scroll {
                self.viewport.set_transform(child.element, Some(pinned));
            }
        }

        if let Some(owner) = self.children.get_mut(gap.owner) {
            owner.progress.x = timing::fraction(current, gap.from, gap.to);
        }
        let x = (current - gap.from).trunc();
        self.viewport.set_transform(gap.track, Some(Transform::slide(x)));
    }

    fn evaluate_transitions(&mut self, current: f64) {
        let probe = self.probe(current);
        for (key, child) in self.children.iter_mut() {
            child.in_view = geometry::in_view(child.bounding, probe);
            child.in_offset = child.in_view
                && child.config.enter.is_some()
                && geometry::in_offset(child.bounding, child.config.offset, probe);

            if self.transitions.needs_transition(child) {
                self.transitions.enter(&mut self.engine, key, child, None);
            } else if self.transitions.needs_reset(child, current) {
                self.transitions.reset(&mut self.engine, child);
            }
        }
    }
}
