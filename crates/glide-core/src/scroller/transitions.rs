//! Batch enter/exit transitions
//!
//! Each batch starts the eligible children shortest-first and hands the
//! batch completion to the last (longest) one, so it resolves when the whole
//! batch has visibly finished.

use crate::child::{Child, ChildKey};
use crate::completion::{self, Completion, Resolver};
use crate::platform::{AnimationEngine, EventBus, Property, Tween, Viewport};
use crate::scroll::Easing;
use crate::scroller::Scroller;
use crate::transition::ExitKind;

impl<V, A, E> Scroller<V, A, E>
where
    V: Viewport,
    A: AnimationEngine,
    E: EventBus,
{
    /// Enter every child that is armed and in view
    pub fn transition_in_all(&mut self) -> Completion {
        self.pump();
        let batch = self.batch(
            |scroller, child| scroller.transitions.needs_transition(child),
            |scroller, child| scroller.transitions.enter_duration(child),
        );
        tracing::debug!(children = batch.len(), "Transition in all");

        run_batch(batch, |key, resolver| {
            if let Some(child) = self.children.get_mut(key) {
                self.transitions.enter(&mut self.engine, key, child, resolver);
            }
        })
        .unwrap_or_else(Completion::ready)
    }

    /// Exit every entered, visible child with an `out` animation
    ///
    /// With no such child the section's content fades out instead.
    pub fn transition_out_all(&mut self) -> Completion {
        self.pump();
        let batch = self.batch(
            |_, child| child.config.exit.is_some() && child.is_transitioned() && child.in_view,
            |scroller, child| scroller.transitions.exit_duration(child, ExitKind::Standard),
        );
        tracing::debug!(children = batch.len(), "Transition out all");

        if batch.is_empty() {
            return self.page_exit();
        }

        run_batch(batch, |key, resolver| {
            if let Some(child) = self.children.get(key) {
                self.transitions
                    .exit(&mut self.engine, child, ExitKind::Standard, resolver);
            }
        })
        .unwrap_or_else(Completion::ready)
    }

    /// Run the custom exit of every entered child that declares one
    pub fn custom_out_all(&mut self) -> Completion {
        self.pump();
        let batch = self.batch(
            |_, child| child.config.custom_exit.is_some() && child.is_transitioned(),
            |scroller, child| scroller.transitions.exit_duration(child, ExitKind::Custom),
        );
        tracing::debug!(children = batch.len(), "Custom out all");

        run_batch(batch, |key, resolver| {
            if let Some(child) = self.children.get(key) {
                self.transitions
                    .exit(&mut self.engine, child, ExitKind::Custom, resolver);
            }
        })
        .unwrap_or_else(Completion::ready)
    }

    /// Put every child with an enter animation back into its hidden, armed state
    pub(crate) fn reset_transitions(&mut self) {
        for (_, child) in self.children.iter_mut() {
            self.transitions.reset(&mut self.engine, child);
        }
    }

    /// Eligible children with their effective durations, shortest first
    ///
    /// The sort is stable: equal durations keep document order.
    fn batch<F, D>(&self, eligible: F, duration: D) -> Vec<(ChildKey, f64)>
    where
        F: Fn(&Self, &Child) -> bool,
        D: Fn(&Self, &Child) -> f64,
    {
        let mut batch: Vec<(ChildKey, f64)> = self
            .children
            .iter()
            .filter(|(_, child)| eligible(self, child))
            .map(|(key, child)| (key, duration(self, child)))
            .collect();
        batch.sort_by(|a, b| a.1.total_cmp(&b.1));
        batch
    }

    fn page_exit(&mut self) -> Completion {
        let Some(target) = self.section.and_then(|s| self.viewport.page_exit_target(s)) else {
            return Completion::ready();
        };
        let (resolver, completion) = completion::pair();
        let tween = Tween::to(
            Property::Opacity,
            0.0,
            self.config.transitions.page_exit_duration,
        )
        .with_easing(Easing::Power1Out);
        tracing::debug!(duration = tween.duration, "Page exit fade");
        self.engine
            .animate(target, tween, Some(Box::new(move || resolver.resolve())));
        completion
    }
}

/// Start every entry, giving the batch resolver to the last one
///
/// Returns `None` for an empty batch.
fn run_batch<F>(batch: Vec<(ChildKey, f64)>, mut start: F) -> Option<Completion>
where
    F: FnMut(ChildKey, Option<Resolver>),
{
    let last = batch.len().checked_sub(1)?;
    let (resolver, completion) = completion::pair();
    let mut resolver = Some(resolver);
    for (index, (key, _)) in batch.into_iter().enumerate() {
        let handoff = if index == last { resolver.take() } else { None };
        start(key, handoff);
    }
    Some(completion)
}
