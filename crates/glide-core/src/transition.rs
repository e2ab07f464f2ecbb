//! Enter/exit animation orchestration
//!
//! Transition kinds are looked up by name in a `TransitionRegistry`, so new
//! kinds can be added without touching the controller. The controller only
//! decides *when* a child enters, leaves or re-arms; tweens are executed by
//! the injected `AnimationEngine`.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::child::{Child, ChildKey, TransitionState};
use crate::completion::Resolver;
use crate::config::TransitionConfig;
use crate::platform::{AnimationEngine, Property, Tween};
use crate::registry::ChildRegistry;
use crate::scroll::Easing;

/// A named enter/exit animation strategy
pub trait TransitionKind {
    /// Tween revealing the element
    fn enter(&self, duration: f64, delay: f64) -> Tween;

    /// Tween hiding the element
    fn exit(&self, duration: f64) -> Tween;

    /// Properties applied immediately when the element is (re-)armed
    fn hidden(&self) -> Vec<(Property, f64)>;
}

/// Opacity 0 → 1 on enter, 1 → 0 on exit
#[derive(Debug, Clone, Copy, Default)]
pub struct Fade;

impl TransitionKind for Fade {
    fn enter(&self, duration: f64, delay: f64) -> Tween {
        Tween::to(Property::Opacity, 1.0, duration)
            .with_delay(delay)
            .with_easing(Easing::Power1In)
    }

    fn exit(&self, duration: f64) -> Tween {
        Tween::to(Property::Opacity, 0.0, duration).with_easing(Easing::Power1Out)
    }

    fn hidden(&self) -> Vec<(Property, f64)> {
        vec![(Property::Opacity, 0.0)]
    }
}

/// Transition kinds by name; `"fade"` is always registered
pub struct TransitionRegistry {
    kinds: HashMap<String, Box<dyn TransitionKind>>,
}

impl Default for TransitionRegistry {
    fn default() -> Self {
        let mut registry = Self {
            kinds: HashMap::new(),
        };
        registry.register("fade", Fade);
        registry
    }
}

impl TransitionRegistry {
    pub fn register(&mut self, name: impl Into<String>, kind: impl TransitionKind + 'static) {
        self.kinds.insert(name.into(), Box::new(kind));
    }

    pub fn get(&self, name: &str) -> Option<&dyn TransitionKind> {
        self.kinds.get(name).map(|kind| kind.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }
}

/// Invoked once per tracked child after its first enter completes
pub type TrackingHook = Box<dyn FnMut(&Child)>;

#[derive(Debug, Clone, Copy)]
enum Notice {
    Entered { key: ChildKey, scan: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// The child's `out` animation
    Standard,
    /// The child's `transitionCustomOut` animation
    Custom,
}

pub struct TransitionController {
    kinds: TransitionRegistry,
    defaults: TransitionConfig,
    /// Bumped by `reset`; enter completions from an older epoch never resolve
    epoch: Rc<Cell<u64>>,
    /// Bumped by every discovery; notices from older scans carry stale keys
    scan: u64,
    notices_tx: mpsc::UnboundedSender<Notice>,
    notices_rx: mpsc::UnboundedReceiver<Notice>,
    tracking_hook: TrackingHook,
}

impl TransitionController {
    pub fn new(defaults: TransitionConfig) -> Self {
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        Self {
            kinds: TransitionRegistry::default(),
            defaults,
            epoch: Rc::new(Cell::new(0)),
            scan: 0,
            notices_tx,
            notices_rx,
            tracking_hook: Box::new(|child: &Child| {
                tracing::info!(child = child.label(), "Tracking hook fired");
            }),
        }
    }

    pub fn kinds(&self) -> &TransitionRegistry {
        &self.kinds
    }

    pub fn kinds_mut(&mut self) -> &mut TransitionRegistry {
        &mut self.kinds
    }

    pub fn defaults(&self) -> &TransitionConfig {
        &self.defaults
    }

    pub fn set_tracking_hook(&mut self, hook: TrackingHook) {
        self.tracking_hook = hook;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    pub fn bump_epoch(&mut self) {
        self.epoch.set(self.epoch.get() + 1);
    }

    pub fn begin_scan(&mut self) {
        self.scan += 1;
    }

    /// Child has an enter animation, is armed, and is far enough into view
    pub fn needs_transition(&self, child: &Child) -> bool {
        child.config.enter.is_some() && child.flags.auto && !child.is_transitioned() && child.in_offset
    }

    /// Looping child that entered and has since scrolled back below the viewport
    pub fn needs_reset(&self, child: &Child, current: f64) -> bool {
        child.config.enter.is_some()
            && child.config.looped
            && child.is_transitioned()
            && child.bounding.top > current
            && !child.in_view
    }

    pub fn enter_duration(&self, child: &Child) -> f64 {
        child.config.enter_duration(self.defaults.enter_duration)
    }

    /// Effective exit duration; custom exits of off-screen children are instant
    pub fn exit_duration(&self, child: &Child, kind: ExitKind) -> f64 {
        if kind == ExitKind::Custom && !child.in_view {
            0.0
        } else {
            child.config.exit_duration(self.defaults.exit_duration)
        }
    }

    /// Start the enter animation of `child`
    ///
    /// The child is marked transitioned even when its kind is unknown, so it is
    /// not retried every frame. `resolver` completes with the animation, or
    /// immediately when there is nothing to animate.
    pub fn enter<A: AnimationEngine>(
        &self,
        engine: &mut A,
        key: ChildKey,
        child: &mut Child,
        resolver: Option<Resolver>,
    ) {
        if !child.flags.auto || child.is_transitioned() {
            resolve(resolver);
            return;
        }
        child.transition = TransitionState::Transitioned;
        engine.cancel(child.element);

        let Some(name) = child.config.enter.as_deref() else {
            resolve(resolver);
            return;
        };
        let Some(kind) = self.kinds.get(name) else {
            tracing::warn!(child = child.label(), kind = name, "Unknown enter transition");
            resolve(resolver);
            return;
        };

        let duration = self.enter_duration(child);
        tracing::debug!(child = child.label(), kind = name, duration, "Transition in");

        let epoch = Rc::clone(&self.epoch);
        let started = epoch.get();
        let notices = self.notices_tx.clone();
        let scan = self.scan;
        engine.animate(
            child.element,
            kind.enter(duration, child.config.delay),
            Some(Box::new(move || {
                let _ = notices.send(Notice::Entered { key, scan });
                if epoch.get() == started {
                    resolve(resolver);
                }
            })),
        );
    }

    /// Start the standard or custom exit animation of `child`
    pub fn exit<A: AnimationEngine>(
        &self,
        engine: &mut A,
        child: &Child,
        kind: ExitKind,
        resolver: Option<Resolver>,
    ) {
        engine.cancel(child.element);

        let name = match kind {
            ExitKind::Standard => child.config.exit.as_deref(),
            ExitKind::Custom => child.config.custom_exit.as_deref(),
        };
        let Some(name) = name else {
            resolve(resolver);
            return;
        };
        let Some(strategy) = self.kinds.get(name) else {
            tracing::warn!(child = child.label(), kind = name, "Unknown exit transition");
            resolve(resolver);
            return;
        };

        let duration = self.exit_duration(child, kind);
        tracing::debug!(child = child.label(), kind = name, duration, "Transition out");
        engine.animate(
            child.element,
            strategy.exit(duration),
            Some(Box::new(move || resolve(resolver))),
        );
    }

    /// Re-arm the enter animation: kill tweens, apply the hidden state, go Idle
    pub fn reset<A: AnimationEngine>(&self, engine: &mut A, child: &mut Child) {
        let Some(name) = child.config.enter.as_deref() else {
            return;
        };
        engine.cancel(child.element);
        child.transition = TransitionState::Idle;
        tracing::debug!(child = child.label(), "Transition reset");
        if let Some(kind) = self.kinds.get(name) {
            engine.set(child.element, &kind.hidden());
        }
    }

    /// Apply completion notices: fire the tracking hook once per tracked child
    pub fn drain(&mut self, children: &mut ChildRegistry) {
        while let Ok(notice) = self.notices_rx.try_recv() {
            let Notice::Entered { key, scan } = notice;
            if scan != self.scan {
                continue;
            }
            if let Some(child) = children.get_mut(key) {
                if child.flags.tracking && !child.tracked {
                    child.tracked = true;
                    (self.tracking_hook)(child);
                }
            }
        }
    }
}

fn resolve(resolver: Option<Resolver>) {
    if let Some(resolver) = resolver {
        resolver.resolve();
    }
}
