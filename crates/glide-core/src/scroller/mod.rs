//! The scroll/transition controller
//!
//! # Frame ordering
//!
//! Every frame runs, in order: position interpolation, transform
//! recomputation, transition evaluation, settle checks and finally the
//! `scrolling` dispatch, so bus subscribers always observe post-transform,
//! post-transition state.
//!
//! # Usage
//!
//! ```ignore
//! let mut scroller = Scroller::new(GlideConfig::default(), page, engine, bus);
//! scroller.init(true, None);
//!
//! // host input handlers
//! scroller.on_wheel(event.delta_y);
//!
//! // host animation frame, while subscribed
//! if scroller.is_ticking() {
//!     scroller.raf();
//! }
//! ```

mod frame;
mod layout;
mod transitions;

use crate::child::{Child, TransitionState};
use crate::completion::{self, Completion, Resolver};
use crate::config::GlideConfig;
use crate::gaps::GapMap;
use crate::platform::{
    AnimationEngine, ElementHandle, EventBus, PageSize, ScrollEvent, Size, TickerId, Viewport,
};
use crate::registry::ChildRegistry;
use crate::scroll::{Direction, Mode, ScrollState};
use crate::transition::{TransitionController, TransitionKind};

pub(crate) use frame::Pass;

/// What the host should do with the wheel event it forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelOutcome {
    /// Call `preventDefault` so the browser does not scroll natively
    pub prevent_default: bool,
    /// The target moved and interpolation is running
    pub moved: bool,
}

/// Awaited `scroll_to`, resolved by the frame pass once the position settles
#[derive(Debug)]
struct SettleWaiter {
    destination: f64,
    resolver: Resolver,
}

pub struct Scroller<V, A, E> {
    config: GlideConfig,
    viewport: V,
    engine: A,
    events: E,
    state: ScrollState,
    children: ChildRegistry,
    gaps: GapMap,
    transitions: TransitionController,
    section: Option<ElementHandle>,
    ticker: Option<TickerId>,
    waiters: Vec<SettleWaiter>,
    listening: bool,
    /// Width of the horizontal gaps behind the current position, as of the last pass
    horizontal: f64,
    window: Size,
    size: PageSize,
    mobile: bool,
}

impl<V, A, E> Scroller<V, A, E>
where
    V: Viewport,
    A: AnimationEngine,
    E: EventBus,
{
    pub fn new(config: GlideConfig, viewport: V, engine: A, events: E) -> Self {
        let state = ScrollState::new(
            Mode::from_smooth(config.scroll.smooth),
            config.scroll.elasticity,
            config.scroll.velocity,
        );
        let transitions = TransitionController::new(config.transitions.clone());
        let window = viewport.window_size();
        Self {
            config,
            viewport,
            engine,
            events,
            state,
            children: ChildRegistry::new(),
            gaps: GapMap::new(),
            transitions,
            section: None,
            ticker: None,
            waiters: Vec::new(),
            listening: false,
            horizontal: 0.0,
            window,
            size: PageSize::default(),
            mobile: false,
        }
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    pub fn config(&self) -> &GlideConfig {
        &self.config
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn engine(&self) -> &A {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut A {
        &mut self.engine
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn children(&self) -> &ChildRegistry {
        &self.children
    }

    pub fn child(&self, id: &str) -> Option<&Child> {
        self.children.find(id).and_then(|key| self.children.get(key))
    }

    pub fn gaps(&self) -> &GapMap {
        &self.gaps
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn section(&self) -> Option<ElementHandle> {
        self.section
    }

    pub fn is_initialized(&self) -> bool {
        self.section.is_some()
    }

    /// Whether the per-frame subscription is active
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    pub fn page_size(&self) -> PageSize {
        self.size
    }

    /// Current virtual scroll position
    pub fn scroll_position(&self) -> f64 {
        self.state.current()
    }

    /// Current position as a fraction of the scrollable extent
    pub fn scroll_progress(&self) -> f64 {
        let bound = self.state.bound();
        if bound <= 0.0 {
            return 0.0;
        }
        (self.state.current() / bound).clamp(0.0, 1.0)
    }

    pub fn set_tracking_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&Child) + 'static,
    {
        self.transitions.set_tracking_hook(Box::new(hook));
    }

    pub fn register_transition(&mut self, name: impl Into<String>, kind: impl TransitionKind + 'static) {
        self.transitions.kinds_mut().register(name, kind);
    }

    // =====================================================================
    // Lifecycle
    // =====================================================================

    /// Attach to `section` (or the viewport's default section) and start
    ///
    /// Without a section the engine stays uninitialized: no listeners, no
    /// frame loop. Returns whether initialization happened.
    pub fn init(&mut self, smooth: bool, section: Option<ElementHandle>) -> bool {
        self.state.set_mode(Mode::from_smooth(smooth));
        self.section = section.or_else(|| self.viewport.find_section());

        let Some(section) = self.section else {
            tracing::warn!("Scroll section not found, engine left uninitialized");
            return false;
        };

        if smooth {
            self.lock(section);
        }
        self.viewport.listen(true);
        self.listening = true;
        self.start();
        true
    }

    /// Rebuild the child set of the current section and lay it out
    pub fn start(&mut self) {
        let Some(section) = self.section else {
            return;
        };
        tracing::debug!(mode = ?self.state.mode(), "Starting scroller");

        self.transitions.begin_scan();
        self.children = ChildRegistry::discover(
            &self.viewport,
            section,
            &mut self.gaps,
            crate::registry::DiscoverOptions {
                default_scroll_offset: self.config.transitions.default_scroll_offset,
                smooth: self.state.mode().is_smooth(),
            },
        );
        self.reset_transitions();
        self.update();
        self.run(Pass::TRANSFORMS);
    }

    /// Drop the current page: back to the top, forget every child
    ///
    /// Enter animations started before the reset no longer resolve their
    /// completions.
    pub fn reset(&mut self) {
        if self.section.is_none() {
            return;
        }
        tracing::debug!("Resetting scroller");
        self.scroll_to(0.0, false, false);
        self.transitions.bump_epoch();
        self.state.set_direction(Direction::Forward);
        self.children.clear();
        self.gaps.clear();
        self.horizontal = 0.0;
    }

    /// Detach listeners and stop the frame loop; pending settle waits are cancelled
    pub fn destroy(&mut self) {
        if self.section.is_none() {
            return;
        }
        tracing::debug!("Destroying scroller");
        self.scroll_to(0.0, false, false);
        self.viewport.listen(false);
        self.listening = false;
        self.stop_raf();
        self.waiters.clear();
    }

    /// Switch between Smooth and Native mode
    ///
    /// The position is reset to 0 before geometry is recomputed.
    pub fn set_mode(&mut self, mode: Mode) {
        tracing::debug!(?mode, "Switching scroll mode");
        match mode {
            Mode::Smooth => {
                self.state.set_mode(Mode::Smooth);
                self.viewport.set_scroll_position(0.0);
                self.state.jump_to(0.0);
                if let Some(section) = self.section {
                    self.lock(section);
                }
            }
            Mode::Native => {
                self.stop_raf();
                if let Some(section) = self.section {
                    self.viewport.set_scroll_locked(section, false);
                    self.viewport.set_height(section, None);
                }
                self.state.set_mode(Mode::Native);
                self.viewport.set_scroll_position(0.0);
                self.state.jump_to(0.0);
                self.clear_transforms();
                self.gaps.clear();
                self.horizontal = 0.0;
                for (_, child) in self.children.iter_mut() {
                    child.horizontal = None;
                }
            }
        }

        if self.section.is_some() {
            self.update();
            if mode.is_smooth() {
                self.run(Pass::TRANSFORMS);
            }
        }
    }

    pub fn enable_scroll(&mut self) {
        self.state.set_disabled(false);
    }

    pub fn disable_scroll(&mut self) {
        self.state.set_disabled(true);
    }

    /// Mark a child as already entered and eligible for automatic transitions
    pub fn set_transitioned(&mut self, id: &str) -> bool {
        let Some(child) = self.children.find(id).and_then(|key| self.children.get_mut(key)) else {
            return false;
        };
        child.flags.auto = true;
        child.transition = TransitionState::Transitioned;
        true
    }

    // =====================================================================
    // Input
    // =====================================================================

    /// Wheel/trackpad delta (positive = down)
    ///
    /// Smooth mode always claims the event, even while disabled, so the
    /// browser does not scroll underneath the engine.
    pub fn on_wheel(&mut self, delta_y: f64) -> WheelOutcome {
        if !self.listening || !self.state.mode().is_smooth() {
            return WheelOutcome {
                prevent_default: false,
                moved: false,
            };
        }
        let moved = self.state.apply_wheel(delta_y);
        if moved {
            self.start_raf();
        }
        WheelOutcome {
            prevent_default: true,
            moved,
        }
    }

    /// Native scroll event
    pub fn on_scroll(&mut self) {
        if !self.listening || self.state.mode().is_smooth() {
            return;
        }
        self.state.sync_native(self.viewport.scroll_position());
        self.run(Pass::ANIMATIONS);
    }

    /// Window resize
    pub fn on_resize(&mut self) {
        let Some(section) = self.section else {
            return;
        };
        if !self.listening {
            return;
        }

        let window = self.viewport.window_size();
        if self.state.mode().is_smooth() {
            self.stop_raf();
            self.state.jump_to(0.0);
            self.clear_transforms();
            self.viewport.set_height(section, Some(window.height));
        } else {
            if (window.width - self.window.width).abs() > f64::EPSILON {
                self.viewport.set_scroll_position(0.0);
            }
            self.state.sync_native(self.viewport.scroll_position());
        }

        self.update();
        tracing::debug!(width = window.width, height = window.height, mobile = self.mobile, "Resized");
        self.dispatch();
    }

    // =====================================================================
    // Frame loop
    // =====================================================================

    /// Animation-frame callback: interpolate, run a full pass, stop on convergence
    pub fn raf(&mut self) {
        if self.ticker.is_none() {
            return;
        }
        let converged = self.state.step(self.config.scroll.epsilon);
        self.run(Pass::FULL);
        if converged {
            self.stop_raf();
        }
    }

    /// Subscribe to frames unless already subscribed or already at the target
    pub fn start_raf(&mut self) {
        if self.ticker.is_some() || self.state.is_converged(self.config.scroll.epsilon) {
            return;
        }
        self.ticker = Some(self.engine.add_ticker());
        tracing::trace!("Frame loop started");
    }

    /// Unsubscribe from frames and snap onto the target; no-op when stopped
    pub fn stop_raf(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.engine.remove_ticker(id);
            tracing::trace!("Frame loop stopped");
        }
        self.state.settle();
        self.check_settled();
    }

    /// Apply pending animation completion notices
    pub fn pump(&mut self) {
        self.transitions.drain(&mut self.children);
    }

    // =====================================================================
    // Programmatic scroll
    // =====================================================================

    /// Scroll to `value`
    ///
    /// With `await_settle`, the returned completion resolves once the
    /// position is within the settle tolerance of the destination; otherwise
    /// it is already resolved.
    pub fn scroll_to(&mut self, value: f64, animated: bool, await_settle: bool) -> Completion {
        match self.state.mode() {
            Mode::Native => {
                if animated {
                    self.engine
                        .animate_scroll(value, self.config.scroll.native_scroll_duration);
                } else {
                    // The scrollbar clamps; track where it actually landed
                    self.viewport.set_scroll_position(value);
                    self.state.sync_native(self.viewport.scroll_position());
                }
            }
            Mode::Smooth => {
                self.state.set_target(value);
                if animated {
                    self.start_raf();
                } else {
                    self.stop_raf();
                    self.state.jump_to(value);
                    self.run(Pass::TRANSFORMS);
                }
            }
        }

        let destination = value.clamp(0.0, self.state.bound());
        let tolerance = self.config.scroll.settle_tolerance;
        if !await_settle || (self.state.current() - destination).abs() <= tolerance {
            return Completion::ready();
        }

        let (resolver, completion) = completion::pair();
        self.waiters.push(SettleWaiter {
            destination,
            resolver,
        });
        completion
    }

    /// Scroll to the element with id `id`; unknown ids are ignored
    pub fn scroll_to_el(&mut self, id: &str) -> bool {
        let Some(section) = self.section else {
            return false;
        };
        let Some(element) = self.viewport.element_by_id(section, id) else {
            return false;
        };

        let backup = self.viewport.transform(element);
        self.viewport.set_transform(element, None);
        let top = self.viewport.bounding_rect(element).top;
        self.viewport.set_transform(element, backup);

        let target = match self.state.mode() {
            Mode::Native => top + self.state.current(),
            Mode::Smooth => top,
        };
        self.scroll_to(target, true, false);
        true
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn lock(&mut self, section: ElementHandle) {
        self.viewport.set_scroll_locked(section, true);
        let height = self.viewport.window_size().height;
        self.viewport.set_height(section, Some(height));
    }

    /// Remove every transform the engine applied
    fn clear_transforms(&mut self) {
        for (_, child) in self.children.iter_mut() {
            if let Some(track) = child.horizontal_track {
                self.viewport.set_transform(track, None);
                child.progress.x = 0.0;
            }
            if child.flags.scroll {
                self.viewport.set_transform(child.element, None);
            }
        }
    }

    /// Resolve waiters whose destination has been reached; drop abandoned ones
    fn check_settled(&mut self) {
        if self.waiters.is_empty() {
            return;
        }
        let current = self.state.current();
        let tolerance = self.config.scroll.settle_tolerance;
        let mut pending = Vec::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if waiter.resolver.is_abandoned() {
                continue;
            }
            if (current - waiter.destination).abs() < tolerance {
                waiter.resolver.resolve();
            } else {
                pending.push(waiter);
            }
        }
        self.waiters = pending;
    }

    fn dispatch(&mut self) {
        let event = ScrollEvent {
            pos: self.state.current(),
            dir: self.state.direction().sign(),
            elasticity: self.state.elasticity(),
            size: self.size,
        };
        tracing::trace!(pos = event.pos, dir = event.dir, "Dispatching {}", ScrollEvent::NAME);
        self.events.dispatch(&event);
    }
}
