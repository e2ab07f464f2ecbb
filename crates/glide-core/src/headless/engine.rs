//! Deterministic tween runner driven by explicit time steps

use std::collections::{BTreeSet, HashMap};

use crate::platform::{AnimationEngine, ElementHandle, OnComplete, Property, TickerId, Tween};
use crate::scroll::timing::{lerp, progress};

struct Running {
    element: ElementHandle,
    /// (property, start value, end value)
    channels: Vec<(Property, f64, f64)>,
    tween: Tween,
    elapsed: f64,
    on_complete: Option<OnComplete>,
}

#[derive(Debug, Clone, Copy)]
struct ScrollTween {
    from: Option<f64>,
    to: f64,
    duration: f64,
    elapsed: f64,
}

/// `AnimationEngine` whose clock only moves when `advance` is called
#[derive(Default)]
pub struct HeadlessEngine {
    values: HashMap<(ElementHandle, Property), f64>,
    running: Vec<Running>,
    scroll: Option<ScrollTween>,
    tickers: BTreeSet<u64>,
    next_ticker: u64,
    /// Number of tickers ever added
    subscriptions: usize,
}

impl std::fmt::Debug for HeadlessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessEngine")
            .field("values", &self.values)
            .field("running", &self.running.len())
            .field("scroll", &self.scroll)
            .field("tickers", &self.tickers)
            .finish()
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied value of `property` on `element`
    pub fn value(&self, element: ElementHandle, property: Property) -> Option<f64> {
        self.values.get(&(element, property)).copied()
    }

    /// Number of unfinished tweens
    pub fn running(&self) -> usize {
        self.running.len()
    }

    pub fn is_ticking(&self) -> bool {
        !self.tickers.is_empty()
    }

    /// Number of active frame subscriptions
    pub fn tickers(&self) -> usize {
        self.tickers.len()
    }

    /// Number of frame subscriptions ever made
    pub fn subscriptions(&self) -> usize {
        self.subscriptions
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    /// Advance element tweens by `dt` seconds and run the completion callbacks
    /// of the ones that finished
    pub fn advance(&mut self, dt: f64) {
        let mut finished = Vec::new();
        let mut index = 0;
        while index < self.running.len() {
            let tween = &mut self.running[index];
            tween.elapsed += dt;
            let done = if tween.elapsed < tween.tween.delay {
                false
            } else {
                let t = progress(tween.elapsed - tween.tween.delay, tween.tween.duration);
                let eased = tween.tween.easing.apply(t);
                for (property, from, to) in &tween.channels {
                    self.values
                        .insert((tween.element, *property), lerp(*from, *to, eased));
                }
                t >= 1.0
            };

            if done {
                finished.push(self.running.remove(index));
            } else {
                index += 1;
            }
        }

        for tween in finished {
            if let Some(on_complete) = tween.on_complete {
                on_complete();
            }
        }
    }

    /// Advance the native scroll tween from `position`; returns the new position
    pub fn advance_scroll(&mut self, dt: f64, position: f64) -> Option<f64> {
        let scroll = self.scroll.as_mut()?;
        let from = *scroll.from.get_or_insert(position);
        scroll.elapsed += dt;
        let t = progress(scroll.elapsed, scroll.duration);
        let y = lerp(from, scroll.to, crate::scroll::Easing::Power1Out.apply(t));
        if t >= 1.0 {
            self.scroll = None;
        }
        Some(y)
    }
}

impl AnimationEngine for HeadlessEngine {
    fn animate(&mut self, element: ElementHandle, tween: Tween, on_complete: Option<OnComplete>) {
        let channels = tween
            .properties
            .iter()
            .map(|(property, to)| {
                let from = self.value(element, *property).unwrap_or(1.0);
                (*property, from, *to)
            })
            .collect();
        self.running.push(Running {
            element,
            channels,
            tween,
            elapsed: 0.0,
            on_complete,
        });
    }

    fn set(&mut self, element: ElementHandle, properties: &[(Property, f64)]) {
        for (property, value) in properties {
            self.values.insert((element, *property), *value);
        }
    }

    fn cancel(&mut self, element: ElementHandle) {
        self.running.retain(|tween| tween.element != element);
    }

    fn animate_scroll(&mut self, to: f64, duration: f64) {
        self.scroll = Some(ScrollTween {
            from: None,
            to,
            duration,
            elapsed: 0.0,
        });
    }

    fn add_ticker(&mut self) -> TickerId {
        self.next_ticker += 1;
        self.subscriptions += 1;
        self.tickers.insert(self.next_ticker);
        TickerId(self.next_ticker)
    }

    fn remove_ticker(&mut self, id: TickerId) {
        self.tickers.remove(&id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::Easing;
    use std::cell::Cell;
    use std::rc::Rc;

    const EL: ElementHandle = ElementHandle::new(4);

    #[test]
    fn test_tween_waits_for_delay_then_completes() {
        let mut engine = HeadlessEngine::new();
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        engine.set(EL, &[(Property::Opacity, 0.0)]);
        engine.animate(
            EL,
            Tween::to(Property::Opacity, 1.0, 0.4)
                .with_delay(0.2)
                .with_easing(Easing::Linear),
            Some(Box::new(move || flag.set(true))),
        );

        engine.advance(0.1);
        assert_eq!(engine.value(EL, Property::Opacity), Some(0.0));

        engine.advance(0.3);
        let mid = engine.value(EL, Property::Opacity).unwrap();
        assert!((mid - 0.5).abs() < 1e-9);
        assert!(!done.get());

        engine.advance(0.2);
        assert_eq!(engine.value(EL, Property::Opacity), Some(1.0));
        assert!(done.get());
        assert_eq!(engine.running(), 0);
    }

    #[test]
    fn test_zero_duration_completes_on_next_advance() {
        let mut engine = HeadlessEngine::new();
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        engine.animate(
            EL,
            Tween::to(Property::Opacity, 0.0, 0.0),
            Some(Box::new(move || flag.set(true))),
        );
        engine.advance(0.0);
        assert!(done.get());
    }

    #[test]
    fn test_cancel_drops_callback() {
        let mut engine = HeadlessEngine::new();
        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        engine.animate(
            EL,
            Tween::to(Property::Opacity, 0.0, 0.5),
            Some(Box::new(move || flag.set(true))),
        );
        engine.cancel(EL);
        engine.advance(1.0);
        assert!(!done.get());
    }

    #[test]
    fn test_tickers() {
        let mut engine = HeadlessEngine::new();
        let id = engine.add_ticker();
        assert!(engine.is_ticking());
        engine.remove_ticker(id);
        engine.remove_ticker(id);
        assert!(!engine.is_ticking());
        assert_eq!(engine.subscriptions(), 1);
    }

    #[test]
    fn test_scroll_tween_reaches_destination() {
        let mut engine = HeadlessEngine::new();
        engine.animate_scroll(600.0, 1.0);
        let first = engine.advance_scroll(0.5, 100.0).unwrap();
        assert!(first > 100.0 && first < 600.0);
        assert_eq!(engine.advance_scroll(0.5, first), Some(600.0));
        assert_eq!(engine.advance_scroll(0.5, 600.0), None);
    }
}
