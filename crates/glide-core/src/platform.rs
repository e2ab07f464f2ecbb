//! Host capabilities injected into the `Scroller`
//!
//! The engine never touches a document, an animation library or an event bus
//! directly. A host implements these three traits; `crate::headless` provides
//! an in-memory implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::scroll::Easing;

/// Opaque handle to a host element. The engine never owns the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Element box in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 2-D translation applied to an element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { x: 0.0, y: 0.0 };

    /// Shift content up by `y` pixels
    pub fn lift(y: f64) -> Self {
        Self { x: 0.0, y: -y }
    }

    /// Shift content left by `x` pixels
    pub fn slide(x: f64) -> Self {
        Self { x: -x, y: 0.0 }
    }
}

/// Animatable style properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
}

/// A single animation request handed to the `AnimationEngine`
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub properties: Vec<(Property, f64)>,
    /// Seconds
    pub duration: f64,
    /// Seconds
    pub delay: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn to(property: Property, value: f64, duration: f64) -> Self {
        Self {
            properties: vec![(property, value)],
            duration,
            delay: 0.0,
            easing: Easing::default(),
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Per-frame subscription token issued by the `AnimationEngine`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickerId(pub u64);

/// Called once when a tween finishes. Not invoked for cancelled tweens.
pub type OnComplete = Box<dyn FnOnce()>;

/// DOM and geometry provider
pub trait Viewport {
    /// Window inner size
    fn window_size(&self) -> Size;

    /// Native (browser) vertical scroll offset
    fn scroll_position(&self) -> f64;

    fn set_scroll_position(&mut self, y: f64);

    /// Default scroll section when `init` is not given one
    fn find_section(&self) -> Option<ElementHandle>;

    /// Elements inside `section` that carry scroll annotations, in document order
    fn scroll_elements(&self, section: ElementHandle) -> Vec<ElementHandle>;

    /// Resolve an element id inside `section`
    fn element_by_id(&self, section: ElementHandle, id: &str) -> Option<ElementHandle>;

    fn element_id(&self, element: ElementHandle) -> Option<String>;

    /// Data attributes, keyed by their camelCase dataset name
    fn attributes(&self, element: ElementHandle) -> HashMap<String, String>;

    /// Current box in viewport coordinates, transforms included
    fn bounding_rect(&self, element: ElementHandle) -> Rect;

    fn transform(&self, element: ElementHandle) -> Option<Transform>;

    /// Apply a transform, or clear it with `None`
    fn set_transform(&mut self, element: ElementHandle, transform: Option<Transform>);

    /// Inner horizontally scrolling track of a horizontal-scroll element
    fn horizontal_track(&self, element: ElementHandle) -> Option<ElementHandle>;

    /// Box of the section's content wrapper
    fn content_rect(&self, section: ElementHandle) -> Rect;

    /// Toggle the classes that prevent native scrolling
    fn set_scroll_locked(&mut self, section: ElementHandle, locked: bool);

    /// Fix the section height, or release it with `None`
    fn set_height(&mut self, element: ElementHandle, height: Option<f64>);

    /// Element faded out when leaving a page that has no exit animations
    fn page_exit_target(&self, section: ElementHandle) -> Option<ElementHandle>;

    /// Attach or detach the wheel, scroll and resize listeners
    fn listen(&mut self, _attached: bool) {}
}

/// Tween execution and frame scheduling
pub trait AnimationEngine {
    fn animate(&mut self, element: ElementHandle, tween: Tween, on_complete: Option<OnComplete>);

    /// Apply properties immediately
    fn set(&mut self, element: ElementHandle, properties: &[(Property, f64)]);

    /// Kill every running tween on `element` without completing it
    fn cancel(&mut self, element: ElementHandle);

    /// Animate the native scrollbar to `to` over `duration` seconds
    fn animate_scroll(&mut self, to: f64, duration: f64);

    /// Subscribe to per-frame callbacks
    fn add_ticker(&mut self) -> TickerId;

    fn remove_ticker(&mut self, id: TickerId);
}

/// Page size reported with every scroll event
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub w: f64,
    pub h: f64,
    pub screen_w: f64,
    pub screen_h: f64,
}

/// Payload of the `scrolling` event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub pos: f64,
    pub dir: i8,
    pub elasticity: f64,
    pub size: PageSize,
}

impl ScrollEvent {
    pub const NAME: &'static str = "scrolling";
}

/// Page-level pub/sub
pub trait EventBus {
    fn dispatch(&mut self, event: &ScrollEvent);
}

impl<F> EventBus for F
where
    F: FnMut(&ScrollEvent),
{
    fn dispatch(&mut self, event: &ScrollEvent) {
        self(event)
    }
}
