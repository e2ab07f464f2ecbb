//! Registered scroll elements

use slotmap::new_key_type;

use crate::platform::{ElementHandle, Transform};

new_key_type! {
    /// Arena key of a registered child; invalid after the next `discover`
    pub struct ChildKey;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildFlags {
    /// Translated by the frame pass
    pub scroll: bool,
    pub sticky: bool,
    pub horizontal_scroll: bool,
    /// Eligible for the automatic enter animation
    pub auto: bool,
    /// Fire the tracking hook after the first enter
    pub tracking: bool,
}

/// Untransformed box on the virtual axis, rounded up to whole pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounding {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickyBounding {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HorizontalRange {
    pub from: f64,
    pub to: f64,
}

impl HorizontalRange {
    #[inline]
    pub fn width(&self) -> f64 {
        self.to - self.from
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionState {
    #[default]
    Idle,
    Transitioned,
}

/// Declarative per-element configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildConfig {
    pub enter: Option<String>,
    pub exit: Option<String>,
    pub custom_exit: Option<String>,
    pub duration: Option<f64>,
    pub duration_in: Option<f64>,
    pub duration_out: Option<f64>,
    /// Re-arm the enter animation after scrolling back above the element
    pub looped: bool,
    /// Fraction of the element height that must be scrolled into view before entering
    pub offset: Option<f64>,
    /// Re-arm the enter animation on every layout pass
    pub force_update: bool,
    /// Enter delay in seconds
    pub delay: f64,
}

impl ChildConfig {
    /// Effective enter duration; zero or missing values fall back to `default`
    pub fn enter_duration(&self, default: f64) -> f64 {
        positive(self.duration_in.or(self.duration)).unwrap_or(default)
    }

    /// Effective exit duration; zero or missing values fall back to `default`
    pub fn exit_duration(&self, default: f64) -> f64 {
        positive(self.duration_out.or(self.duration)).unwrap_or(default)
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[derive(Debug, Clone)]
pub struct Child {
    pub id: Option<String>,
    pub element: ElementHandle,
    pub flags: ChildFlags,
    pub config: ChildConfig,
    pub bounding: Bounding,
    pub sticky_bounding: StickyBounding,
    pub(crate) sticky_parent: Option<ElementHandle>,
    pub(crate) sticky_content: Option<ElementHandle>,
    /// Margin (px) around the element inside which it tracks the scroll 1:1
    pub scroll_offset: f64,
    pub horizontal: Option<HorizontalRange>,
    pub(crate) horizontal_track: Option<ElementHandle>,
    pub progress: Progress,
    pub transition: TransitionState,
    pub tracked: bool,
    pub in_view: bool,
    pub in_offset: bool,
    pub(crate) transform_backup: Option<Transform>,
}

impl Child {
    pub fn new(element: ElementHandle, id: Option<String>) -> Self {
        Self {
            id,
            element,
            flags: ChildFlags {
                scroll: true,
                auto: true,
                ..Default::default()
            },
            config: ChildConfig::default(),
            bounding: Bounding::default(),
            sticky_bounding: StickyBounding::default(),
            sticky_parent: None,
            sticky_content: None,
            scroll_offset: 0.0,
            horizontal: None,
            horizontal_track: None,
            progress: Progress::default(),
            transition: TransitionState::Idle,
            tracked: false,
            in_view: false,
            in_offset: false,
            transform_backup: None,
        }
    }

    #[inline]
    pub fn is_transitioned(&self) -> bool {
        self.transition == TransitionState::Transitioned
    }

    /// Name used in log lines
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<anonymous>")
    }

    pub fn horizontal_track(&self) -> Option<ElementHandle> {
        self.horizontal_track
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_duration_fallbacks() {
        let mut config = ChildConfig::default();
        assert_eq!(config.enter_duration(0.4), 0.4);

        config.duration = Some(0.8);
        assert_eq!(config.enter_duration(0.4), 0.8);

        config.duration_in = Some(1.2);
        assert_eq!(config.enter_duration(0.4), 1.2);

        config.duration_in = Some(0.0);
        assert_eq!(config.enter_duration(0.4), 0.4);
    }

    #[test]
    fn test_exit_duration_prefers_duration_out() {
        let config = ChildConfig {
            duration: Some(0.5),
            duration_out: Some(0.3),
            ..Default::default()
        };
        assert_eq!(config.exit_duration(0.2), 0.3);
    }

    #[test]
    fn test_new_child_defaults() {
        let child = Child::new(ElementHandle::new(7), Some("hero".into()));
        assert!(child.flags.scroll);
        assert!(child.flags.auto);
        assert!(!child.is_transitioned());
        assert_eq!(child.label(), "hero");
    }
}
