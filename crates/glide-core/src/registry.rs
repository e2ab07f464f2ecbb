//! Discovery of annotated elements and parsing of their declarative config
//!
//! Recognized data attributes (camelCase dataset names):
//!
//! | key | meaning |
//! |---|---|
//! | `scroll` | JSON payload: `in`, `out`, `duration`, `durationIn`, `durationOut`, `loop`, `offset` |
//! | `tracking` | fire the tracking hook once after the first enter |
//! | `transitionAuto` | eligible for the automatic enter animation (default true) |
//! | `transitionCustomOut` | named alternate exit animation |
//! | `transitionForceUpdate` | re-arm the enter animation on every layout pass |
//! | `transitionDelay` | enter delay in seconds |
//! | `scrollSticky` | sticky element |
//! | `scrollStickyParent` / `scrollStickyContent` | element ids bounding the sticky span |
//! | `scrollOffset` | 1:1 tracking margin in px (default 50) |
//! | `scrollHorizontal` | owns a horizontal gap |

use std::collections::HashMap;

use serde::Deserialize;
use slotmap::SlotMap;

use crate::child::{Bounding, Child, ChildConfig, ChildKey, TransitionState};
use crate::gaps::GapMap;
use crate::platform::{ElementHandle, Viewport};
use crate::{Error, Result};

/// JSON payload of the `scroll` attribute
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrollPayload {
    #[serde(rename = "in")]
    enter: Option<String>,
    #[serde(rename = "out")]
    exit: Option<String>,
    duration: Option<f64>,
    duration_in: Option<f64>,
    duration_out: Option<f64>,
    #[serde(rename = "loop", default)]
    looped: bool,
    offset: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoverOptions {
    pub default_scroll_offset: f64,
    /// Register horizontal gaps while scanning
    pub smooth: bool,
}

/// Arena of the children of the active section
///
/// Rebuilt wholesale by `discover`; keys never outlive the scan that issued
/// them. Nothing is removed between scans, so iteration follows document order.
#[derive(Debug, Default)]
pub struct ChildRegistry {
    arena: SlotMap<ChildKey, Child>,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `section` and build a fresh registry
    ///
    /// Resets `gaps` first. Elements with malformed configuration are
    /// skipped with a warning; the rest of the scan continues.
    pub fn discover<V: Viewport>(
        viewport: &V,
        section: ElementHandle,
        gaps: &mut GapMap,
        options: DiscoverOptions,
    ) -> Self {
        gaps.clear();
        let mut registry = Self::new();

        for element in viewport.scroll_elements(section) {
            let child = match parse_child(viewport, section, element, options.default_scroll_offset)
            {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(element = element.raw(), error = %e, "Skipping scroll element");
                    continue;
                }
            };

            let horizontal = child.flags.horizontal_scroll;
            let key = registry.arena.insert(child);

            if options.smooth && horizontal {
                let rect = viewport.bounding_rect(element);
                let bounding = Bounding {
                    top: rect.top.ceil(),
                    height: rect.height.ceil(),
                };
                register_gap(viewport, gaps, &mut registry.arena[key], key, bounding);
            }
        }

        tracing::debug!(children = registry.len(), gaps = gaps.len(), "Discovered scroll children");
        registry
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
    }

    pub fn get(&self, key: ChildKey) -> Option<&Child> {
        self.arena.get(key)
    }

    pub fn get_mut(&mut self, key: ChildKey) -> Option<&mut Child> {
        self.arena.get_mut(key)
    }

    /// Key of the child with element id `id`
    pub fn find(&self, id: &str) -> Option<ChildKey> {
        self.arena
            .iter()
            .find(|(_, child)| child.id.as_deref() == Some(id))
            .map(|(key, _)| key)
    }

    pub fn keys(&self) -> Vec<ChildKey> {
        self.arena.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChildKey, &Child)> {
        self.arena.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ChildKey, &mut Child)> {
        self.arena.iter_mut()
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, child: Child) -> ChildKey {
        self.arena.insert(child)
    }
}

/// Measure a child's track and register its horizontal gap
///
/// A rejected range leaves the child with vertical-only behaviour.
pub(crate) fn register_gap<V: Viewport>(
    viewport: &V,
    gaps: &mut GapMap,
    child: &mut Child,
    key: ChildKey,
    bounding: Bounding,
) {
    child.horizontal = None;
    let Some(track) = child.horizontal_track else {
        tracing::warn!(child = child.label(), "Horizontal scroll element has no track");
        return;
    };

    let width = viewport.bounding_rect(track).width;
    match gaps.register(key, child.id.clone(), track, bounding, width, viewport.window_size()) {
        Ok(range) => child.horizontal = Some(range),
        Err(e) => tracing::warn!(child = child.label(), error = %e, "Horizontal gap rejected"),
    }
}

/// Build a child record from an element's attributes
pub fn parse_child<V: Viewport>(
    viewport: &V,
    section: ElementHandle,
    element: ElementHandle,
    default_scroll_offset: f64,
) -> Result<Child> {
    let id = viewport.element_id(element);
    let attrs = viewport.attributes(element);
    let label = id.clone().unwrap_or_else(|| format!("#{}", element.raw()));

    let payload: ScrollPayload = match attrs.get("scroll").map(|s| s.trim()) {
        None | Some("") => ScrollPayload::default(),
        Some(json) => serde_json::from_str(json)?,
    };

    let mut child = Child::new(element, id);
    child.transition = TransitionState::Idle;
    child.config = ChildConfig {
        enter: payload.enter,
        exit: payload.exit,
        custom_exit: non_empty(&attrs, "transitionCustomOut"),
        duration: payload.duration,
        duration_in: payload.duration_in,
        duration_out: payload.duration_out,
        looped: payload.looped,
        offset: payload.offset,
        force_update: flag(&attrs, &label, "transitionForceUpdate", false)?,
        delay: number(&attrs, &label, "transitionDelay")?.unwrap_or(0.0),
    };

    child.flags.tracking = flag(&attrs, &label, "tracking", false)?;
    child.flags.auto = flag(&attrs, &label, "transitionAuto", true)?;
    child.flags.sticky = flag(&attrs, &label, "scrollSticky", false)?;
    child.flags.horizontal_scroll = flag(&attrs, &label, "scrollHorizontal", false)?;
    child.scroll_offset = number(&attrs, &label, "scrollOffset")?
        .filter(|v| *v != 0.0)
        .unwrap_or(default_scroll_offset);

    if child.flags.sticky {
        child.sticky_parent = reference(viewport, section, &attrs, "scrollStickyParent");
        child.sticky_content = reference(viewport, section, &attrs, "scrollStickyContent");
        if child.sticky_parent.is_none() || child.sticky_content.is_none() {
            tracing::warn!(child = %label, "Sticky element without resolvable parent/content, not sticky");
            child.flags.sticky = false;
        }
    }

    if child.flags.horizontal_scroll {
        child.horizontal_track = viewport.horizontal_track(element);
    }

    Ok(child)
}

fn non_empty(attrs: &HashMap<String, String>, key: &str) -> Option<String> {
    attrs
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Presence flags: a bare attribute (`data-scroll-sticky`) means true
fn flag(attrs: &HashMap<String, String>, label: &str, key: &str, default: bool) -> Result<bool> {
    match attrs.get(key).map(|v| v.trim()) {
        None => Ok(default),
        Some("") | Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(invalid(label, key, other)),
    }
}

fn number(attrs: &HashMap<String, String>, label: &str, key: &str) -> Result<Option<f64>> {
    match attrs.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(label, key, raw)),
    }
}

fn reference<V: Viewport>(
    viewport: &V,
    section: ElementHandle,
    attrs: &HashMap<String, String>,
    key: &str,
) -> Option<ElementHandle> {
    non_empty(attrs, key).and_then(|id| viewport.element_by_id(section, &id))
}

fn invalid(label: &str, key: &str, value: &str) -> Error {
    Error::InvalidAttribute {
        element: label.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{ElementSpec, HeadlessPage, PageSpec};

    fn page(elements: Vec<ElementSpec>) -> HeadlessPage {
        HeadlessPage::from_spec(PageSpec {
            width: 1000.0,
            height: 800.0,
            content_height: None,
            elements,
        })
    }

    fn options() -> DiscoverOptions {
        DiscoverOptions {
            default_scroll_offset: 50.0,
            smooth: true,
        }
    }

    #[test]
    fn test_discover_parses_payload_and_defaults() {
        let page = page(vec![
            ElementSpec::new("hero", 0.0, 800.0)
                .data("scroll", r#"{"in":"fade","out":"fade","duration":0.6,"loop":true,"offset":0.25}"#)
                .data("tracking", ""),
            ElementSpec::new("plain", 800.0, 600.0).data("scroll", ""),
        ]);
        let mut gaps = GapMap::new();
        let registry = ChildRegistry::discover(&page, page.section(), &mut gaps, options());

        assert_eq!(registry.len(), 2);
        let hero = registry.get(registry.find("hero").unwrap()).unwrap();
        assert_eq!(hero.config.enter.as_deref(), Some("fade"));
        assert_eq!(hero.config.duration, Some(0.6));
        assert!(hero.config.looped);
        assert_eq!(hero.config.offset, Some(0.25));
        assert!(hero.flags.tracking);
        assert!(hero.flags.auto);
        assert_eq!(hero.scroll_offset, 50.0);

        let plain = registry.get(registry.find("plain").unwrap()).unwrap();
        assert!(plain.config.enter.is_none());
        assert!(!plain.flags.tracking);
    }

    #[test]
    fn test_malformed_payload_skips_only_that_element() {
        let page = page(vec![
            ElementSpec::new("broken", 0.0, 800.0).data("scroll", "{in: fade"),
            ElementSpec::new("fine", 800.0, 600.0).data("scroll", r#"{"in":"fade"}"#),
        ]);
        let mut gaps = GapMap::new();
        let registry = ChildRegistry::discover(&page, page.section(), &mut gaps, options());

        assert_eq!(registry.len(), 1);
        assert!(registry.find("broken").is_none());
        assert!(registry.find("fine").is_some());
    }

    #[test]
    fn test_invalid_attribute_values_are_rejected() {
        let page = page(vec![ElementSpec::new("bad", 0.0, 100.0)
            .data("scroll", "")
            .data("scrollOffset", "lots")]);
        let err = parse_child(&page, page.section(), page.element("bad").unwrap(), 50.0).unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { ref key, .. } if key == "scrollOffset"));
    }

    #[test]
    fn test_transition_auto_and_custom_out() {
        let page = page(vec![ElementSpec::new("manual", 0.0, 100.0)
            .data("scroll", "")
            .data("transitionAuto", "false")
            .data("transitionCustomOut", "fade")
            .data("scrollOffset", "120")]);
        let child = parse_child(&page, page.section(), page.element("manual").unwrap(), 50.0).unwrap();
        assert!(!child.flags.auto);
        assert_eq!(child.config.custom_exit.as_deref(), Some("fade"));
        assert_eq!(child.scroll_offset, 120.0);
    }

    #[test]
    fn test_sticky_without_references_is_demoted() {
        let page = page(vec![ElementSpec::new("pin", 0.0, 100.0)
            .data("scroll", "")
            .data("scrollSticky", "")
            .data("scrollStickyParent", "nowhere")]);
        let child = parse_child(&page, page.section(), page.element("pin").unwrap(), 50.0).unwrap();
        assert!(!child.flags.sticky);
    }

    #[test]
    fn test_discover_registers_horizontal_gap_and_resets_old_ones() {
        let page = page(vec![ElementSpec::new("reel", 2000.0, 800.0)
            .data("scroll", "")
            .data("scrollHorizontal", "")
            .track(3000.0)]);
        let mut gaps = GapMap::new();
        let registry = ChildRegistry::discover(&page, page.section(), &mut gaps, options());
        assert_eq!(gaps.len(), 1);

        let reel = registry.get(registry.find("reel").unwrap()).unwrap();
        let range = reel.horizontal.unwrap();
        assert_eq!(range.from, 2000.0);
        assert_eq!(range.to, 4000.0);

        let again = ChildRegistry::discover(&page, page.section(), &mut gaps, options());
        assert_eq!(again.len(), 1);
        assert_eq!(gaps.len(), 1);
    }
}
