//! Geometry refresh: page size, child boxes, sticky spans and gap ranges

use crate::child::{Bounding, StickyBounding, TransitionState};
use crate::geometry;
use crate::platform::{AnimationEngine, ElementHandle, EventBus, PageSize, Viewport};
use crate::registry;
use crate::scroller::Scroller;

impl<V, A, E> Scroller<V, A, E>
where
    V: Viewport,
    A: AnimationEngine,
    E: EventBus,
{
    /// Re-measure the page and every child
    ///
    /// In Smooth mode child transforms are lifted while measuring so boxes are
    /// read at their layout position, and horizontal gaps are rebuilt from the
    /// fresh boxes.
    pub(crate) fn update(&mut self) {
        let Some(section) = self.section else {
            return;
        };
        self.update_size(section);

        let smooth = self.state.mode().is_smooth();
        let current = self.state.current();
        self.gaps.clear();
        if smooth {
            self.lift_transforms();
        }

        let probe = geometry::Probe {
            current,
            horizontal: self.horizontal,
            window_height: self.window.height,
        };

        for key in self.children.keys() {
            let Some(child) = self.children.get_mut(key) else {
                continue;
            };

            let rect = self.viewport.bounding_rect(child.element);
            let top = if smooth { rect.top } else { rect.top + current };
            child.bounding = Bounding {
                top: top.ceil(),
                height: rect.height.ceil(),
            };
            child.in_view = rect.height != 0.0 && geometry::in_view(child.bounding, probe);
            child.in_offset = child.in_view
                && child.config.enter.is_some()
                && geometry::in_offset(child.bounding, child.config.offset, probe);

            if child.flags.sticky {
                if let Some(sticky) =
                    sticky_bounding(&self.viewport, child.sticky_parent, child.sticky_content)
                {
                    child.sticky_bounding = if smooth {
                        sticky
                    } else {
                        StickyBounding {
                            top: sticky.top + current,
                            bottom: sticky.bottom + current,
                            height: sticky.height,
                        }
                    };
                }
            }

            if child.config.looped && child.is_transitioned() && !child.in_view {
                self.transitions.reset(&mut self.engine, child);
            }
            if child.config.force_update {
                child.transition = TransitionState::Idle;
            }

            if smooth && child.flags.horizontal_scroll {
                let bounding = child.bounding;
                registry::register_gap(&self.viewport, &mut self.gaps, child, key, bounding);
            }
        }

        if smooth {
            self.restore_transforms();
        }
        self.horizontal = self.gaps.horizontal_offset(current);

        tracing::debug!(
            children = self.children.len(),
            gaps = self.gaps.len(),
            bound = self.state.bound(),
            "Layout updated"
        );
    }

    /// Refresh window/content size, the scroll bound and the mobile flag
    pub(crate) fn update_size(&mut self, section: ElementHandle) {
        self.window = self.viewport.window_size();
        let content = self.viewport.content_rect(section);

        self.state.set_bound(content.height - self.window.height);
        self.size = PageSize {
            w: content.width.floor(),
            h: content.height.floor(),
            screen_w: self.window.width,
            screen_h: self.window.height,
        };
        self.mobile = self.size.screen_w <= self.config.scroll.mobile_breakpoint;
    }

    /// Remove child transforms, remembering them for `restore_transforms`
    fn lift_transforms(&mut self) {
        for (_, child) in self.children.iter_mut() {
            if child.flags.scroll {
                child.transform_backup = self.viewport.transform(child.element);
                self.viewport.set_transform(child.element, None);
            }
        }
    }

    fn restore_transforms(&mut self) {
        for (_, child) in self.children.iter_mut() {
            if child.flags.scroll {
                self.viewport
                    .set_transform(child.element, child.transform_backup.take());
            }
        }
    }
}

fn sticky_bounding<V: Viewport>(
    viewport: &V,
    parent: Option<ElementHandle>,
    content: Option<ElementHandle>,
) -> Option<StickyBounding> {
    let parent = viewport.bounding_rect(parent?);
    let content = viewport.bounding_rect(content?);
    Some(StickyBounding {
        top: parent.top,
        bottom: parent.bottom(),
        height: content.height,
    })
}
