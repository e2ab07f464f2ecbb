//! In-memory document: a section, its content wrapper and absolutely laid
//! out elements

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::platform::{ElementHandle, Rect, Size, Transform, Viewport};
use crate::Result;

const SECTION: usize = 0;
const CONTENT: usize = 1;

/// Page description, usually loaded from TOML
///
/// ```toml
/// width = 1280
/// height = 800
///
/// [[element]]
/// id = "hero"
/// top = 0
/// height = 800
/// data = { scroll = '{"in":"fade"}' }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    /// Window width
    pub width: f64,
    /// Window height
    pub height: f64,
    /// Content height; defaults to the bottom of the lowest element
    #[serde(default)]
    pub content_height: Option<f64>,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    /// Document offset of the element's top edge
    pub top: f64,
    pub height: f64,
    /// Defaults to the window width
    #[serde(default)]
    pub width: Option<f64>,
    /// Data attributes by camelCase dataset name
    #[serde(default)]
    pub data: HashMap<String, String>,
    /// Width of the inner horizontal track, if the element has one
    #[serde(default)]
    pub track_width: Option<f64>,
}

impl ElementSpec {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
            width: None,
            data: HashMap::new(),
            track_width: None,
        }
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn track(mut self, width: f64) -> Self {
        self.track_width = Some(width);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    id: Option<String>,
    parent: Option<usize>,
    top: f64,
    width: f64,
    height: f64,
    data: HashMap<String, String>,
    is_track: bool,
    transform: Option<Transform>,
    fixed_height: Option<f64>,
}

impl Node {
    fn new(parent: Option<usize>, top: f64, width: f64, height: f64) -> Self {
        Self {
            id: None,
            parent,
            top,
            width,
            height,
            data: HashMap::new(),
            is_track: false,
            transform: None,
            fixed_height: None,
        }
    }
}

/// `Viewport` over a static layout
///
/// Element geometry never reflows; only the native scroll offset, transforms
/// and fixed heights change what `bounding_rect` reports.
#[derive(Debug, Clone)]
pub struct HeadlessPage {
    window: Size,
    nodes: Vec<Node>,
    content_height: f64,
    scroll_y: f64,
    locked: bool,
    listening: bool,
    detached: bool,
}

impl HeadlessPage {
    pub fn from_spec(spec: PageSpec) -> Self {
        let content_height = spec.content_height.unwrap_or_else(|| {
            spec.elements
                .iter()
                .map(|e| e.top + e.height)
                .fold(0.0, f64::max)
        });

        let mut nodes = vec![
            Node::new(None, 0.0, spec.width, spec.height),
            Node::new(Some(SECTION), 0.0, spec.width, content_height),
        ];

        for element in spec.elements {
            let index = nodes.len();
            let mut node = Node::new(
                Some(CONTENT),
                element.top,
                element.width.unwrap_or(spec.width),
                element.height,
            );
            node.id = Some(element.id);
            node.data = element.data;
            nodes.push(node);

            if let Some(track_width) = element.track_width {
                let mut track = Node::new(Some(index), element.top, track_width, element.height);
                track.is_track = true;
                nodes.push(track);
            }
        }

        Self {
            window: Size::new(spec.width, spec.height),
            nodes,
            content_height,
            scroll_y: 0.0,
            locked: false,
            listening: false,
            detached: false,
        }
    }

    /// A page on which `find_section` finds nothing
    pub fn without_section(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let spec: PageSpec = toml::from_str(content)?;
        Ok(Self::from_spec(spec))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn section(&self) -> ElementHandle {
        handle(SECTION)
    }

    pub fn content(&self) -> ElementHandle {
        handle(CONTENT)
    }

    /// Element with id `id`, anywhere on the page
    pub fn element(&self, id: &str) -> Option<ElementHandle> {
        self.nodes
            .iter()
            .position(|node| node.id.as_deref() == Some(id))
            .map(handle)
    }

    /// Resize the window
    pub fn set_window(&mut self, width: f64, height: f64) {
        self.window = Size::new(width, height);
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    pub fn transform_of(&self, element: ElementHandle) -> Option<Transform> {
        self.node(element).and_then(|node| node.transform)
    }

    pub fn height_of(&self, element: ElementHandle) -> Option<f64> {
        self.node(element).and_then(|node| node.fixed_height)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    fn node(&self, element: ElementHandle) -> Option<&Node> {
        self.nodes.get(element.raw() as usize)
    }

    fn node_mut(&mut self, element: ElementHandle) -> Option<&mut Node> {
        self.nodes.get_mut(element.raw() as usize)
    }

    fn max_scroll(&self) -> f64 {
        if self.locked {
            return 0.0;
        }
        let document = self.nodes[SECTION]
            .fixed_height
            .unwrap_or(self.content_height);
        (document - self.window.height).max(0.0)
    }
}

fn handle(index: usize) -> ElementHandle {
    ElementHandle::new(index as u64)
}

impl Viewport for HeadlessPage {
    fn window_size(&self) -> Size {
        self.window
    }

    fn scroll_position(&self) -> f64 {
        self.scroll_y
    }

    fn set_scroll_position(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    fn find_section(&self) -> Option<ElementHandle> {
        (!self.detached).then(|| self.section())
    }

    fn scroll_elements(&self, section: ElementHandle) -> Vec<ElementHandle> {
        if section.raw() as usize != SECTION {
            return Vec::new();
        }
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_track && node.data.contains_key("scroll"))
            .map(|(index, _)| handle(index))
            .collect()
    }

    fn element_by_id(&self, section: ElementHandle, id: &str) -> Option<ElementHandle> {
        if section.raw() as usize != SECTION {
            return None;
        }
        self.element(id)
    }

    fn element_id(&self, element: ElementHandle) -> Option<String> {
        self.node(element).and_then(|node| node.id.clone())
    }

    fn attributes(&self, element: ElementHandle) -> HashMap<String, String> {
        self.node(element)
            .map(|node| node.data.clone())
            .unwrap_or_default()
    }

    fn bounding_rect(&self, element: ElementHandle) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::default();
        };

        let mut top = node.top - self.scroll_y;
        let mut left = 0.0;
        let mut cursor = Some(element.raw() as usize);
        while let Some(index) = cursor {
            let current = &self.nodes[index];
            if let Some(t) = current.transform {
                top += t.y;
                left += t.x;
            }
            cursor = current.parent;
        }

        Rect::new(top, left, node.width, node.fixed_height.unwrap_or(node.height))
    }

    fn transform(&self, element: ElementHandle) -> Option<Transform> {
        self.transform_of(element)
    }

    fn set_transform(&mut self, element: ElementHandle, transform: Option<Transform>) {
        if let Some(node) = self.node_mut(element) {
            node.transform = transform;
        }
    }

    fn horizontal_track(&self, element: ElementHandle) -> Option<ElementHandle> {
        let parent = element.raw() as usize;
        self.nodes
            .iter()
            .position(|node| node.is_track && node.parent == Some(parent))
            .map(handle)
    }

    fn content_rect(&self, section: ElementHandle) -> Rect {
        if section.raw() as usize != SECTION {
            return Rect::default();
        }
        self.bounding_rect(self.content())
    }

    fn set_scroll_locked(&mut self, _section: ElementHandle, locked: bool) {
        self.locked = locked;
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    fn set_height(&mut self, element: ElementHandle, height: Option<f64>) {
        if let Some(node) = self.node_mut(element) {
            node.fixed_height = height;
        }
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    fn page_exit_target(&self, section: ElementHandle) -> Option<ElementHandle> {
        (section.raw() as usize == SECTION).then(|| self.content())
    }

    fn listen(&mut self, attached: bool) {
        self.listening = attached;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> HeadlessPage {
        HeadlessPage::from_spec(PageSpec {
            width: 1000.0,
            height: 800.0,
            content_height: None,
            elements: vec![
                ElementSpec::new("a", 0.0, 900.0).data("scroll", ""),
                ElementSpec::new("parent", 900.0, 1200.0),
                ElementSpec::new("reel", 2100.0, 800.0)
                    .data("scroll", "")
                    .track(2500.0),
            ],
        })
    }

    #[test]
    fn test_scroll_elements_skip_unannotated() {
        let page = page();
        let found: Vec<_> = page
            .scroll_elements(page.section())
            .into_iter()
            .filter_map(|el| page.element_id(el))
            .collect();
        assert_eq!(found, ["a", "reel"]);
    }

    #[test]
    fn test_bounding_rect_follows_scroll_and_transforms() {
        let mut page = page();
        let reel = page.element("reel").unwrap();
        let track = page.horizontal_track(reel).unwrap();

        page.set_scroll_position(100.0);
        assert_eq!(page.bounding_rect(reel).top, 2000.0);

        page.set_transform(reel, Some(Transform::lift(300.0)));
        assert_eq!(page.bounding_rect(reel).top, 1700.0);
        // The track inherits its element's translation
        page.set_transform(track, Some(Transform::slide(50.0)));
        let rect = page.bounding_rect(track);
        assert_eq!(rect.top, 1700.0);
        assert_eq!(rect.left, -50.0);
        assert_eq!(rect.width, 2500.0);
    }

    #[test]
    fn test_native_scroll_is_clamped_and_locked() {
        let mut page = page();
        // content bottom is 2900
        page.set_scroll_position(5000.0);
        assert_eq!(page.scroll_position(), 2100.0);

        page.set_scroll_locked(page.section(), true);
        assert_eq!(page.scroll_position(), 0.0);
        page.set_scroll_position(300.0);
        assert_eq!(page.scroll_position(), 0.0);
    }

    #[test]
    fn test_from_toml() {
        let page = HeadlessPage::from_toml(
            r#"
            width = 1280
            height = 720
            content_height = 4000

            [[element]]
            id = "hero"
            top = 0
            height = 720
            data = { scroll = '{"in":"fade"}', tracking = "" }
            "#,
        )
        .unwrap();

        assert_eq!(page.window_size(), Size::new(1280.0, 720.0));
        assert_eq!(page.content_rect(page.section()).height, 4000.0);
        let hero = page.element("hero").unwrap();
        assert_eq!(page.attributes(hero).get("tracking").map(String::as_str), Some(""));
    }
}
