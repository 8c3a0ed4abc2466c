//! In-memory rendered scene
//!
//! A [`GraphicDocument`] is what the external diagram renderer hands over: a
//! tree of tagged elements with ids, classes and attributes. It implements
//! [`SceneRenderer`] by toggling the three emphasis classes, the same way a
//! browser host would flip `classList` entries on SVG nodes.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::core::{
    ElementId, ElementKind, EmphasisClasses, EmphasisState, Result, SceneRenderer, Selector,
    WalkthroughError,
};

/// One element of the rendered scene
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicElement {
    pub tag: String,
    pub id: Option<String>,
    pub kind: ElementKind,
    classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    parent: Option<ElementId>,
}

impl GraphicElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// A node element: `<g class="node" id="...">`
    pub fn node(id: impl Into<String>) -> Self {
        Self::new("g")
            .with_id(id)
            .with_kind(ElementKind::Node)
            .with_class("node")
    }

    /// A connector element: `<path class="edgePath" id="...">`
    pub fn connector(id: impl Into<String>) -> Self {
        Self::new("path")
            .with_id(id)
            .with_kind(ElementKind::Connector)
            .with_class("edgePath")
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !class.is_empty() && !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Attribute lookup; `id` and `class` read the dedicated fields
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => self.id.as_deref().map(Cow::Borrowed),
            "class" if !self.classes.is_empty() => Some(Cow::Owned(self.classes.join(" "))),
            "class" => None,
            _ => self.attributes.get(name).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

/// The rendered graphic document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicDocument {
    elements: Vec<GraphicElement>,
    classes: EmphasisClasses,
}

impl GraphicDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom emphasis class names
    ///
    /// Empty or colliding names are rejected.
    pub fn with_classes(mut self, classes: EmphasisClasses) -> Result<Self> {
        classes.validate()?;
        self.classes = classes;
        Ok(self)
    }

    pub fn classes(&self) -> &EmphasisClasses {
        &self.classes
    }

    /// Append an element under `parent` (or at the root) and return its handle
    ///
    /// A parent handle that does not exist yet attaches the element at the root.
    pub fn append(&mut self, parent: Option<ElementId>, mut element: GraphicElement) -> ElementId {
        let id = ElementId(self.elements.len());
        element.parent = parent.filter(|p| p.0 < self.elements.len());
        self.elements.push(element);
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&GraphicElement> {
        self.elements.get(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut GraphicElement> {
        self.elements.get_mut(id.0)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &GraphicElement)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId(index), element))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Handle of the first element with the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.elements()
            .find(|(_, element)| element.id.as_deref() == Some(id))
            .map(|(handle, _)| handle)
    }

    /// All elements matching a parsed selector, in document order
    pub fn select(&self, selector: &Selector) -> Vec<ElementId> {
        self.elements()
            .map(|(handle, _)| handle)
            .filter(|handle| selector.matches(self, *handle))
            .collect()
    }

    /// Parse `pattern` and select; an empty result is not an error here
    pub fn query(&self, pattern: &str) -> Result<Vec<ElementId>> {
        let selector = Selector::parse(pattern)?;
        let matches = self.select(&selector);
        trace!(pattern, matches = matches.len(), "Selector evaluated");
        Ok(matches)
    }

    pub fn emphasis_state(&self, id: ElementId) -> Option<EmphasisState> {
        let element = self.element(id)?;
        let emphasized = element.has_class(&self.classes.emphasized);
        let dimmed = element.has_class(&self.classes.de_emphasized);
        Some(match (emphasized, dimmed) {
            (true, false) => EmphasisState::Emphasized,
            (false, true) => EmphasisState::DeEmphasized,
            (false, false) => EmphasisState::Unstyled,
            (true, true) => EmphasisState::Conflicting,
        })
    }

    pub fn is_pulsing(&self, id: ElementId) -> bool {
        self.element(id)
            .is_some_and(|element| element.has_class(&self.classes.pulse))
    }

    /// Load a scene from its JSON form
    ///
    /// ```json
    /// { "classes": { "emphasized": "lit" },
    ///   "elements": [ { "tag": "svg", "children": [
    ///       { "tag": "g", "id": "A", "kind": "node", "classes": ["node"] } ] } ] }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let scene: SceneFile = serde_json::from_str(json)?;
        if scene.elements.is_empty() {
            return Err(WalkthroughError::config_error("scene contains no elements"));
        }
        let mut document = Self::new().with_classes(scene.classes)?;
        for element in scene.elements {
            document.append_scene(None, element);
        }
        debug!(elements = document.len(), "Scene loaded");
        Ok(document)
    }

    fn append_scene(&mut self, parent: Option<ElementId>, scene: SceneElement) {
        let mut element = GraphicElement::new(scene.tag).with_kind(scene.kind);
        element.id = scene.id;
        for class in &scene.classes {
            element.add_class(class);
        }
        element.attributes = scene.attributes;
        let handle = self.append(parent, element);
        for child in scene.children {
            self.append_scene(Some(handle), child);
        }
    }

    fn restyle(&mut self, ids: &[ElementId], apply: impl Fn(&EmphasisClasses, &mut GraphicElement)) {
        for id in ids {
            if let Some(element) = self.elements.get_mut(id.0) {
                apply(&self.classes, element);
            }
        }
    }
}

impl SceneRenderer for GraphicDocument {
    type Element = ElementId;

    fn graphic_elements(&self) -> Vec<ElementId> {
        self.elements()
            .filter(|(_, element)| element.kind.is_graphic())
            .map(|(handle, _)| handle)
            .collect()
    }

    fn styled_elements(&self) -> Vec<ElementId> {
        let marked = |element: &GraphicElement| {
            element.kind.is_graphic()
                || element.has_class(&self.classes.emphasized)
                || element.has_class(&self.classes.de_emphasized)
                || element.has_class(&self.classes.pulse)
        };
        self.elements()
            .filter(|(_, element)| marked(element))
            .map(|(handle, _)| handle)
            .collect()
    }

    fn resolve(&self, pattern: &str) -> Result<Vec<ElementId>> {
        let matches = self.query(pattern)?;
        if matches.is_empty() {
            return Err(WalkthroughError::no_matches(pattern));
        }
        Ok(matches)
    }

    fn clear_emphasis(&mut self, elements: &[ElementId]) {
        self.restyle(elements, |classes, element| {
            element.remove_class(&classes.emphasized);
            element.remove_class(&classes.de_emphasized);
            element.remove_class(&classes.pulse);
        });
    }

    fn de_emphasize(&mut self, elements: &[ElementId]) {
        self.restyle(elements, |classes, element| {
            element.remove_class(&classes.emphasized);
            element.add_class(&classes.de_emphasized);
        });
    }

    fn emphasize(&mut self, elements: &[ElementId]) {
        self.restyle(elements, |classes, element| {
            element.remove_class(&classes.de_emphasized);
            element.add_class(&classes.emphasized);
        });
    }

    fn pulse(&mut self, elements: &[ElementId]) {
        self.restyle(elements, |classes, element| {
            element.add_class(&classes.pulse);
        });
    }
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    classes: EmphasisClasses,
    elements: Vec<SceneElement>,
}

#[derive(Debug, Deserialize)]
struct SceneElement {
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    kind: ElementKind,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<SceneElement>,
}
