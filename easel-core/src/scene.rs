//! Scene container holding the root-level drawable elements.

use std::collections::HashMap;

use crate::{CanvasError, CanvasResult, Element, ElementId, ElementKind, InstanceId};

/// A scene containing all elements of one renderer instance.
///
/// Elements are stored flat and indexed by id; groups refer to their
/// children by id. Root order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// All elements in the scene, indexed by ID.
    elements: HashMap<ElementId, Element>,
    /// Root-level element IDs (not children of any group).
    root_elements: Vec<ElementId>,
    disposed: bool,
}

impl Scene {
    /// Create a new empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element as a root.
    ///
    /// Adding an id that is already a root replaces the stored element
    /// without duplicating it in the root list. An id that was a group child
    /// moves out of its old group.
    pub fn add_root(&mut self, mut element: Element) -> ElementId {
        let id = element.id;
        self.unlink_from_parent(id);
        element.parent = None;
        if !self.root_elements.contains(&id) {
            self.root_elements.push(id);
        }
        self.elements.insert(id, element);
        id
    }

    /// Add an element as the last child of a group.
    ///
    /// The child inherits the owner of its parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent does not exist, is not a group, or lies
    /// inside the subtree of the element being added.
    pub fn add_child(&mut self, parent: ElementId, mut element: Element) -> CanvasResult<ElementId> {
        let id = element.id;
        if self.elements.contains_key(&id) && self.subtree_ids(id).contains(&parent) {
            return Err(CanvasError::InvalidOperation(format!(
                "element {id} cannot be added under its own subtree"
            )));
        }
        let Some(parent_el) = self.elements.get(&parent) else {
            return Err(CanvasError::ElementNotFound(parent.to_string()));
        };
        if !parent_el.is_group() {
            return Err(CanvasError::InvalidOperation(format!(
                "element {parent} is not a group"
            )));
        }
        if self.get_element(id).and_then(|el| el.parent) != Some(parent) {
            self.unlink_from_parent(id);
        }
        self.root_elements.retain(|&eid| eid != id);
        let parent_el = self
            .elements
            .get_mut(&parent)
            .ok_or_else(|| CanvasError::ElementNotFound(parent.to_string()))?;
        let owner = parent_el.owner();
        if let ElementKind::Group { children } = &mut parent_el.kind {
            if !children.contains(&id) {
                children.push(id);
            }
        }
        element.parent = Some(parent);
        match owner {
            Some(owner) => element.attach(owner),
            None => element.detach(),
        }
        self.elements.insert(id, element);
        Ok(id)
    }

    /// Remove a root and its whole subtree.
    ///
    /// Returns the removed elements, root first. Ids that are not roots
    /// yield an empty list.
    pub fn remove_root(&mut self, id: ElementId) -> Vec<Element> {
        let Some(pos) = self.root_elements.iter().position(|&eid| eid == id) else {
            return Vec::new();
        };
        self.root_elements.remove(pos);
        self.subtree_ids(id)
            .into_iter()
            .filter_map(|eid| self.elements.remove(&eid))
            .collect()
    }

    /// Remove every root in one operation.
    ///
    /// Returns the removed elements in paint traversal order.
    pub fn remove_all_roots(&mut self) -> Vec<Element> {
        let ids = self.traversal_ids();
        let removed = ids
            .into_iter()
            .filter_map(|eid| self.elements.remove(&eid))
            .collect();
        self.elements.clear();
        self.root_elements.clear();
        removed
    }

    /// Ids of `id` and all its descendants, depth first.
    #[must_use]
    pub fn subtree_ids(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(el) = self.elements.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(el.children().iter().rev().copied());
        }
        out
    }

    /// Attach `id` and its descendants to a renderer instance.
    pub fn attach_subtree(&mut self, id: ElementId, owner: InstanceId) {
        for eid in self.subtree_ids(id) {
            if let Some(el) = self.elements.get_mut(&eid) {
                el.attach(owner);
            }
        }
    }

    /// Detach `id` and its descendants from their renderer instance.
    ///
    /// Returns the ids that were visited.
    pub fn detach_subtree(&mut self, id: ElementId) -> Vec<ElementId> {
        let ids = self.subtree_ids(id);
        for eid in &ids {
            if let Some(el) = self.elements.get_mut(eid) {
                el.detach();
            }
        }
        ids
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Get all elements in the scene.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Get root-level elements (not children of groups).
    pub fn root_elements(&self) -> impl Iterator<Item = &Element> {
        self.root_elements
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    /// Root ids in insertion order.
    #[must_use]
    pub fn root_ids(&self) -> &[ElementId] {
        &self.root_elements
    }

    /// Paintable (non-group) elements sorted by layer then z-index.
    ///
    /// Ties keep tree traversal order, so later siblings paint on top.
    #[must_use]
    pub fn display_list(&self) -> Vec<&Element> {
        let mut list: Vec<&Element> = self
            .traversal_ids()
            .into_iter()
            .filter_map(|id| self.elements.get(&id))
            .filter(|el| !el.is_group())
            .collect();
        list.sort_by_key(|el| (el.transform.z_level, el.transform.z_index));
        list
    }

    /// Find the topmost interactive element containing the point.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<ElementId> {
        self.element_near(x, y, 0.0)
    }

    /// Find the topmost interactive element whose bounds, grown by `radius`,
    /// contain the point.
    #[must_use]
    pub fn element_near(&self, x: f32, y: f32, radius: f32) -> Option<ElementId> {
        self.display_list()
            .into_iter()
            .rev()
            .find(|el| el.interactive && el.bounds().expanded(radius).contains(x, y))
            .map(|el| el.id)
    }

    /// Set the hover flag of an element. Returns false if it does not exist.
    pub fn set_hovered(&mut self, id: ElementId, hovered: bool) -> bool {
        match self.elements.get_mut(&id) {
            Some(el) => {
                el.hovered = hovered;
                true
            }
            None => false,
        }
    }

    /// Elements currently flagged as hovered, in paint order.
    #[must_use]
    pub fn hovered_elements(&self) -> Vec<&Element> {
        self.display_list()
            .into_iter()
            .filter(|el| el.hovered)
            .collect()
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Release all elements. The scene stays usable but empty.
    pub fn dispose(&mut self) {
        self.elements.clear();
        self.root_elements.clear();
        self.disposed = true;
    }

    /// Whether [`Scene::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Remove `id` from the children of the group currently holding it.
    fn unlink_from_parent(&mut self, id: ElementId) {
        let Some(old_parent) = self.elements.get(&id).and_then(|el| el.parent) else {
            return;
        };
        if let Some(ElementKind::Group { children }) =
            self.elements.get_mut(&old_parent).map(|el| &mut el.kind)
        {
            children.retain(|&child| child != id);
        }
    }

    fn traversal_ids(&self) -> Vec<ElementId> {
        self.root_elements
            .iter()
            .flat_map(|&root| self.subtree_ids(root))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transform;
    use proptest::prelude::*;

    fn text(content: &str) -> Element {
        Element::new(ElementKind::Text {
            content: content.to_string(),
            font_size: 16.0,
            color: "#000000".to_string(),
        })
    }

    #[test]
    fn promoting_a_child_to_root_unlinks_it() {
        let mut scene = Scene::new();
        let group = scene.add_root(Element::group());
        let child = scene.add_child(group, text("child")).expect("group exists");
        let moved = scene.get_element(child).cloned().expect("child");

        scene.add_root(moved);
        assert!(scene.get_element(group).expect("group").children().is_empty());
        assert_eq!(scene.root_ids(), &[group, child]);
        assert_eq!(scene.display_list().len(), 1);

        let removed = scene.remove_root(group);
        assert_eq!(removed.len(), 1);
        assert!(scene.get_element(child).is_some());
    }

    #[test]
    fn moving_between_groups_and_cycles() {
        let mut scene = Scene::new();
        let a = scene.add_root(Element::group());
        let b = scene.add_root(Element::group());
        let leaf = scene.add_child(a, text("leaf")).expect("a exists");

        let leaf_el = scene.get_element(leaf).cloned().expect("leaf");
        scene.add_child(b, leaf_el).expect("b exists");
        assert!(scene.get_element(a).expect("a").children().is_empty());
        assert_eq!(scene.get_element(b).expect("b").children(), &[leaf]);

        // A root group re-added under a group leaves the root list.
        let a_el = scene.get_element(a).cloned().expect("a");
        scene.add_child(b, a_el).expect("b exists");
        assert_eq!(scene.root_ids(), &[b]);

        let b_el = scene.get_element(b).cloned().expect("b");
        assert!(scene.add_child(a, b_el).is_err());
        assert_eq!(scene.display_list().len(), 1);
        assert_eq!(scene.subtree_ids(b), vec![b, leaf, a]);
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());

        let id = scene.add_root(text("Hello"));

        assert_eq!(scene.element_count(), 1);
        assert!(scene.get_element(id).is_some());

        let removed = scene.remove_root(id);
        assert_eq!(removed.len(), 1);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_remove_unknown_root_is_noop() {
        let mut scene = Scene::new();
        scene.add_root(text("a"));
        assert!(scene.remove_root(ElementId::new()).is_empty());
        assert_eq!(scene.element_count(), 1);
    }

    #[test]
    fn test_add_root_twice_is_idempotent() {
        let mut scene = Scene::new();
        let el = text("a");
        scene.add_root(el.clone());
        scene.add_root(el);
        assert_eq!(scene.root_ids().len(), 1);
    }

    #[test]
    fn test_group_subtree_removed_with_root() {
        let mut scene = Scene::new();
        let group = scene.add_root(Element::group());
        let child = scene.add_child(group, text("child")).expect("group exists");
        let inner = scene.add_child(group, Element::group()).expect("group exists");
        let leaf = scene.add_child(inner, text("leaf")).expect("group exists");

        assert_eq!(scene.subtree_ids(group), vec![group, child, inner, leaf]);

        let removed = scene.remove_root(group);
        assert_eq!(removed.len(), 4);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_add_child_rejects_non_group() {
        let mut scene = Scene::new();
        let parent = scene.add_root(text("not a group"));
        let err = scene.add_child(parent, text("child"));
        assert!(matches!(err, Err(CanvasError::InvalidOperation(_))));
    }

    #[test]
    fn test_children_inherit_owner_and_detach_recursively() {
        let mut scene = Scene::new();
        let owner = InstanceId::next();
        let group = scene.add_root(Element::group());
        scene.attach_subtree(group, owner);
        let child = scene.add_child(group, text("c")).expect("group exists");
        assert_eq!(scene.get_element(child).and_then(Element::owner), Some(owner));

        let visited = scene.detach_subtree(group);
        assert_eq!(visited.len(), 2);
        assert!(scene.elements().all(|el| el.owner().is_none()));
    }

    #[test]
    fn test_element_at() {
        let mut scene = Scene::new();

        let element = text("Test").with_transform(Transform {
            x: 100.0,
            y: 100.0,
            width: 200.0,
            height: 50.0,
            ..Transform::default()
        });

        scene.add_root(element);

        // Point inside element
        assert!(scene.element_at(150.0, 125.0).is_some());

        // Point outside element
        assert!(scene.element_at(50.0, 50.0).is_none());
        // ...but within a coarse pointer radius
        assert!(scene.element_near(90.0, 95.0, 22.0).is_some());
    }

    #[test]
    fn test_element_at_prefers_topmost() {
        let mut scene = Scene::new();
        let mut low = Element::rect(0.0, 0.0, 100.0, 100.0);
        low.transform.z_index = 1;
        let high = Element::rect(0.0, 0.0, 100.0, 100.0).with_transform(Transform {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            z_level: 1,
            ..Transform::default()
        });
        let low_id = scene.add_root(low);
        let high_id = scene.add_root(high);
        assert_eq!(scene.element_at(50.0, 50.0), Some(high_id));

        scene.get_element_mut(high_id).expect("exists").interactive = false;
        assert_eq!(scene.element_at(50.0, 50.0), Some(low_id));
    }

    #[test]
    fn test_dispose_clears_and_flags() {
        let mut scene = Scene::new();
        scene.add_root(text("a"));
        scene.dispose();
        assert!(scene.is_empty());
        assert!(scene.is_disposed());
    }

    proptest! {
        #[test]
        fn roots_equal_added_minus_removed(ops in proptest::collection::vec((any::<bool>(), 0usize..8), 0..40)) {
            let pool: Vec<Element> = (0..8).map(|i| text(&i.to_string())).collect();
            let mut scene = Scene::new();
            let mut expected: Vec<ElementId> = Vec::new();

            for (add, idx) in ops {
                let el = &pool[idx];
                if add {
                    scene.add_root(el.clone());
                    if !expected.contains(&el.id) {
                        expected.push(el.id);
                    }
                } else {
                    scene.remove_root(el.id);
                    expected.retain(|id| *id != el.id);
                }
            }

            prop_assert_eq!(scene.root_ids(), expected.as_slice());
        }
    }
}
