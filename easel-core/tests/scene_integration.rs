//! Scene and Background Integration Tests
//!
//! Tests the scene container together with the pieces that read it:
//! - Group ownership and subtree removal
//! - Paint order across layers
//! - Coarse hit testing
//! - Background values loaded from JSON and dark-mode classification

use easel_core::{
    is_dark_background, Background, Element, ElementKind, InstanceId, Scene, Transform,
};

/// Rectangle on a given layer.
fn layered_rect(x: f32, z_level: i32, z_index: i32) -> Element {
    Element::rect(x, 0.0, 10.0, 10.0).with_transform(Transform {
        x,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        rotation: 0.0,
        z_index,
        z_level,
    })
}

// ==========================================================================
// Ownership
// ==========================================================================

#[test]
fn nested_groups_inherit_owner_and_detach_together() {
    let owner = InstanceId::next();
    let mut scene = Scene::new();
    let outer = scene.add_root(Element::group());
    scene.attach_subtree(outer, owner);

    let inner = scene.add_child(outer, Element::group()).expect("outer is a group");
    let leaf = scene
        .add_child(inner, Element::rect(0.0, 0.0, 1.0, 1.0))
        .expect("inner is a group");

    assert_eq!(scene.get_element(leaf).and_then(Element::owner), Some(owner));
    assert_eq!(scene.get_element(leaf).and_then(|el| el.parent), Some(inner));

    let visited = scene.detach_subtree(outer);
    assert_eq!(visited, vec![outer, inner, leaf]);
    assert!(scene.elements().all(|el| el.owner().is_none()));
}

#[test]
fn adding_to_a_leaf_fails() {
    let mut scene = Scene::new();
    let leaf = scene.add_root(Element::rect(0.0, 0.0, 1.0, 1.0));
    assert!(scene.add_child(leaf, Element::group()).is_err());
}

#[test]
fn removing_a_root_takes_its_subtree() {
    let mut scene = Scene::new();
    let group = scene.add_root(Element::group());
    scene
        .add_child(group, Element::rect(0.0, 0.0, 1.0, 1.0))
        .expect("group");
    let other = scene.add_root(Element::rect(5.0, 5.0, 1.0, 1.0));

    let removed = scene.remove_root(group);
    assert_eq!(removed.len(), 2);
    assert_eq!(removed[0].id, group);
    assert_eq!(scene.root_ids(), &[other]);
    assert_eq!(scene.element_count(), 1);
}

// ==========================================================================
// Paint order and hit testing
// ==========================================================================

#[test]
fn display_list_orders_by_layer_then_index() {
    let mut scene = Scene::new();
    let top = scene.add_root(layered_rect(0.0, 1, 0));
    let low = scene.add_root(layered_rect(0.0, 0, 5));
    let lowest = scene.add_root(layered_rect(0.0, 0, -1));

    let order: Vec<_> = scene.display_list().iter().map(|el| el.id).collect();
    assert_eq!(order, vec![lowest, low, top]);
    assert_eq!(scene.element_at(5.0, 5.0), Some(top));
}

#[test]
fn coarse_hit_testing_reaches_nearby_elements() {
    let mut scene = Scene::new();
    let id = scene.add_root(Element::rect(100.0, 100.0, 10.0, 10.0));
    assert_eq!(scene.element_at(95.0, 105.0), None);
    assert_eq!(scene.element_near(95.0, 105.0, 22.0), Some(id));
}

// ==========================================================================
// Backgrounds
// ==========================================================================

#[test]
fn backgrounds_from_json() {
    let flat: Background = serde_json::from_str(r##""#1a1a1a""##).expect("color");
    assert!(is_dark_background(Some(&flat)));

    let gradient: Background = serde_json::from_str(
        r##"{
            "kind": {"type": "linear", "x": 0, "y": 0, "x2": 0, "y2": 1},
            "stops": [
                {"offset": 0.0, "color": "#000000"},
                {"offset": 0.9, "color": "#000000"},
                {"offset": 1.0, "color": "#ffffff"}
            ]
        }"##,
    )
    .expect("gradient");
    assert!(matches!(gradient, Background::Gradient(_)));
    assert!(is_dark_background(Some(&gradient)));

    let pattern: Background =
        serde_json::from_str(r#"{"image": "tile.png", "repeat": "repeat-x"}"#).expect("pattern");
    assert!(matches!(pattern, Background::Pattern(_)));
    assert!(!is_dark_background(Some(&pattern)));
}

#[test]
fn text_elements_round_trip_through_json() {
    let text = Element::new(ElementKind::Text {
        content: "Hello".to_string(),
        font_size: 14.0,
        color: "#333333".to_string(),
    });
    let json = serde_json::to_string(&text).expect("serialize");
    let back: Element = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.id, text.id);
    assert_eq!(back.kind, text.kind);
    assert!(back.owner().is_none());
}
