//! Containment engine: bounds tests and frame/child relations.
//!
//! Bounds are axis-aligned and ignore rotation.

use crate::scene::{ObjectId, SceneObject};
use kurbo::{Point, Rect};
use std::collections::HashSet;

/// Inclusive axis-aligned containment test.
pub fn point_in_bounds(point: Point, bounds: Rect) -> bool {
    point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
}

/// The topmost frame (other than `target` itself) whose bounds contain
/// the center of `target`.
pub fn find_containing_frame(objects: &[SceneObject], target: &SceneObject) -> Option<ObjectId> {
    let center = target.bounds.center();
    objects
        .iter()
        .rev()
        .filter(|o| o.is_frame && o.id != target.id)
        .find(|frame| point_in_bounds(center, frame.bounds))
        .map(|frame| frame.id.clone())
}

/// Whether `ancestor` appears on the parent chain of `candidate`.
///
/// An object is not its own descendant. The walk stops on a repeated id,
/// so malformed chains cannot loop forever.
pub fn is_descendant_of(
    objects: &[SceneObject],
    candidate: &ObjectId,
    ancestor: &ObjectId,
) -> bool {
    let mut visited = HashSet::new();
    let mut current = objects
        .iter()
        .find(|o| &o.id == candidate)
        .and_then(|o| o.parent_id.as_ref());
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        if !visited.insert(parent) {
            return false;
        }
        current = objects
            .iter()
            .find(|o| &o.id == parent)
            .and_then(|o| o.parent_id.as_ref());
    }
    false
}

/// Every object whose parent chain leads to `root`, depth-first in z-order.
pub fn collect_descendants(objects: &[SceneObject], root: &ObjectId) -> Vec<ObjectId> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(root.clone());
    collect_into(objects, root, &mut visited, &mut out);
    out
}

fn collect_into(
    objects: &[SceneObject],
    parent: &ObjectId,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<ObjectId>,
) {
    for child in objects.iter().filter(|o| o.parent_id.as_ref() == Some(parent)) {
        if visited.insert(child.id.clone()) {
            out.push(child.id.clone());
            collect_into(objects, &child.id, visited, out);
        }
    }
}
