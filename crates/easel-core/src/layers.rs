//! Layer tree builder and drag-reparenting.
//!
//! The layer list shows the scene topmost-first, nested by `parentId`.

use crate::geometry::is_descendant_of;
use crate::scene::{ObjectId, ObjectMeta, SceneObject};
use crate::surface::Surface;
use std::collections::HashMap;

/// One row of the layer tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub object: SceneObject,
    pub selected: bool,
    /// Nesting level, zero for top-level objects.
    pub depth: usize,
    /// Children, topmost first.
    pub children: Vec<LayerNode>,
}

impl LayerNode {
    pub fn id(&self) -> &ObjectId {
        &self.object.id
    }

    /// Depth-first iteration over this node and its descendants.
    pub fn walk(&self) -> Vec<&LayerNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// Build the ordered forest, topmost first.
///
/// Objects whose parent is not live are shown at the top level.
pub fn build_tree(objects: &[SceneObject], selected_ids: &[ObjectId]) -> Vec<LayerNode> {
    let mut children: HashMap<Option<&ObjectId>, Vec<&SceneObject>> = HashMap::new();
    for object in objects.iter().rev() {
        let parent = object
            .parent_id
            .as_ref()
            .filter(|parent| *parent != &object.id && objects.iter().any(|o| &o.id == *parent));
        children.entry(parent).or_default().push(object);
    }
    let mut visiting = Vec::new();
    build_nodes(&children, None, 0, selected_ids, &mut visiting)
}

fn build_nodes<'a>(
    children: &HashMap<Option<&'a ObjectId>, Vec<&'a SceneObject>>,
    parent: Option<&'a ObjectId>,
    depth: usize,
    selected_ids: &[ObjectId],
    visiting: &mut Vec<&'a ObjectId>,
) -> Vec<LayerNode> {
    let Some(objects) = children.get(&parent) else {
        return Vec::new();
    };
    objects
        .iter()
        .filter_map(|object| {
            let object: &'a SceneObject = object;
            // Cyclic parent chains are unreachable from the root; guard anyway.
            if visiting.contains(&&object.id) {
                return None;
            }
            visiting.push(&object.id);
            let nested = build_nodes(children, Some(&object.id), depth + 1, selected_ids, visiting);
            visiting.pop();
            Some(LayerNode {
                object: object.clone(),
                selected: selected_ids.contains(&object.id),
                depth,
                children: nested,
            })
        })
        .collect()
}

/// Flatten a forest into display order.
pub fn flatten(tree: &[LayerNode]) -> Vec<&LayerNode> {
    tree.iter().flat_map(LayerNode::walk).collect()
}

/// Where a dragged row lands relative to the hovered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Inside,
    Below,
}

impl DropPosition {
    /// Top quarter is above, bottom quarter is below, the middle half is inside.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.25 {
            DropPosition::Above
        } else if ratio > 0.75 {
            DropPosition::Below
        } else {
            DropPosition::Inside
        }
    }

    /// Position from the pointer's offset within a row of `row_height`.
    pub fn from_offset(offset_y: f64, row_height: f64) -> Self {
        if row_height <= 0.0 {
            return DropPosition::Inside;
        }
        Self::from_ratio(offset_y / row_height)
    }
}

/// Move `source` next to or into `target` in both z-order and parentage.
///
/// `objects` is the current store view of the surface. Returns false, leaving
/// the surface untouched, when either object is missing, when the drop is onto
/// itself, when dropping inside targets something that is not a frame, or
/// when the new parent would be the source or one of its descendants.
pub fn reparent(
    surface: &mut dyn Surface,
    objects: &[SceneObject],
    source: &ObjectId,
    target: &ObjectId,
    position: DropPosition,
) -> bool {
    if source == target {
        return false;
    }
    let (Some(source_obj), Some(target_obj)) = (
        objects.iter().find(|o| &o.id == source),
        objects.iter().find(|o| &o.id == target),
    ) else {
        return false;
    };
    if position == DropPosition::Inside && !target_obj.is_frame {
        return false;
    }

    let new_parent = match position {
        DropPosition::Inside => Some(target.clone()),
        DropPosition::Above | DropPosition::Below => target_obj.parent_id.clone(),
    };
    if let Some(parent) = &new_parent {
        if parent == source || is_descendant_of(objects, parent, source) {
            log::debug!("Rejected drop of {} under its descendant {}", source, parent);
            return false;
        }
    }

    let Some(mut removed) = surface.remove(source_obj.key) else {
        return false;
    };
    let mut meta = ObjectMeta::from_properties(&removed.properties);
    meta.parent_id = new_parent;
    meta.write_to(&mut removed.properties);

    match surface.index_of(target_obj.key) {
        Some(index) => {
            let index = match position {
                DropPosition::Above | DropPosition::Inside => index + 1,
                DropPosition::Below => index,
            };
            surface.insert_at(index, removed.render, removed.properties);
        }
        None => {
            surface.add(removed.render, removed.properties);
        }
    }
    true
}
