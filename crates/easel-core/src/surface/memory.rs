//! Headless in-memory surface.

use super::{
    Cursor, SceneDescription, Surface, SurfaceError, SurfaceEvent, SurfaceKey, SurfaceObject,
};
use crate::BoxFuture;
use crate::controls::{ControlStyle, Corner, Edge, HandleKind};
use crate::labels::FrameLabel;
use crate::shapes::{RenderObject, Shape};
use crate::tools::drag_rect;
use crate::viewport::Viewport;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde_json::{Map, Value};

/// Default drawing area for a new surface.
const DEFAULT_SIZE: Size = Size::new(1280.0, 800.0);

/// A native transform in progress.
#[derive(Debug, Clone, Copy)]
enum NativeGesture {
    /// Positions follow the press offset, so per-tick adjustments made by
    /// the controller (snapping) do not accumulate.
    Move {
        start: Point,
        last: Point,
        moved: bool,
    },
    Scale {
        key: SurfaceKey,
        anchor: Point,
        /// Bounds at press; axes that are locked keep this extent.
        start: Rect,
        scale_x: bool,
        scale_y: bool,
        moved: bool,
    },
    Rotate {
        key: SurfaceKey,
        center: Point,
        start_angle: f64,
        base_angle: f64,
        moved: bool,
    },
    Marquee {
        start: Point,
    },
}

#[derive(Debug, Clone, Copy)]
struct TextEditing {
    key: SurfaceKey,
    /// Character range, start <= end.
    selection: (usize, usize),
}

/// Surface that keeps everything in memory and paints nothing.
///
/// It implements the full interaction contract (selection, drag, corner
/// scaling, rotation zones, marquee, inline text editing), which makes it
/// usable for tests and for hosts that rasterize elsewhere.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    objects: Vec<SurfaceObject>,
    next_key: u64,
    viewport: Viewport,
    size: Size,
    controls: ControlStyle,
    active: Vec<SurfaceKey>,
    selection_enabled: bool,
    cursor: Cursor,
    editing: Option<TextEditing>,
    gesture: Option<NativeGesture>,
    /// Origins of the active objects when a move started.
    drag_origins: Vec<(SurfaceKey, Point)>,
    events: Vec<SurfaceEvent>,
    frames_rendered: u64,
    overlay: Vec<FrameLabel>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::with_controls(ControlStyle::default())
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface decorated with the given control style.
    pub fn with_controls(controls: ControlStyle) -> Self {
        Self {
            objects: Vec::new(),
            next_key: 1,
            viewport: Viewport::new(),
            size: DEFAULT_SIZE,
            controls,
            active: Vec::new(),
            selection_enabled: true,
            cursor: Cursor::Default,
            editing: None,
            gesture: None,
            drag_origins: Vec::new(),
            events: Vec::new(),
            frames_rendered: 0,
            overlay: Vec::new(),
        }
    }

    /// Set the drawing area size in screen pixels.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Use a viewport with custom zoom bounds.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn controls(&self) -> &ControlStyle {
        &self.controls
    }

    /// Number of completed render passes.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Overlay painted by the last render pass.
    pub fn last_overlay(&self) -> &[FrameLabel] {
        &self.overlay
    }

    fn allocate_key(&mut self) -> SurfaceKey {
        let key = SurfaceKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn emit(&mut self, event: SurfaceEvent) {
        self.events.push(event);
    }

    fn handle_hit(&self, point: Point) -> Option<(SurfaceKey, HandleKind)> {
        let [key] = self.active.as_slice() else {
            return None;
        };
        let object = self.get(*key)?;
        if !object.render.selectable {
            return None;
        }
        let geometry = &object.render.geometry;
        self.controls
            .hit_test(geometry.bounds(), geometry.angle, self.viewport.zoom(), point)
            .map(|kind| (*key, kind))
    }

    fn begin_handle_gesture(&mut self, key: SurfaceKey, kind: HandleKind, point: Point) {
        let Some(object) = self.get(key) else {
            return;
        };
        let geometry = object.render.geometry;
        let bounds = geometry.bounds();
        let scale = |anchor: Corner, scale_x: bool, scale_y: bool| NativeGesture::Scale {
            key,
            anchor: anchor.of(bounds),
            start: bounds,
            scale_x,
            scale_y,
            moved: false,
        };
        self.gesture = match kind {
            HandleKind::Corner(corner) => Some(scale(corner.opposite(), true, true)),
            HandleKind::Edge(Edge::Top) => Some(scale(Corner::BottomLeft, false, true)),
            HandleKind::Edge(Edge::Left) => Some(scale(Corner::TopRight, true, false)),
            HandleKind::Edge(Edge::Bottom) => Some(scale(Corner::TopLeft, false, true)),
            HandleKind::Edge(Edge::Right) => Some(scale(Corner::TopLeft, true, false)),
            HandleKind::Rotate | HandleKind::RotationZone(_) => {
                let center = bounds.center();
                Some(NativeGesture::Rotate {
                    key,
                    center,
                    start_angle: (point - center).atan2(),
                    base_angle: geometry.angle,
                    moved: false,
                })
            }
        };
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

impl Surface for MemorySurface {
    fn objects(&self) -> &[SurfaceObject] {
        &self.objects
    }

    fn get_mut(&mut self, key: SurfaceKey) -> Option<&mut SurfaceObject> {
        self.objects.iter_mut().find(|o| o.key == key)
    }

    fn add(&mut self, render: RenderObject, properties: Map<String, Value>) -> SurfaceKey {
        let index = self.objects.len();
        self.insert_at(index, render, properties)
    }

    fn insert_at(
        &mut self,
        index: usize,
        render: RenderObject,
        properties: Map<String, Value>,
    ) -> SurfaceKey {
        let key = self.allocate_key();
        let index = index.min(self.objects.len());
        self.objects.insert(
            index,
            SurfaceObject {
                key,
                render,
                properties,
            },
        );
        self.emit(SurfaceEvent::ObjectAdded(key));
        key
    }

    fn remove(&mut self, key: SurfaceKey) -> Option<SurfaceObject> {
        let index = self.index_of(key)?;
        if self.editing.is_some_and(|e| e.key == key) {
            self.exit_text_editing();
        }
        let removed = self.objects.remove(index);
        self.emit(SurfaceEvent::ObjectRemoved(key));

        if self.active.contains(&key) {
            self.active.retain(|k| *k != key);
            if self.active.is_empty() {
                self.emit(SurfaceEvent::SelectionCleared);
            } else {
                let active = self.active.clone();
                self.emit(SurfaceEvent::SelectionUpdated(active));
            }
        }
        Some(removed)
    }

    fn clear(&mut self) {
        self.exit_text_editing();
        self.discard_active();
        self.gesture = None;
        self.drag_origins.clear();
        for object in std::mem::take(&mut self.objects) {
            self.emit(SurfaceEvent::ObjectRemoved(object.key));
        }
    }

    fn bring_to_front(&mut self, key: SurfaceKey) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let object = self.objects.remove(index);
        self.objects.push(object);
        true
    }

    fn send_to_back(&mut self, key: SurfaceKey) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let object = self.objects.remove(index);
        self.objects.insert(0, object);
        true
    }

    fn commit(&mut self, key: SurfaceKey) {
        if self.index_of(key).is_some() {
            self.emit(SurfaceEvent::ObjectModified(key));
        }
    }

    fn to_json(&self, allowlist: &[&str]) -> Result<String, SurfaceError> {
        SceneDescription::capture(&self.objects, allowlist).to_json()
    }

    fn load_from_json(&mut self, json: &str) -> BoxFuture<'_, Result<(), SurfaceError>> {
        let parsed = SceneDescription::from_json(json);
        Box::pin(async move {
            let scene = parsed?;
            self.clear();
            for object in scene.objects {
                self.add(object.render, object.properties);
            }
            Ok(())
        })
    }

    fn viewport_transform(&self) -> Affine {
        self.viewport.transform()
    }

    fn set_viewport_transform(&mut self, transform: Affine) {
        self.viewport.set_transform(transform);
    }

    fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    fn zoom_to_point(&mut self, pivot: Point, zoom: f64) {
        self.viewport.zoom_to_point(pivot, zoom);
    }

    fn relative_pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    fn size(&self) -> Size {
        self.size
    }

    fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
    }

    fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn active_keys(&self) -> &[SurfaceKey] {
        &self.active
    }

    fn set_active(&mut self, keys: Vec<SurfaceKey>) {
        let mut next: Vec<SurfaceKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if self.index_of(key).is_some() && !next.contains(&key) {
                next.push(key);
            }
        }
        if next.is_empty() {
            self.discard_active();
            return;
        }
        if next == self.active {
            return;
        }
        if self.editing.is_some_and(|e| !next.contains(&e.key)) {
            self.exit_text_editing();
        }
        let was_empty = self.active.is_empty();
        self.active = next.clone();
        if was_empty {
            self.emit(SurfaceEvent::SelectionCreated(next));
        } else {
            self.emit(SurfaceEvent::SelectionUpdated(next));
        }
    }

    fn discard_active(&mut self) {
        self.exit_text_editing();
        if !self.active.is_empty() {
            self.active.clear();
            self.emit(SurfaceEvent::SelectionCleared);
        }
    }

    fn pointer_down(&mut self, point: Point) -> Option<SurfaceKey> {
        if let Some(editing) = self.editing {
            let inside = self
                .get(editing.key)
                .is_some_and(|o| crate::geometry::point_in_bounds(point, o.render.bounds()));
            if inside {
                return Some(editing.key);
            }
            self.exit_text_editing();
        }

        if let Some((key, kind)) = self.handle_hit(point) {
            self.begin_handle_gesture(key, kind, point);
            return Some(key);
        }

        match self.hit_test(point) {
            Some(key) => {
                let selectable = self.get(key).is_some_and(|o| o.render.selectable);
                if selectable {
                    if !self.active.contains(&key) {
                        self.set_active(vec![key]);
                    }
                    self.drag_origins = self
                        .active
                        .iter()
                        .filter_map(|k| self.get(*k).map(|o| (*k, o.render.geometry.origin())))
                        .collect();
                    self.gesture = Some(NativeGesture::Move {
                        start: point,
                        last: point,
                        moved: false,
                    });
                }
                Some(key)
            }
            None => {
                self.discard_active();
                if self.selection_enabled {
                    self.gesture = Some(NativeGesture::Marquee { start: point });
                }
                None
            }
        }
    }

    fn pointer_move(&mut self, point: Point) {
        let Some(gesture) = self.gesture else {
            return;
        };
        match gesture {
            NativeGesture::Move { start, last, .. } => {
                if point == last {
                    return;
                }
                let offset = point - start;
                for (key, origin) in self.drag_origins.clone() {
                    if let Some(object) = self.get_mut(key) {
                        object.render.geometry.set_origin(origin + offset);
                        self.emit(SurfaceEvent::ObjectMoving(key));
                    }
                }
                self.gesture = Some(NativeGesture::Move {
                    start,
                    last: point,
                    moved: true,
                });
            }
            NativeGesture::Scale {
                key,
                anchor,
                start,
                scale_x,
                scale_y,
                ..
            } => {
                if let Some(object) = self.get_mut(key) {
                    let mut rect = drag_rect(anchor, point);
                    if !scale_x {
                        rect.x0 = start.x0;
                        rect.x1 = start.x1;
                    }
                    if !scale_y {
                        rect.y0 = start.y0;
                        rect.y1 = start.y1;
                    }
                    let geometry = &mut object.render.geometry;
                    if geometry.width > 0.0 {
                        geometry.scale_x = rect.width() / geometry.width;
                    }
                    if geometry.height > 0.0 {
                        geometry.scale_y = rect.height() / geometry.height;
                    }
                    geometry.set_origin(rect.origin());
                }
                self.gesture = Some(NativeGesture::Scale {
                    key,
                    anchor,
                    start,
                    scale_x,
                    scale_y,
                    moved: true,
                });
            }
            NativeGesture::Rotate {
                key,
                center,
                start_angle,
                base_angle,
                ..
            } => {
                let sweep = ((point - center).atan2() - start_angle).to_degrees();
                if let Some(object) = self.get_mut(key) {
                    object.render.geometry.angle = (base_angle + sweep).rem_euclid(360.0);
                }
                self.gesture = Some(NativeGesture::Rotate {
                    key,
                    center,
                    start_angle,
                    base_angle,
                    moved: true,
                });
            }
            NativeGesture::Marquee { .. } => {}
        }
    }

    fn pointer_up(&mut self, point: Point) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let dragged = std::mem::take(&mut self.drag_origins);
        match gesture {
            NativeGesture::Move { moved: true, .. } => {
                for (key, _) in dragged {
                    self.emit(SurfaceEvent::ObjectModified(key));
                }
            }
            NativeGesture::Scale {
                key, moved: true, ..
            }
            | NativeGesture::Rotate {
                key, moved: true, ..
            } => self.emit(SurfaceEvent::ObjectModified(key)),
            NativeGesture::Marquee { start } => {
                let area = drag_rect(start, point);
                if area.width() > 0.0 || area.height() > 0.0 {
                    let keys: Vec<SurfaceKey> = self
                        .objects
                        .iter()
                        .filter(|o| o.render.visible && o.render.selectable && o.render.evented)
                        .filter(|o| overlaps(o.render.bounds(), area))
                        .map(|o| o.key)
                        .collect();
                    if !keys.is_empty() {
                        self.set_active(keys);
                    }
                }
            }
            _ => {}
        }
    }

    fn enter_text_editing(&mut self, key: SurfaceKey) -> bool {
        let Some(length) = self.get(key).and_then(|o| match &o.render.shape {
            Shape::Text(text) => Some(text.content.chars().count()),
            _ => None,
        }) else {
            return false;
        };
        if self.editing.is_some_and(|e| e.key == key) {
            return true;
        }
        self.exit_text_editing();
        self.editing = Some(TextEditing {
            key,
            selection: (length, length),
        });
        self.emit(SurfaceEvent::TextEditingEntered(key));
        true
    }

    fn exit_text_editing(&mut self) {
        if let Some(editing) = self.editing.take() {
            self.emit(SurfaceEvent::TextEditingExited(editing.key));
        }
    }

    fn editing_key(&self) -> Option<SurfaceKey> {
        self.editing.map(|e| e.key)
    }

    fn select_all_text(&mut self) {
        let Some(editing) = self.editing else {
            return;
        };
        let length = match self.get(editing.key).map(|o| &o.render.shape) {
            Some(Shape::Text(text)) => text.content.chars().count(),
            _ => return,
        };
        self.editing = Some(TextEditing {
            key: editing.key,
            selection: (0, length),
        });
    }

    fn text_selection(&self) -> Option<(usize, usize)> {
        self.editing.map(|e| e.selection)
    }

    fn type_text(&mut self, typed: &str) {
        let Some(editing) = self.editing else {
            return;
        };
        let Some(object) = self.get_mut(editing.key) else {
            return;
        };
        let Shape::Text(text) = &object.render.shape else {
            return;
        };
        let (start, end) = editing.selection;
        let mut content = text.content.clone();
        let start_byte = byte_offset(&content, start);
        let end_byte = byte_offset(&content, end);
        content.replace_range(start_byte..end_byte, typed);
        object.render.set_text(&content);

        let caret = start + typed.chars().count();
        self.editing = Some(TextEditing {
            key: editing.key,
            selection: (caret, caret),
        });
        self.emit(SurfaceEvent::TextChanged(editing.key));
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn render(&mut self, overlay: &[FrameLabel]) {
        self.frames_rendered += 1;
        self.overlay = overlay.to_vec();
    }
}
