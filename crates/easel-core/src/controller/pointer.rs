//! Tool-gated pointer and wheel handling.

use super::{CanvasController, Gesture, display_zoom};
use crate::input::{PointerInput, WheelInput};
use crate::scene::{ObjectId, ObjectKind, ObjectMeta, next_available_name};
use crate::shapes::{Geometry, RenderObject, SerializableColor, Shape, ShapeStyle, Text};
use crate::surface::{Cursor, Surface, SurfaceKey};
use crate::tools::{ToolKind, drag_rect, seed_shape, settle_size};
use kurbo::Point;

const TEXT_PLACEHOLDER: &str = "Type something";
const TEXT_FONT_SIZE: f64 = 16.0;
const TEXT_PADDING: f64 = 4.0;

/// Text color that stays readable over whatever lies under `point`.
///
/// The topmost non-text object containing the point decides: black over
/// light fills, white over dark ones. Empty canvas is dark, so white.
pub fn contrast_text_color(surface: &dyn Surface, point: Point) -> SerializableColor {
    let fill = surface
        .objects()
        .iter()
        .rev()
        .filter(|o| !o.render.shape.is_text())
        .find(|o| crate::geometry::point_in_bounds(point, o.render.bounds()))
        .and_then(|o| o.render.style.fill);
    match fill {
        Some(color) if color.luminance() > 0.5 => SerializableColor::black(),
        _ => SerializableColor::white(),
    }
}

/// Next free `"{Kind} {n}"` name among live objects of the same kind.
fn next_name(surface: &dyn Surface, kind: ObjectKind) -> String {
    let names: Vec<String> = surface
        .objects()
        .iter()
        .filter_map(|o| {
            let meta = ObjectMeta::from_properties(&o.properties);
            (ObjectKind::of(&o.render.shape, meta.is_frame) == kind).then_some(meta.name?)
        })
        .collect();
    next_available_name(kind.label(), names.iter().map(String::as_str))
}

/// Toggle whether existing objects can be picked by the pointer.
fn set_interactive(surface: &mut dyn Surface, interactive: bool) {
    let keys: Vec<SurfaceKey> = surface.objects().iter().map(|o| o.key).collect();
    for key in keys {
        if let Some(object) = surface.get_mut(key) {
            object.render.selectable = interactive;
            object.render.evented = interactive;
        }
    }
}

impl<S: Surface> CanvasController<S> {
    pub fn pointer_down(&mut self, input: PointerInput) {
        let tool = self.store.active_tool();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        if tool == ToolKind::Hand || self.space_held {
            self.gesture = Gesture::Panning {
                last_point: input.position,
            };
            surface.set_selection_enabled(false);
            surface.set_cursor(Cursor::Grabbing);
            return;
        }

        let point = surface.scene_point(input.position);
        match tool {
            ToolKind::Select => {
                surface.pointer_down(point);
                self.process_events();
                self.record_frame_positions();
            }
            ToolKind::Text => self.create_text(point),
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Frame => {
                self.begin_drawing(tool, point)
            }
            ToolKind::Hand => {}
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let point = surface.scene_point(input.position);
        self.store
            .set_cursor_position(Point::new(point.x.round(), point.y.round()));

        match self.gesture {
            Gesture::Panning { last_point } => {
                surface.relative_pan(input.position - last_point);
                self.gesture = Gesture::Panning {
                    last_point: input.position,
                };
            }
            Gesture::Drawing { start, shape, .. } => {
                if let Some(object) = surface.get_mut(shape) {
                    let rect = drag_rect(start, point);
                    object.render.geometry.set_origin(rect.origin());
                    object.render.set_size(rect.width(), rect.height());
                }
            }
            Gesture::Idle | Gesture::EditingText { .. } => {
                surface.pointer_move(point);
                self.process_events();
            }
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        self.frame_positions.clear();
        let tool = self.store.active_tool();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match self.gesture {
            Gesture::Panning { .. } => {
                self.gesture = Gesture::Idle;
                if tool != ToolKind::Hand {
                    surface.set_selection_enabled(true);
                }
                surface.set_cursor(if self.space_held || tool == ToolKind::Hand {
                    Cursor::Grab
                } else {
                    Cursor::Default
                });
            }
            Gesture::Drawing { shape, tool, .. } => {
                self.gesture = Gesture::Idle;
                self.finish_drawing(shape, tool);
            }
            Gesture::Idle | Gesture::EditingText { .. } => {
                let point = surface.scene_point(input.position);
                surface.pointer_up(point);
                self.process_events();
            }
        }
    }

    /// Plain scroll pans; ctrl/meta scroll (trackpad pinch) zooms about
    /// the pointer.
    pub fn wheel(&mut self, input: WheelInput) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if input.modifiers.command() {
            let zoom = self
                .config
                .clamp_zoom(surface.zoom() * self.config.wheel_zoom_base.powf(input.delta.y));
            surface.zoom_to_point(input.position, zoom);
            self.store.set_zoom(display_zoom(zoom));
        } else {
            surface.relative_pan(-input.delta);
        }
    }

    fn begin_drawing(&mut self, tool: ToolKind, point: Point) {
        let Some(render) = seed_shape(tool, point) else {
            return;
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_selection_enabled(false);
        surface.discard_active();
        set_interactive(surface, false);

        let id = ObjectId::generate();
        let meta = if tool == ToolKind::Frame {
            ObjectMeta::frame(id, next_name(surface, ObjectKind::Frame))
        } else {
            let kind = ObjectKind::of(&render.shape, false);
            ObjectMeta::new(id, next_name(surface, kind))
        };
        let shape = surface.add(render, meta.to_properties());
        self.gesture = Gesture::Drawing {
            start: point,
            shape,
            tool,
        };
        self.process_events();
    }

    fn finish_drawing(&mut self, shape: SurfaceKey, tool: ToolKind) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Some(object) = surface.get_mut(shape) {
            let drawn = object.render.geometry.scaled_size();
            let size = settle_size(tool, drawn, &self.config);
            if size != drawn {
                object.render.geometry.scale_x = 1.0;
                object.render.geometry.scale_y = 1.0;
                object.render.set_size(size.width, size.height);
            }
        }
        set_interactive(surface, true);
        surface.set_selection_enabled(true);
        surface.commit(shape);
        surface.set_active(vec![shape]);
        self.store.set_active_tool(ToolKind::Select);
        self.process_events();
    }

    fn create_text(&mut self, point: Point) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let color = contrast_text_color(surface, point);
        let mut text = Text::new(TEXT_PLACEHOLDER, TEXT_FONT_SIZE);
        text.padding = TEXT_PADDING;
        let size = text.measure();
        let render = RenderObject::new(
            Shape::Text(text),
            Geometry::new(point.x, point.y, size.width, size.height),
            ShapeStyle::text(color),
        );
        let meta = ObjectMeta::new(ObjectId::generate(), next_name(surface, ObjectKind::Text));

        let key = surface.add(render, meta.to_properties());
        surface.set_active(vec![key]);
        surface.enter_text_editing(key);
        surface.select_all_text();
        self.store.set_active_tool(ToolKind::Select);
        self.process_events();
    }

    /// Forward typed characters to the text being edited.
    pub fn type_text(&mut self, typed: &str) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.type_text(typed);
        self.process_events();
    }

    /// Leave inline text editing, committing the edit as one snapshot.
    pub fn exit_text_editing(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.exit_text_editing();
        self.process_events();
    }
}
