//! End-to-end editing scenarios driven through the canvas controller.

use easel_core::layers::{DropPosition, build_tree};
use easel_core::scene::{ObjectId, ObjectMeta};
use easel_core::shapes::{Geometry, Rectangle, RenderObject, SerializableColor, Shape, ShapeStyle};
use easel_core::storage::MemoryDocumentStore;
use easel_core::surface::{MemorySurface, Surface};
use easel_core::{
    CanvasController, EditorConfig, Modifiers, PointerInput, PropertyUpdate, ToolKind, WheelInput,
};
use kurbo::{Point, Rect, Size, Vec2};
use pollster::block_on;
use std::sync::Arc;

type Controller = CanvasController<MemorySurface>;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn controller() -> Controller {
    init_logger();
    let mut controller = CanvasController::new(
        "doc",
        MemorySurface::new().with_size(Size::new(1280.0, 800.0)),
        Arc::new(MemoryDocumentStore::new()),
        EditorConfig::default(),
    );
    block_on(controller.restore());
    controller
}

fn add(controller: &mut Controller, bounds: Rect, meta: ObjectMeta, fill: SerializableColor) {
    let style = ShapeStyle {
        fill: Some(fill),
        ..ShapeStyle::default()
    };
    let render = RenderObject::new(
        Shape::Rectangle(Rectangle::default()),
        Geometry::new(bounds.x0, bounds.y0, bounds.width(), bounds.height()),
        style,
    );
    controller
        .surface_mut()
        .unwrap()
        .add(render, meta.to_properties());
    controller.process_events();
}

fn add_rect(controller: &mut Controller, id: &str, bounds: Rect, parent: Option<&str>) {
    let meta = ObjectMeta {
        parent_id: parent.map(ObjectId::from),
        ..ObjectMeta::new(ObjectId::from(id), id)
    };
    add(controller, bounds, meta, SerializableColor::rgb(0xd9, 0xd9, 0xd9));
}

fn add_frame(controller: &mut Controller, id: &str, bounds: Rect, parent: Option<&str>) {
    let meta = ObjectMeta {
        parent_id: parent.map(ObjectId::from),
        ..ObjectMeta::frame(ObjectId::from(id), id)
    };
    add(controller, bounds, meta, SerializableColor::white());
}

fn click(controller: &mut Controller, x: f64, y: f64) {
    controller.pointer_down(PointerInput::at(x, y));
    controller.pointer_up(PointerInput::at(x, y));
}

fn draw(controller: &mut Controller, tool: ToolKind, from: Point, to: Point) {
    controller.set_tool(tool);
    controller.pointer_down(PointerInput::at(from.x, from.y));
    controller.pointer_move(PointerInput::at(to.x, to.y));
    controller.pointer_up(PointerInput::at(to.x, to.y));
}

fn scene(controller: &Controller) -> Vec<(ObjectId, Rect)> {
    controller
        .store()
        .objects()
        .iter()
        .map(|o| (o.id.clone(), o.bounds))
        .collect()
}

fn bounds_of(controller: &Controller, id: &str) -> Rect {
    controller
        .store()
        .object(&ObjectId::from(id))
        .map(|o| o.bounds)
        .unwrap()
}

fn frame_names(controller: &Controller) -> Vec<String> {
    controller
        .store()
        .objects()
        .iter()
        .filter(|o| o.is_frame)
        .map(|o| o.name.clone())
        .collect()
}

#[test]
fn new_frames_take_smallest_free_number() {
    let mut controller = controller();
    controller.set_tool(ToolKind::Frame);
    click(&mut controller, 0.0, 0.0);
    controller.set_tool(ToolKind::Frame);
    click(&mut controller, 500.0, 0.0);
    assert_eq!(frame_names(&controller), vec!["Frame 1", "Frame 2"]);

    let first = controller.store().objects()[0].id.clone();
    controller.delete_object(&first);
    controller.set_tool(ToolKind::Frame);
    click(&mut controller, 1000.0, 0.0);
    assert_eq!(frame_names(&controller), vec!["Frame 2", "Frame 1"]);
}

#[test]
fn moved_objects_join_and_leave_frames() {
    let mut controller = controller();
    add_frame(&mut controller, "frame", Rect::new(0.0, 0.0, 200.0, 200.0), None);
    add_rect(&mut controller, "box", Rect::new(300.0, 300.0, 340.0, 340.0), None);

    // Drag the box so its center lands on (100, 100).
    controller.pointer_down(PointerInput::at(320.0, 320.0));
    controller.pointer_move(PointerInput::at(100.0, 100.0));
    controller.pointer_up(PointerInput::at(100.0, 100.0));
    let object = controller.store().object(&ObjectId::from("box")).unwrap();
    assert_eq!(object.bounds.center(), Point::new(100.0, 100.0));
    assert_eq!(object.parent_id, Some(ObjectId::from("frame")));

    controller.pointer_down(PointerInput::at(100.0, 100.0));
    controller.pointer_move(PointerInput::at(400.0, 100.0));
    controller.pointer_up(PointerInput::at(400.0, 100.0));
    let object = controller.store().object(&ObjectId::from("box")).unwrap();
    assert_eq!(object.parent_id, None);
}

#[test]
fn dragging_a_frame_carries_nested_children() {
    let mut controller = controller();
    add_frame(&mut controller, "outer", Rect::new(0.0, 0.0, 300.0, 300.0), None);
    add_rect(&mut controller, "child", Rect::new(40.0, 40.0, 60.0, 60.0), Some("outer"));
    add_frame(&mut controller, "inner", Rect::new(150.0, 150.0, 250.0, 250.0), Some("outer"));
    add_rect(&mut controller, "grandchild", Rect::new(170.0, 170.0, 190.0, 190.0), Some("inner"));
    add_rect(&mut controller, "unrelated", Rect::new(500.0, 500.0, 520.0, 520.0), None);

    controller.pointer_down(PointerInput::at(10.0, 10.0));
    controller.pointer_move(PointerInput::at(30.0, 20.0));
    controller.pointer_move(PointerInput::at(40.0, 30.0));
    controller.pointer_up(PointerInput::at(40.0, 30.0));

    assert_eq!(bounds_of(&controller, "outer"), Rect::new(30.0, 20.0, 330.0, 320.0));
    assert_eq!(bounds_of(&controller, "child"), Rect::new(70.0, 60.0, 90.0, 80.0));
    assert_eq!(bounds_of(&controller, "inner"), Rect::new(180.0, 170.0, 280.0, 270.0));
    assert_eq!(bounds_of(&controller, "grandchild"), Rect::new(200.0, 190.0, 220.0, 210.0));
    assert_eq!(bounds_of(&controller, "unrelated"), Rect::new(500.0, 500.0, 520.0, 520.0));
}

#[test]
fn undo_and_redo_round_trip() {
    let mut controller = controller();
    let before = scene(&controller);

    add_rect(&mut controller, "a", Rect::new(0.0, 0.0, 50.0, 50.0), None);
    add_rect(&mut controller, "b", Rect::new(100.0, 0.0, 150.0, 50.0), None);
    controller.select_object(&ObjectId::from("a"));
    assert!(controller.update_property(PropertyUpdate::X(200.0)));
    let after = scene(&controller);

    for _ in 0..3 {
        assert!(block_on(controller.undo()));
    }
    assert_eq!(scene(&controller), before);
    assert!(!block_on(controller.undo()));

    for _ in 0..3 {
        assert!(block_on(controller.redo()));
    }
    assert_eq!(scene(&controller), after);
    assert!(!block_on(controller.redo()));
}

#[test]
fn history_keeps_the_newest_fifty_snapshots() {
    let mut controller = controller();
    for i in 0..60 {
        let x = i as f64 * 10.0;
        add_rect(&mut controller, &format!("r{i}"), Rect::new(x, 0.0, x + 5.0, 5.0), None);
    }
    assert_eq!(controller.history().len(), 50);
    assert_eq!(controller.history().cursor(), 49);

    // The oldest retained snapshot holds 11 objects.
    while block_on(controller.undo()) {}
    assert_eq!(controller.store().objects().len(), 11);
}

#[test]
fn deleting_a_frame_promotes_its_children() {
    let mut controller = controller();
    add_frame(&mut controller, "frame", Rect::new(0.0, 0.0, 200.0, 200.0), None);
    add_rect(&mut controller, "a", Rect::new(10.0, 10.0, 30.0, 30.0), Some("frame"));
    add_rect(&mut controller, "b", Rect::new(50.0, 50.0, 70.0, 70.0), Some("frame"));
    let entries = controller.history().len();

    controller.delete_object(&ObjectId::from("frame"));

    let objects = controller.store().objects();
    assert_eq!(objects.len(), 2);
    assert!(objects.iter().all(|o| o.parent_id.is_none()));
    assert_eq!(controller.history().len(), entries + 1);
}

#[test]
fn dropping_a_frame_into_its_descendant_is_rejected() {
    let mut controller = controller();
    add_frame(&mut controller, "a", Rect::new(0.0, 0.0, 300.0, 300.0), None);
    add_frame(&mut controller, "b", Rect::new(50.0, 50.0, 150.0, 150.0), Some("a"));
    let before = scene(&controller);
    let entries = controller.history().len();

    assert!(!controller.reparent(&ObjectId::from("a"), &ObjectId::from("b"), DropPosition::Inside));
    assert_eq!(scene(&controller), before);
    assert_eq!(
        controller.store().object(&ObjectId::from("a")).unwrap().parent_id,
        None
    );
    assert_eq!(controller.history().len(), entries);
}

#[test]
fn dropping_a_frame_beside_its_descendant_is_rejected() {
    let mut controller = controller();
    add_frame(&mut controller, "a", Rect::new(0.0, 0.0, 300.0, 300.0), None);
    add_frame(&mut controller, "b", Rect::new(50.0, 50.0, 150.0, 150.0), Some("a"));
    add_rect(&mut controller, "c", Rect::new(60.0, 60.0, 80.0, 80.0), Some("b"));
    let before = scene(&controller);
    let entries = controller.history().len();

    let a = ObjectId::from("a");
    assert!(!controller.reparent(&a, &ObjectId::from("c"), DropPosition::Below));
    assert!(!controller.reparent(&a, &ObjectId::from("b"), DropPosition::Above));
    assert_eq!(scene(&controller), before);
    assert_eq!(controller.store().object(&a).unwrap().parent_id, None);
    assert_eq!(controller.history().len(), entries);

    let rows = build_tree(controller.store().objects(), &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].walk().len(), 3);
}

#[test]
fn cutting_a_frame_promotes_its_children() {
    let mut controller = controller();
    add_frame(&mut controller, "frame", Rect::new(0.0, 0.0, 200.0, 200.0), None);
    add_rect(&mut controller, "child", Rect::new(10.0, 10.0, 30.0, 30.0), Some("frame"));

    controller.select_object(&ObjectId::from("frame"));
    assert_eq!(controller.cut(), 1);
    let child = controller.store().object(&ObjectId::from("child")).unwrap();
    assert_eq!(child.parent_id, None);
}

#[test]
fn pasted_children_follow_their_pasted_frame() {
    let mut controller = controller();
    add_frame(&mut controller, "frame", Rect::new(0.0, 0.0, 200.0, 200.0), None);
    add_rect(&mut controller, "child", Rect::new(10.0, 10.0, 30.0, 30.0), Some("frame"));

    let keys = controller.store().objects().iter().map(|o| o.key).collect();
    controller.surface_mut().unwrap().set_active(keys);
    controller.process_events();
    assert_eq!(controller.cut(), 2);

    let pasted = controller.paste();
    assert_eq!(pasted.len(), 2);
    let child = controller.store().object(&pasted[1]).unwrap();
    assert_eq!(child.parent_id.as_ref(), Some(&pasted[0]));
}

#[test]
fn scrolling_pans_and_pinching_zooms_about_the_pointer() {
    let mut controller = controller();
    controller.wheel(WheelInput {
        position: Point::new(200.0, 100.0),
        delta: Vec2::new(30.0, 40.0),
        modifiers: Modifiers::NONE,
    });
    let surface = controller.surface().unwrap();
    assert_eq!(surface.viewport_transform().translation(), Vec2::new(-30.0, -40.0));
    assert!((surface.zoom() - 1.0).abs() < 1e-9);

    let pivot = Point::new(200.0, 100.0);
    let anchored = controller.surface().unwrap().scene_point(pivot);
    let pinch = |dy: f64| WheelInput {
        position: pivot,
        delta: Vec2::new(0.0, dy),
        modifiers: Modifiers::with_command(),
    };
    controller.wheel(pinch(-100.0));
    let surface = controller.surface().unwrap();
    let expected = 0.977_f64.powf(-100.0);
    assert!((surface.zoom() - expected).abs() < 1e-9);
    assert_eq!(controller.store().zoom(), 10.25);
    assert!((surface.scene_point(pivot) - anchored).hypot() < 1e-9);

    controller.wheel(pinch(-100.0));
    assert_eq!(controller.surface().unwrap().zoom(), 20.0);
    assert_eq!(controller.store().zoom(), 20.0);

    for _ in 0..4 {
        controller.wheel(pinch(500.0));
    }
    assert_eq!(controller.surface().unwrap().zoom(), 0.1);
    assert_eq!(controller.store().zoom(), 0.1);
}

#[test]
fn dragging_with_snap_lands_on_the_grid() {
    let mut controller = controller();
    add_rect(&mut controller, "box", Rect::new(0.0, 0.0, 40.0, 40.0), None);
    controller.toggle_snap();
    assert!(controller.snap_mode().is_enabled());

    controller.pointer_down(PointerInput::at(20.0, 20.0));
    controller.pointer_move(PointerInput::at(33.0, 37.0));
    controller.pointer_up(PointerInput::at(33.0, 37.0));
    assert_eq!(bounds_of(&controller, "box").origin(), Point::new(10.0, 20.0));
}

fn text_content(controller: &Controller) -> Option<String> {
    controller
        .surface()
        .and_then(|s| s.objects().last())
        .and_then(|o| match &o.render.shape {
            Shape::Text(text) => Some(text.content.clone()),
            _ => None,
        })
}

#[test]
fn typing_commits_one_snapshot_on_exit() {
    let mut controller = controller();
    controller.set_tool(ToolKind::Text);
    controller.pointer_down(PointerInput::at(100.0, 100.0));
    assert!(controller.is_editing_text());
    let entries = controller.history().len();

    for typed in ["H", "e", "l", "l", "o"] {
        controller.type_text(typed);
    }
    assert_eq!(controller.history().len(), entries);
    assert_eq!(text_content(&controller).as_deref(), Some("Hello"));

    controller.exit_text_editing();
    assert!(!controller.is_editing_text());
    assert_eq!(controller.history().len(), entries + 1);

    assert!(block_on(controller.undo()));
    assert_eq!(text_content(&controller).as_deref(), Some("Type something"));
}

#[test]
fn click_creates_default_sized_shapes() {
    let mut controller = controller();
    draw(&mut controller, ToolKind::Rectangle, Point::new(10.0, 10.0), Point::new(11.0, 11.0));
    let rect = controller.store().objects()[0].bounds;
    assert_eq!(rect.size(), Size::new(100.0, 100.0));
    assert_eq!(controller.store().active_tool(), ToolKind::Select);

    draw(&mut controller, ToolKind::Frame, Point::new(500.0, 0.0), Point::new(500.5, 1.0));
    let frame = controller.store().objects()[1].bounds;
    assert_eq!(frame.size(), Size::new(375.0, 667.0));

    draw(&mut controller, ToolKind::Ellipse, Point::new(0.0, 800.0), Point::new(60.0, 840.0));
    let ellipse = controller.store().objects()[2].bounds;
    assert_eq!(ellipse, Rect::new(0.0, 800.0, 60.0, 840.0));
}

#[test]
fn drawing_a_shape_is_one_undo_step() {
    let mut controller = controller();
    let entries = controller.history().len();
    draw(&mut controller, ToolKind::Rectangle, Point::new(0.0, 0.0), Point::new(80.0, 40.0));
    assert_eq!(controller.history().len(), entries + 1);

    assert!(block_on(controller.undo()));
    assert!(controller.store().objects().is_empty());
}

fn text_fill_at(controller: &mut Controller, x: f64, y: f64) -> Option<SerializableColor> {
    controller.set_tool(ToolKind::Text);
    controller.pointer_down(PointerInput::at(x, y));
    let fill = controller
        .surface()
        .and_then(|s| s.objects().last())
        .and_then(|o| o.render.style.fill);
    controller.exit_text_editing();
    fill
}

#[test]
fn text_color_contrasts_with_background() {
    let mut controller = controller();
    let dark = ObjectMeta::new(ObjectId::from("dark"), "dark");
    add(&mut controller, Rect::new(0.0, 0.0, 100.0, 100.0), dark, SerializableColor::black());
    let light = ObjectMeta::new(ObjectId::from("light"), "light");
    add(&mut controller, Rect::new(200.0, 0.0, 300.0, 100.0), light, SerializableColor::white());

    assert_eq!(text_fill_at(&mut controller, 50.0, 50.0), Some(SerializableColor::white()));
    assert_eq!(text_fill_at(&mut controller, 250.0, 50.0), Some(SerializableColor::black()));
    assert_eq!(text_fill_at(&mut controller, 600.0, 600.0), Some(SerializableColor::white()));

    let names: Vec<&str> = controller
        .store()
        .objects()
        .iter()
        .skip(2)
        .map(|o| o.name.as_str())
        .collect();
    assert_eq!(names, vec!["Text 1", "Text 2", "Text 3"]);
}
