//! SVG export: one element per visible object.

use crate::{ExportError, ExportResult, visible_bounds};
use easel_core::shapes::{RenderObject, SerializableColor, Shape, ShapeStyle, Text, TextAlign};
use std::fmt::Write;

/// Render visible objects, bottom-first, into a standalone SVG document
/// whose view box is the union of their bounds.
pub fn render_svg(
    objects: &[&RenderObject],
    background: Option<SerializableColor>,
) -> ExportResult<String> {
    let bounds = visible_bounds(objects.iter().copied()).ok_or(ExportError::EmptyScene)?;
    let (width, height) = (bounds.width(), bounds.height());

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{} {} {width} {height}\">",
        bounds.x0, bounds.y0
    );
    if let Some(color) = background {
        let _ = writeln!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\"{}/>",
            bounds.x0,
            bounds.y0,
            paint("fill", Some(color))
        );
    }
    for object in objects.iter().filter(|o| o.visible) {
        write_object(&mut svg, object);
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn write_object(out: &mut String, object: &RenderObject) {
    let geometry = &object.geometry;
    let [a, b, c, d, e, f] = geometry.transform().as_coeffs();
    let transform = format!(" transform=\"matrix({a} {b} {c} {d} {e} {f})\"");
    let (w, h) = (geometry.width, geometry.height);

    match &object.shape {
        Shape::Rectangle(rectangle) => {
            let radius = rectangle.as_rounded_rect(geometry).radii().top_left;
            let corners = if radius > 0.0 {
                format!(" rx=\"{radius}\" ry=\"{radius}\"")
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "<rect width=\"{w}\" height=\"{h}\"{corners}{}{transform}/>",
                shape_style(&object.style)
            );
        }
        Shape::Ellipse(_) => {
            let _ = writeln!(
                out,
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"{}{transform}/>",
                w / 2.0,
                h / 2.0,
                w / 2.0,
                h / 2.0,
                shape_style(&object.style)
            );
        }
        Shape::Text(text) => write_text(out, text, object, &transform),
    }
}

fn write_text(out: &mut String, text: &Text, object: &RenderObject, transform: &str) {
    let width = object.geometry.width;
    let (x, anchor) = match text.text_align {
        TextAlign::Left => (text.padding, "start"),
        TextAlign::Center => (width / 2.0, "middle"),
        TextAlign::Right => (width - text.padding, "end"),
    };
    let mut attributes = format!(
        " font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-style=\"{}\" text-anchor=\"{anchor}\"",
        escape(&text.font_family),
        text.font_size,
        text.font_weight.as_str(),
        text.font_style.as_str(),
    );
    if text.char_spacing != 0.0 {
        let _ = write!(attributes, " letter-spacing=\"{}em\"", text.char_spacing / 1000.0);
    }
    attributes.push_str(&paint("fill", object.style.fill));
    if object.style.opacity < 1.0 {
        let _ = write!(attributes, " opacity=\"{}\"", object.style.opacity);
    }

    let _ = write!(out, "<text{attributes}{transform}>");
    let line_advance = text.font_size * text.line_height;
    for (i, line) in text.content.split('\n').enumerate() {
        let baseline = text.padding + text.font_size + line_advance * i as f64;
        let _ = write!(out, "<tspan x=\"{x}\" y=\"{baseline}\">{}</tspan>", escape(line));
    }
    out.push_str("</text>\n");
}

fn shape_style(style: &ShapeStyle) -> String {
    let mut attributes = paint("fill", style.fill);
    match style.stroke {
        Some(_) if style.stroke_width > 0.0 => {
            attributes.push_str(&paint("stroke", style.stroke));
            let _ = write!(
                attributes,
                " stroke-width=\"{}\" vector-effect=\"non-scaling-stroke\"",
                style.stroke_width
            );
        }
        _ => attributes.push_str(" stroke=\"none\""),
    }
    if style.opacity < 1.0 {
        let _ = write!(attributes, " opacity=\"{}\"", style.opacity);
    }
    attributes
}

/// Color attribute, with a separate opacity attribute for translucent colors.
fn paint(name: &str, color: Option<SerializableColor>) -> String {
    let Some(color) = color else {
        return format!(" {name}=\"none\"");
    };
    let hex = SerializableColor::rgb(color.r, color.g, color.b).to_hex();
    if color.a == 255 {
        format!(" {name}=\"{hex}\"")
    } else {
        let alpha = color.a as f64 / 255.0;
        format!(" {name}=\"{hex}\" {name}-opacity=\"{alpha:.3}\"")
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::shapes::{Ellipse, Geometry, Rectangle};

    fn object(shape: Shape, geometry: Geometry) -> RenderObject {
        RenderObject::new(shape, geometry, ShapeStyle::default())
    }

    #[test]
    fn test_one_element_per_visible_object() {
        let rect = object(
            Shape::Rectangle(Rectangle::new(4.0)),
            Geometry::new(0.0, 0.0, 50.0, 30.0),
        );
        let ellipse = object(
            Shape::Ellipse(Ellipse::new(10.0, 10.0)),
            Geometry::new(60.0, 0.0, 20.0, 20.0),
        );
        let mut hidden = object(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(0.0, 100.0, 10.0, 10.0),
        );
        hidden.visible = false;

        let svg = render_svg(&[&rect, &ellipse, &hidden], None).unwrap();
        assert_eq!(svg.matches("<rect").count(), 1);
        assert_eq!(svg.matches("<ellipse").count(), 1);
        assert!(svg.contains("rx=\"4\""));
        assert!(svg.contains("fill=\"#d9d9d9\""));
    }

    #[test]
    fn test_text_lines_are_escaped() {
        let mut text = Text::new("a < b\n& c", 10.0);
        text.text_align = TextAlign::Center;
        let object = RenderObject::new(
            Shape::Text(text),
            Geometry::new(0.0, 0.0, 80.0, 30.0),
            ShapeStyle::text(SerializableColor::black()),
        );
        let svg = render_svg(&[&object], None).unwrap();
        assert!(svg.contains(">a &lt; b</tspan>"));
        assert!(svg.contains(">&amp; c</tspan>"));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("fill=\"#000000\""));
    }

    #[test]
    fn test_background_and_translucent_fill() {
        let mut rect = object(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(10.0, 10.0, 20.0, 20.0),
        );
        rect.style.fill = Some(SerializableColor::new(255, 0, 0, 51));
        let svg = render_svg(&[&rect], Some(SerializableColor::white())).unwrap();
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains("fill=\"#ff0000\" fill-opacity=\"0.200\""));
    }
}
