// Vector export of a committed shape list.
//
// Rectangles are emitted as four-corner polygons so every primitive shares
// the polygon/ellipse vocabulary; the background is a full-size rect.

use std::fmt::Write;

use crate::canvas::Color;
use crate::shape::{Geometry, Shape};

/// Build a standalone SVG document reproducing the painting: background rect
/// first, then the shapes in commit order with their fill and opacity.
pub fn render_document(shapes: &[Shape], background: Color, width: u32, height: u32) -> String {
    let mut out = String::new();
    // writeln! to a String cannot fail
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let _ = writeln!(
        out,
        "  <rect width=\"100%\" height=\"100%\" fill=\"rgb({},{},{})\" />",
        background.r, background.g, background.b
    );

    for shape in shapes {
        match shape.geometry {
            Geometry::Triangle {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => {
                let _ = write!(out, "  <polygon points=\"{x1},{y1} {x2},{y2} {x3},{y3}\" ");
            }
            Geometry::Rectangle { x1, y1, x2, y2 } => {
                let _ = write!(
                    out,
                    "  <polygon points=\"{x1},{y1} {x2},{y1} {x2},{y2} {x1},{y2}\" "
                );
            }
            Geometry::Ellipse { cx, cy, rx, ry } => {
                let _ = write!(
                    out,
                    "  <ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{rx}\" ry=\"{ry}\" "
                );
            }
        }
        let _ = writeln!(
            out,
            "fill=\"rgb({},{},{})\" fill-opacity=\"{:.2}\" />",
            shape.color.r, shape.color.g, shape.color.b, shape.alpha
        );
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_shape_list_is_just_background() {
        let doc = render_document(&[], Color::opaque(10, 20, 30), 64, 48);
        assert_eq!(
            doc,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"64\" height=\"48\" viewBox=\"0 0 64 48\">\n\
             \x20 <rect width=\"100%\" height=\"100%\" fill=\"rgb(10,20,30)\" />\n\
             </svg>\n"
        );
    }

    #[test]
    fn triangle_becomes_a_polygon() {
        let shape = Shape::from_geometry(
            Geometry::Triangle {
                x1: 1,
                y1: 2,
                x2: 30,
                y2: 4,
                x3: 5,
                y3: 60,
            },
            Color::opaque(200, 100, 50),
            0.5,
        );
        let doc = render_document(&[shape], Color::opaque(0, 0, 0), 100, 100);
        assert!(doc.contains(
            "  <polygon points=\"1,2 30,4 5,60\" fill=\"rgb(200,100,50)\" fill-opacity=\"0.50\" />"
        ));
    }

    #[test]
    fn rectangle_becomes_a_four_corner_polygon() {
        let shape = Shape::from_geometry(
            Geometry::Rectangle {
                x1: 2,
                y1: 3,
                x2: 8,
                y2: 9,
            },
            Color::opaque(0, 255, 0),
            1.0,
        );
        let doc = render_document(&[shape], Color::opaque(0, 0, 0), 10, 10);
        assert!(doc.contains(
            "  <polygon points=\"2,3 8,3 8,9 2,9\" fill=\"rgb(0,255,0)\" fill-opacity=\"1.00\" />"
        ));
    }

    #[test]
    fn ellipse_keeps_its_native_element() {
        let shape = Shape::from_geometry(
            Geometry::Ellipse {
                cx: 50,
                cy: 40,
                rx: 12,
                ry: 7,
            },
            Color::opaque(1, 2, 3),
            0.25,
        );
        let doc = render_document(&[shape], Color::opaque(255, 255, 255), 100, 80);
        assert!(doc.contains(
            "  <ellipse cx=\"50\" cy=\"40\" rx=\"12\" ry=\"7\" fill=\"rgb(1,2,3)\" fill-opacity=\"0.25\" />"
        ));
    }

    #[test]
    fn shapes_appear_in_commit_order() {
        let first = Shape::from_geometry(
            Geometry::Rectangle {
                x1: 0,
                y1: 0,
                x2: 1,
                y2: 1,
            },
            Color::opaque(255, 0, 0),
            0.5,
        );
        let second = Shape::from_geometry(
            Geometry::Ellipse {
                cx: 5,
                cy: 5,
                rx: 2,
                ry: 2,
            },
            Color::opaque(0, 0, 255),
            0.5,
        );
        let doc = render_document(&[first, second], Color::opaque(0, 0, 0), 10, 10);
        let rect_pos = doc.find("<polygon").unwrap();
        let ellipse_pos = doc.find("<ellipse").unwrap();
        assert!(rect_pos < ellipse_pos);
    }
}
