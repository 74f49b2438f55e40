//! SVG serialization of a primitive tree.

use super::primitives::{Element, Group, Line, Polygon, Rect, Style, Text};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// User units per centimetre.
pub const CM: f64 = 35.43307;

const MARKER_ID: &str = "dependency-dot";

/// A complete chart, sized in centimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: f64,
    pub height: f64,
    pub font_family: String,
    pub root: Group,
}

impl Drawing {
    pub fn new(width: f64, height: f64, font_family: impl Into<String>) -> Self {
        Self {
            width,
            height,
            font_family: font_family.into(),
            root: Group::new(),
        }
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.root.push(element);
    }

    pub fn to_svg(&self) -> String {
        let width = number(self.width * CM);
        let height = number(self.height * CM);
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"{}\">",
            escape(&self.font_family)
        );
        let _ = writeln!(
            out,
            "<defs><marker id=\"{MARKER_ID}\" markerWidth=\"10\" markerHeight=\"10\" refX=\"5\" refY=\"5\"><circle cx=\"5\" cy=\"5\" r=\"5\" fill=\"#000000\" opacity=\"0.5\" stroke-width=\"0\"/></marker></defs>"
        );
        write_group(&mut out, &self.root);
        out.push_str("</svg>\n");
        out
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_svg())
    }
}

/// Three decimals at most, no trailing zeros.
fn number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn cm(value: f64) -> String {
    number(value * CM)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn write_style(out: &mut String, style: &Style) {
    if let Some(fill) = &style.fill {
        let _ = write!(out, " fill=\"{}\"", escape(fill));
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(out, " stroke=\"{}\"", escape(stroke));
    }
    if let Some(width) = style.stroke_width {
        let _ = write!(out, " stroke-width=\"{}\"", number(width));
    }
    if let Some(opacity) = style.opacity {
        let _ = write!(out, " opacity=\"{}\"", number(opacity));
    }
    if let Some(dash) = &style.dasharray {
        let _ = write!(out, " stroke-dasharray=\"{}\"", escape(dash));
    }
}

fn write_element(out: &mut String, element: &Element) {
    match element {
        Element::Rect(rect) => write_rect(out, rect),
        Element::Line(line) => write_line(out, line),
        Element::Polygon(polygon) => write_polygon(out, polygon),
        Element::Text(text) => write_text(out, text),
        Element::Group(group) => write_group(out, group),
    }
}

fn write_group(out: &mut String, group: &Group) {
    out.push_str("<g");
    if let Some(id) = &group.id {
        let _ = write!(out, " id=\"{}\"", escape(id));
    }
    write_style(out, &group.style);
    out.push_str(">\n");
    for child in group.children() {
        write_element(out, child);
    }
    out.push_str("</g>\n");
}

fn write_rect(out: &mut String, rect: &Rect) {
    let _ = write!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        cm(rect.x),
        cm(rect.y),
        cm(rect.width.max(0.0)),
        cm(rect.height.max(0.0))
    );
    write_style(out, &rect.style);
    out.push_str("/>\n");
}

fn write_line(out: &mut String, line: &Line) {
    let _ = write!(
        out,
        "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
        cm(line.x1),
        cm(line.y1),
        cm(line.x2),
        cm(line.y2)
    );
    write_style(out, &line.style);
    if line.marker_end {
        let _ = write!(out, " marker-end=\"url(#{MARKER_ID})\"");
    }
    out.push_str("/>\n");
}

fn write_polygon(out: &mut String, polygon: &Polygon) {
    let points: Vec<String> = polygon
        .points
        .iter()
        .map(|(x, y)| format!("{},{}", cm(*x), cm(*y)))
        .collect();
    let _ = write!(out, "<polygon points=\"{}\"", points.join(" "));
    write_style(out, &polygon.style);
    out.push_str("/>\n");
}

fn write_text(out: &mut String, text: &Text) {
    let _ = write!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"{}\"",
        cm(text.x),
        cm(text.y),
        number(text.font_size)
    );
    if text.bold {
        out.push_str(" font-weight=\"bold\"");
    }
    if text.anchor_end {
        out.push_str(" text-anchor=\"end\"");
    }
    write_style(out, &text.style);
    let _ = writeln!(out, ">{}</text>", escape(&text.content));
}
