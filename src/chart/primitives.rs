//! Drawing primitives in chart space.
//!
//! Positions and sizes are centimetres; font sizes and stroke widths are
//! user units and are written as-is.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub dasharray: Option<String>,
}

impl Style {
    pub fn filled(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn stroked(color: impl Into<String>) -> Self {
        Self {
            stroke: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, color: impl Into<String>) -> Self {
        self.stroke = Some(color.into());
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_dash(mut self, pattern: impl Into<String>) -> Self {
        self.dasharray = Some(pattern.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub style: Style,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64, style: Style) -> Self {
        Self {
            x,
            y,
            width,
            height,
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub style: Style,
    /// Ends with the dependency dot marker.
    pub marker_end: bool,
}

impl Line {
    pub fn new(from: (f64, f64), to: (f64, f64), style: Style) -> Self {
        Self {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            style,
            marker_end: false,
        }
    }

    pub fn with_marker(mut self) -> Self {
        self.marker_end = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<(f64, f64)>,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    pub bold: bool,
    pub anchor_end: bool,
    pub style: Style,
}

impl Text {
    /// Black text, the default label style.
    pub fn new(x: f64, y: f64, content: impl Into<String>, font_size: f64) -> Self {
        Self::colored(x, y, content, font_size, "black")
    }

    pub fn colored(
        x: f64,
        y: f64,
        content: impl Into<String>,
        font_size: f64,
        color: &str,
    ) -> Self {
        Self {
            x,
            y,
            content: content.into(),
            font_size,
            bold: false,
            anchor_end: false,
            style: Style::filled(color).with_stroke(color).with_stroke_width(0.0),
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn anchored_end(mut self) -> Self {
        self.anchor_end = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Rect(Rect),
    Line(Line),
    Polygon(Polygon),
    Text(Text),
    Group(Group),
}

impl From<Rect> for Element {
    fn from(value: Rect) -> Self {
        Element::Rect(value)
    }
}

impl From<Line> for Element {
    fn from(value: Line) -> Self {
        Element::Line(value)
    }
}

impl From<Polygon> for Element {
    fn from(value: Polygon) -> Self {
        Element::Polygon(value)
    }
}

impl From<Text> for Element {
    fn from(value: Text) -> Self {
        Element::Text(value)
    }
}

impl From<Group> for Element {
    fn from(value: Group) -> Self {
        Element::Group(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: Option<String>,
    pub style: Style,
    children: Vec<Element>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters that are awkward in an XML id become underscores.
    pub fn with_id(mut self, id: &str) -> Self {
        let cleaned = id
            .chars()
            .map(|c| match c {
                ' ' | ',' | '\'' | '/' | '\\' | '(' | ')' => '_',
                other => other,
            })
            .collect();
        self.id = Some(cleaned);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.children.push(element.into());
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Every non-group element of the subtree, depth first.
    pub fn leaves(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'g>(&'g self, out: &mut Vec<&'g Element>) {
        for child in &self.children {
            match child {
                Element::Group(group) => group.collect_leaves(out),
                other => out.push(other),
            }
        }
    }

    /// Contents of every text element of the subtree.
    pub fn texts(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|element| match element {
                Element::Text(text) => Some(text.content.as_str()),
                _ => None,
            })
            .collect()
    }
}
