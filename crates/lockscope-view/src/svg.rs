//! Standalone SVG serialisation of a [`Scene`].

use std::fmt::{self, Write};

use crate::scene::{NodeShape, Primitive, Scene};
use crate::theme::hex;

impl Scene {
    /// Serialise to a complete SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(256 + self.primitives.len() * 128);
        let (w, h) = (Num(self.size.width), Num(self.size.height));
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            hex(self.background)
        );

        for primitive in &self.primitives {
            write_primitive(&mut out, primitive);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn write_primitive(out: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Edge {
            source,
            target,
            line,
            head,
            color,
            width,
        } => {
            let color = hex(*color);
            let _ = writeln!(
                out,
                r#"  <g class="edge" data-source="{}" data-target="{}">"#,
                escape_xml(source),
                escape_xml(target)
            );
            let _ = writeln!(
                out,
                r#"    <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{}"/>"#,
                Num(line.p0.x),
                Num(line.p0.y),
                Num(line.p1.x),
                Num(line.p1.y),
                Num(*width)
            );
            let _ = writeln!(
                out,
                r#"    <polygon points="{},{} {},{} {},{}" fill="{color}"/>"#,
                Num(head.tip.x),
                Num(head.tip.y),
                Num(head.left.x),
                Num(head.left.y),
                Num(head.right.x),
                Num(head.right.y)
            );
            out.push_str("  </g>\n");
        }
        Primitive::Node {
            id,
            kind,
            shape,
            fill,
            stroke,
            stroke_width,
            deadlocked,
        } => {
            let class = if *deadlocked {
                format!("node {kind} deadlocked")
            } else {
                format!("node {kind}")
            };
            let paint = format!(
                r#"fill="{}" stroke="{}" stroke-width="{}""#,
                hex(*fill),
                hex(*stroke),
                Num(*stroke_width)
            );
            match shape {
                NodeShape::Circle(c) => {
                    let _ = writeln!(
                        out,
                        r#"  <circle class="{class}" data-id="{}" cx="{}" cy="{}" r="{}" {paint}/>"#,
                        escape_xml(id),
                        Num(c.center.x),
                        Num(c.center.y),
                        Num(c.radius)
                    );
                }
                NodeShape::Square(r) => {
                    let _ = writeln!(
                        out,
                        r#"  <rect class="{class}" data-id="{}" x="{}" y="{}" width="{}" height="{}" {paint}/>"#,
                        escape_xml(id),
                        Num(r.x0),
                        Num(r.y0),
                        Num(r.width()),
                        Num(r.height())
                    );
                }
            }
        }
        Primitive::Label {
            text,
            position,
            font_size,
            color,
            ..
        }
        | Primitive::Placeholder {
            text,
            position,
            font_size,
            color,
        } => {
            let _ = writeln!(
                out,
                r#"  <text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-size="{}" fill="{}">{}</text>"#,
                Num(position.x),
                Num(position.y),
                Num(*font_size),
                hex(*color),
                escape_xml(text)
            );
        }
    }
}

/// SVG number: at most two decimals, no `-0`, non-finite as `0`.
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_finite() {
            return f.write_str("0");
        }
        let mut v = (self.0 * 100.0).round() / 100.0;
        if v == 0.0 {
            // -0 compares equal; normalise it.
            v = 0.0;
        }
        write!(f, "{v}")
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
