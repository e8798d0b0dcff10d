//! Painting a [`ReportLayout`] with `printpdf`

use super::layout::{Color, DrawOp, FontStyle, ReportLayout};
use crate::domain::{HmsExportError, Result};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference,
    Point, Polygon, Rgb,
};
use std::io::BufWriter;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

/// Map text onto what the built-in Helvetica encoding can show
fn builtin_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2022}' => '-',
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xff => c,
            _ => '?',
        })
        .collect()
}

fn rect_points(x: f32, y: f32, width: f32, height: f32) -> Vec<(Point, bool)> {
    vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + width), Mm(y)), false),
        (Point::new(Mm(x + width), Mm(y + height)), false),
        (Point::new(Mm(x), Mm(y + height)), false),
    ]
}

fn paint(layer: &PdfLayerReference, fonts: &Fonts, op: &DrawOp) {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            style,
            color,
            text,
        } => {
            layer.set_fill_color(pdf_color(*color));
            layer.use_text(builtin_safe(text), *size, Mm(*x), Mm(*y), fonts.get(*style));
        }
        DrawOp::Line {
            from,
            to,
            thickness,
            color,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(from.0), Mm(from.1)), false),
                    (Point::new(Mm(to.0), Mm(to.1)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_fill_color(pdf_color(*color));
            layer.add_polygon(Polygon {
                rings: vec![rect_points(*x, *y, *width, *height)],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
        DrawOp::Frame {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(0.4);
            layer.add_line(Line {
                points: rect_points(*x, *y, *width, *height),
                is_closed: true,
            });
        }
    }
}

fn render_error(context: &str, e: impl std::fmt::Display) -> HmsExportError {
    HmsExportError::Render(format!("PDF {context} error: {e}"))
}

/// Render the layout to PDF bytes
pub fn render_pdf(layout: &ReportLayout) -> Result<Vec<u8>> {
    let (width, height) = layout.orientation.page_size();
    let (doc, first_page, first_layer) =
        PdfDocument::new(layout.title.as_str(), Mm(width), Mm(height), "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| render_error("font", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| render_error("font", e))?,
        italic: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| render_error("font", e))?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(width), Mm(height), format!("Layer {}", index + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for op in &page.ops {
            paint(&layer, &fonts, op);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| render_error("save", e))?;
    buf.into_inner().map_err(|e| render_error("buffer", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_safe_replaces_unsupported_chars() {
        assert_eq!(builtin_safe("37.5 °C"), "37.5 °C");
        assert_eq!(builtin_safe("2024-01-01 \u{2013} 2024-02-01"), "2024-01-01 - 2024-02-01");
        assert_eq!(builtin_safe("\u{201c}ok\u{201d}"), "\"ok\"");
        assert_eq!(builtin_safe("腹痛"), "??");
    }
}
