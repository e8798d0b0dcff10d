//! Page layout for PDF reports
//!
//! Reports are laid out into a [`ReportLayout`], a list of pages holding
//! positioned drawing operations, before anything touches the PDF backend.
//! All coordinates are millimetres from the bottom-left corner of the page,
//! as in the PDF coordinate system.

use crate::domain::{HmsExportError, Result};

pub const A4_SHORT_MM: f32 = 210.0;
pub const A4_LONG_MM: f32 = 297.0;

pub const MARGIN_MM: f32 = 15.0;
pub const BANNER_HEIGHT_MM: f32 = 24.0;
pub const FOOTER_HEIGHT_MM: f32 = 12.0;

pub const BODY_SIZE: f32 = 9.5;
pub const SMALL_SIZE: f32 = 8.0;
pub const HEADING_SIZE: f32 = 12.0;
pub const TABLE_SIZE: f32 = 8.0;
pub const TABLE_ROW_MM: f32 = 6.0;

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica advance width as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;
const LINE_SPACING: f32 = 1.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Page width and height in millimetres (A4)
    pub fn page_size(&self) -> (f32, f32) {
        match self {
            Orientation::Portrait => (A4_SHORT_MM, A4_LONG_MM),
            Orientation::Landscape => (A4_LONG_MM, A4_SHORT_MM),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || HmsExportError::Configuration(format!("Invalid color '{hex}'. Expected #rrggbb"));
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb8(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Colors used across a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub on_accent: Color,
    pub stripe: Color,
    pub rule: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: Color::rgb8(0x1f, 0x4e, 0x79),
            text: Color::rgb8(0x22, 0x22, 0x22),
            muted: Color::rgb8(0x6b, 0x72, 0x80),
            on_accent: Color::rgb8(0xff, 0xff, 0xff),
            stripe: Color::rgb8(0xf1, 0xf4, 0xf8),
            rule: Color::rgb8(0xc8, 0xd0, 0xda),
        }
    }
}

impl Palette {
    pub fn with_accent(mut self, accent: Color) -> Self {
        self.accent = accent;
        self
    }
}

/// One positioned drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline starting at (`x`, `y`)
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Color,
        text: String,
    },
    /// Straight stroke
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Color,
    },
    /// Filled rectangle with its bottom-left corner at (`x`, `y`)
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Stroked rectangle outline
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPage {
    pub ops: Vec<DrawOp>,
}

impl LayoutPage {
    /// Text strings on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A fully laid out report, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub orientation: Orientation,
    pub pages: Vec<LayoutPage>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text string in the report, page by page
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.texts())
    }

    /// True when some text string contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

/// Estimated rendered width of `text` in millimetres
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH * PT_TO_MM
}

/// How many characters fit in `width_mm` at `size`
pub fn chars_per_line(width_mm: f32, size: f32) -> usize {
    ((width_mm / (size * AVG_GLYPH_WIDTH * PT_TO_MM)).floor() as usize).max(1)
}

pub fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * LINE_SPACING
}

/// Word-wrap `text` to lines of at most `max_chars`
///
/// Explicit newlines start a new line. A single word longer than the limit
/// is kept whole on its own line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let len = current.chars().count();
            if len > 0 && len + word.chars().count() + 1 > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cut `text` so it fits `width_mm`, ending in `...` when shortened
pub fn fit_text(text: &str, width_mm: f32, size: f32) -> String {
    let max = chars_per_line(width_mm, size);
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Band drawn across the top of every page
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub heading: String,
    pub subheading: String,
    pub generated: String,
}

/// Table column: title and width in millimetres
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub title: String,
    pub width: f32,
}

impl Column {
    pub fn new(title: impl Into<String>, width: f32) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

/// Flowing page writer
///
/// Keeps a cursor (the baseline of the next line) and starts a new page,
/// banner included, whenever the next block would run into the footer.
pub struct PageWriter {
    layout: ReportLayout,
    width: f32,
    height: f32,
    cursor: f32,
    banner: Banner,
    palette: Palette,
}

impl PageWriter {
    pub fn new(
        title: impl Into<String>,
        orientation: Orientation,
        banner: Banner,
        palette: Palette,
    ) -> Self {
        let (width, height) = orientation.page_size();
        let mut writer = Self {
            layout: ReportLayout {
                title: title.into(),
                orientation,
                pages: Vec::new(),
            },
            width,
            height,
            cursor: height,
            banner,
            palette,
        };
        writer.start_page();
        writer
    }

    fn start_page(&mut self) {
        self.layout.pages.push(LayoutPage::default());

        let top = self.height - BANNER_HEIGHT_MM;
        self.push(DrawOp::Rect {
            x: 0.0,
            y: top,
            width: self.width,
            height: BANNER_HEIGHT_MM,
            color: self.palette.accent,
        });

        let heading = self.banner.heading.clone();
        let subheading = self.banner.subheading.clone();
        let generated = self.banner.generated.clone();
        let on_accent = self.palette.on_accent;

        self.push_text(MARGIN_MM, self.height - 11.0, 16.0, FontStyle::Bold, on_accent, heading);
        self.push_text(MARGIN_MM, self.height - 18.5, 10.0, FontStyle::Regular, on_accent, subheading);
        let x = self.width - MARGIN_MM - text_width(&generated, SMALL_SIZE);
        self.push_text(x, self.height - 18.5, SMALL_SIZE, FontStyle::Regular, on_accent, generated);

        self.cursor = top - 9.0;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.layout.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn push_text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, color: Color, text: String) {
        self.push(DrawOp::Text {
            x,
            y,
            size,
            style,
            color,
            text,
        });
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn left(&self) -> f32 {
        MARGIN_MM
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * MARGIN_MM
    }

    /// Vertical space left above the footer
    pub fn remaining(&self) -> f32 {
        self.cursor - (MARGIN_MM + FOOTER_HEIGHT_MM)
    }

    pub fn page_break(&mut self) {
        self.start_page();
    }

    /// Break to a new page unless `needed` millimetres are still free
    ///
    /// Returns true when a page break happened.
    pub fn ensure_space(&mut self, needed: f32) -> bool {
        if self.remaining() < needed {
            self.page_break();
            true
        } else {
            false
        }
    }

    pub fn advance(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    /// Single line of text at `indent` from the left margin
    pub fn line(&mut self, indent: f32, size: f32, style: FontStyle, text: impl Into<String>) {
        let height = line_height(size);
        self.ensure_space(height);
        let color = match style {
            FontStyle::Italic => self.palette.muted,
            _ => self.palette.text,
        };
        self.push_text(MARGIN_MM + indent, self.cursor, size, style, color, text.into());
        self.cursor -= height;
    }

    /// Word-wrapped text block at `indent`
    pub fn paragraph(&mut self, indent: f32, size: f32, style: FontStyle, text: &str) {
        let max = chars_per_line(self.content_width() - indent, size);
        for line in wrap_text(text, max) {
            self.line(indent, size, style, line);
        }
    }

    /// `Label: value` with the value wrapped under a hanging indent
    pub fn field(&mut self, indent: f32, label: &str, value: &str) {
        let label = format!("{label}: ");
        let label_width = text_width(&label, BODY_SIZE) + 1.0;
        let max = chars_per_line(self.content_width() - indent - label_width, BODY_SIZE);
        let height = line_height(BODY_SIZE);
        let text = self.palette.text;

        for (i, line) in wrap_text(value, max).into_iter().enumerate() {
            self.ensure_space(height);
            if i == 0 {
                self.push_text(MARGIN_MM + indent, self.cursor, BODY_SIZE, FontStyle::Bold, text, label.clone());
            }
            self.push_text(MARGIN_MM + indent + label_width, self.cursor, BODY_SIZE, FontStyle::Regular, text, line);
            self.cursor -= height;
        }
    }

    /// Section heading with an accent rule underneath
    pub fn heading(&mut self, text: &str) {
        let height = line_height(HEADING_SIZE) + 3.0;
        // Keep a heading together with at least a couple of lines after it
        self.ensure_space(height + 2.0 * line_height(BODY_SIZE));
        let accent = self.palette.accent;
        self.push_text(MARGIN_MM, self.cursor, HEADING_SIZE, FontStyle::Bold, accent, text.to_string());
        let y = self.cursor - 2.0;
        self.push(DrawOp::Line {
            from: (MARGIN_MM, y),
            to: (self.width - MARGIN_MM, y),
            thickness: 0.8,
            color: accent,
        });
        self.cursor -= height;
    }

    /// Thin full-width separator
    pub fn rule(&mut self) {
        self.ensure_space(4.0);
        let y = self.cursor + 1.5;
        let color = self.palette.rule;
        self.push(DrawOp::Line {
            from: (MARGIN_MM, y),
            to: (self.width - MARGIN_MM, y),
            thickness: 0.3,
            color,
        });
        self.cursor -= 4.0;
    }

    /// One line of `Label: value` pairs spread over equal-width columns
    pub fn pair_row(&mut self, indent: f32, pairs: &[(&str, String)]) {
        if pairs.is_empty() {
            return;
        }
        let height = line_height(BODY_SIZE);
        self.ensure_space(height);

        let column_width = (self.content_width() - indent) / pairs.len() as f32;
        let text = self.palette.text;
        for (i, (label, value)) in pairs.iter().enumerate() {
            let x = MARGIN_MM + indent + column_width * i as f32;
            let label = format!("{label}: ");
            let label_width = text_width(&label, BODY_SIZE) + 1.0;
            let value = fit_text(value, column_width - label_width - 2.0, BODY_SIZE);
            self.push_text(x, self.cursor, BODY_SIZE, FontStyle::Bold, text, label);
            self.push_text(x + label_width, self.cursor, BODY_SIZE, FontStyle::Regular, text, value);
        }
        self.cursor -= height;
    }

    /// Rows of pairs inside an outlined box, kept on one page
    pub fn boxed_pairs(&mut self, rows: &[Vec<(&str, String)>]) {
        let height = line_height(BODY_SIZE);
        let box_height = rows.len() as f32 * height + 4.0;
        self.ensure_space(box_height + 2.0);

        let top = self.cursor + height * 0.8;
        let color = self.palette.rule;
        self.push(DrawOp::Frame {
            x: MARGIN_MM,
            y: top - box_height,
            width: self.content_width(),
            height: box_height,
            color,
        });
        self.cursor -= 2.0;
        for row in rows {
            self.pair_row(3.0, row);
        }
        self.cursor -= 4.0;
    }

    fn column_offsets(&self, columns: &[Column]) -> Vec<(f32, f32)> {
        let total: f32 = columns.iter().map(|c| c.width).sum();
        let scale = if total > 0.0 { self.content_width() / total } else { 1.0 };
        let mut x = MARGIN_MM;
        columns
            .iter()
            .map(|c| {
                let w = c.width * scale;
                let start = x;
                x += w;
                (start, w)
            })
            .collect()
    }

    fn table_header(&mut self, columns: &[Column], offsets: &[(f32, f32)]) {
        let accent = self.palette.accent;
        let on_accent = self.palette.on_accent;
        self.push(DrawOp::Rect {
            x: MARGIN_MM,
            y: self.cursor - 2.0,
            width: self.content_width(),
            height: TABLE_ROW_MM,
            color: accent,
        });
        for (column, (x, w)) in columns.iter().zip(offsets) {
            let text = fit_text(&column.title, w - 2.0, TABLE_SIZE);
            self.push_text(x + 1.0, self.cursor, TABLE_SIZE, FontStyle::Bold, on_accent, text);
        }
        self.cursor -= TABLE_ROW_MM;
    }

    /// Striped table; the header row repeats after every page break
    pub fn table(&mut self, columns: &[Column], rows: &[Vec<String>]) {
        let offsets = self.column_offsets(columns);
        self.ensure_space(TABLE_ROW_MM * 2.0);
        self.table_header(columns, &offsets);

        let stripe = self.palette.stripe;
        let text = self.palette.text;
        for (i, row) in rows.iter().enumerate() {
            if self.ensure_space(TABLE_ROW_MM) {
                self.table_header(columns, &offsets);
            }
            if i % 2 == 1 {
                self.push(DrawOp::Rect {
                    x: MARGIN_MM,
                    y: self.cursor - 2.0,
                    width: self.content_width(),
                    height: TABLE_ROW_MM,
                    color: stripe,
                });
            }
            for (cell, (x, w)) in row.iter().zip(&offsets) {
                let cell = fit_text(cell, w - 2.0, TABLE_SIZE);
                self.push_text(x + 1.0, self.cursor, TABLE_SIZE, FontStyle::Regular, text, cell);
            }
            self.cursor -= TABLE_ROW_MM;
        }
        self.cursor -= 2.0;
    }

    /// Stamp `Page i of n` footers and return the finished layout
    pub fn finish(mut self) -> ReportLayout {
        let total = self.layout.pages.len();
        let muted = self.palette.muted;
        let rule = self.palette.rule;
        let footer_y = MARGIN_MM - 5.0;

        for (i, page) in self.layout.pages.iter_mut().enumerate() {
            let label = format!("Page {} of {}", i + 1, total);
            page.ops.push(DrawOp::Line {
                from: (MARGIN_MM, footer_y + 5.0),
                to: (self.width - MARGIN_MM, footer_y + 5.0),
                thickness: 0.3,
                color: rule,
            });
            page.ops.push(DrawOp::Text {
                x: MARGIN_MM,
                y: footer_y,
                size: SMALL_SIZE,
                style: FontStyle::Regular,
                color: muted,
                text: self.banner.heading.clone(),
            });
            page.ops.push(DrawOp::Text {
                x: self.width - MARGIN_MM - text_width(&label, SMALL_SIZE),
                y: footer_y,
                size: SMALL_SIZE,
                style: FontStyle::Regular,
                color: muted,
                text: label,
            });
        }

        self.layout
    }
}
