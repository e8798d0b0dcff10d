//! PDF reports
//!
//! Building a report is two steps: a layout pass ([`records`],
//! [`appointments`]) positions every string and box on A4 pages, then
//! [`render::render_pdf`] paints the layout with `printpdf`. Everything the
//! layout needs comes in through [`ReportOptions`].

pub mod appointments;
pub mod layout;
pub mod records;
pub mod render;

pub use appointments::build_appointment_layout;
pub use layout::{Color, Orientation, Palette, ReportLayout};
pub use records::build_records_layout;
pub use render::render_pdf;

/// Default hospital name printed in report banners
pub const DEFAULT_HOSPITAL_NAME: &str = "Hospital Management System";

/// Progress notes printed per admission before the rest are summarized
pub const DEFAULT_MAX_PROGRESS_NOTES: usize = 5;

/// Space a record section needs on the current page before it starts
pub const DEFAULT_PAGE_BREAK_THRESHOLD_MM: f32 = 60.0;

/// Presentation settings for PDF reports
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub hospital_name: String,
    pub max_progress_notes: usize,
    pub page_break_threshold_mm: f32,
    pub palette: Palette,
    /// Orientation of the medical records report; appointment reports are always landscape
    pub orientation: Orientation,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            hospital_name: DEFAULT_HOSPITAL_NAME.to_string(),
            max_progress_notes: DEFAULT_MAX_PROGRESS_NOTES,
            page_break_threshold_mm: DEFAULT_PAGE_BREAK_THRESHOLD_MM,
            palette: Palette::default(),
            orientation: Orientation::Portrait,
        }
    }
}

impl ReportOptions {
    pub fn with_hospital_name(mut self, name: impl Into<String>) -> Self {
        self.hospital_name = name.into();
        self
    }

    pub fn with_max_progress_notes(mut self, max: usize) -> Self {
        self.max_progress_notes = max;
        self
    }

    pub fn with_page_break_threshold(mut self, mm: f32) -> Self {
        self.page_break_threshold_mm = mm;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}
