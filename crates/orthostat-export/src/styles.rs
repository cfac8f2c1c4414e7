use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Document styling configuration for exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStyles {
    /// Font for body text and tables.
    pub body_font: String,

    pub heading_font: String,

    /// Body text font size in points.
    pub body_size: usize,

    /// Table text font size in points.
    pub table_size: usize,

    pub heading1_size: usize,
    pub heading2_size: usize,
    pub heading3_size: usize,

    /// Page margin in inches (applied uniformly).
    pub margin_inches: f64,
}

impl DocumentStyles {
    pub fn validate(&self) -> Result<(), ExportError> {
        if !(0.0..=2.0).contains(&self.margin_inches) {
            return Err(ExportError::InvalidOptions(format!(
                "margin of {} in is outside 0-2 in",
                self.margin_inches
            )));
        }
        if self.body_size == 0 || self.table_size == 0 {
            return Err(ExportError::InvalidOptions(
                "font sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Arial".to_string(),
            heading_font: "Arial".to_string(),
            body_size: 11,
            table_size: 10,
            heading1_size: 18,
            heading2_size: 14,
            heading3_size: 12,
            margin_inches: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// Portrait width and height in twentieths of a point.
    pub fn twips(self) -> (u32, u32) {
        match self {
            PaperSize::A4 => (11906, 16838),
            PaperSize::Letter => (12240, 15840),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// What goes into the DOCX report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    pub include_chart: bool,

    /// When off, the measurement table stops after
    /// [`TRUNCATED_MEASUREMENT_ROWS`] rows and notes how many were left out.
    pub include_all_measurements: bool,

    pub include_symptoms: bool,
    pub include_interpretation: bool,
    pub paper: PaperSize,
    pub orientation: Orientation,
}

/// Rows shown in a truncated measurement table.
pub const TRUNCATED_MEASUREMENT_ROWS: usize = 15;

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_chart: true,
            include_all_measurements: true,
            include_symptoms: true,
            include_interpretation: true,
            paper: PaperSize::default(),
            orientation: Orientation::default(),
        }
    }
}

impl ReportOptions {
    /// Page width and height in twips after applying the orientation.
    pub fn page_twips(&self) -> (u32, u32) {
        let (w, h) = self.paper.twips();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Parse an options object, rejecting unknown keys and values.
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(|e| ExportError::InvalidOptions(e.to_string()))
    }
}

/// Letterhead printed at the top of reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicInfo {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl Default for ClinicInfo {
    fn default() -> Self {
        Self {
            name: "Medical Clinic".to_string(),
            address: None,
            phone: None,
        }
    }
}
