use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use orthostat_core::models::chart::ChartPoint;

use crate::chart;
use crate::error::ExportError;

/// How to wait for and rasterize a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    #[serde(with = "millis")]
    pub timeout: Duration,
    #[serde(with = "millis")]
    pub retry_interval: Duration,
    /// Pixel multiplier applied to `width` and `height`.
    pub scale: u32,
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3000),
            retry_interval: Duration::from_millis(100),
            scale: 2,
            width: 800,
            height: 400,
            background: [255, 255, 255],
        }
    }
}

impl CaptureOptions {
    /// Smallest logical canvas that still fits the caption and axis labels.
    pub const MIN_SIZE: (u32, u32) = (200, 100);

    /// Raster size after scaling, bounded by [`chart::MAX_CHART_PIXELS`].
    pub fn pixel_size(&self) -> Result<(u32, u32), ExportError> {
        let (min_width, min_height) = Self::MIN_SIZE;
        if self.scale == 0 {
            return Err(ExportError::InvalidOptions("capture scale must be at least 1".to_string()));
        }
        if self.width < min_width || self.height < min_height {
            return Err(ExportError::InvalidOptions(format!(
                "capture size {}x{} is below {min_width}x{min_height}",
                self.width, self.height
            )));
        }

        let too_large = || {
            ExportError::InvalidOptions(format!(
                "capture of {}x{} at scale {} exceeds {} pixels",
                self.width,
                self.height,
                self.scale,
                chart::MAX_CHART_PIXELS
            ))
        };
        let width = self.width.checked_mul(self.scale).ok_or_else(too_large)?;
        let height = self.height.checked_mul(self.scale).ok_or_else(too_large)?;
        if u64::from(width) * u64::from(height) > chart::MAX_CHART_PIXELS {
            return Err(too_large());
        }
        Ok((width, height))
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if self.retry_interval.is_zero() {
            return Err(ExportError::InvalidOptions(
                "capture retry interval must be positive".to_string(),
            ));
        }
        self.pixel_size().map(|_| ())
    }
}

/// Something that shows a chart and can be rasterized once drawn.
pub trait ChartSurface {
    /// Whether the chart's structure is present and ready to capture.
    fn is_rendered(&self) -> bool;

    /// PNG bytes of the chart as it currently looks.
    fn capture(&self, options: &CaptureOptions) -> Result<Vec<u8>, ExportError>;
}

/// Poll `surface` until it reports rendered, then capture it.
///
/// At the timeout a best-effort capture is still attempted. Any failure
/// comes back as [`ExportError::CaptureFailed`].
pub async fn capture_when_ready<S: ChartSurface + ?Sized>(
    surface: &S,
    options: &CaptureOptions,
) -> Result<Vec<u8>, ExportError> {
    let deadline = Instant::now() + options.timeout;
    let mut attempts = 0u32;

    while !surface.is_rendered() {
        if Instant::now() >= deadline {
            warn!(
                timeout_ms = options.timeout.as_millis() as u64,
                attempts, "chart not rendered before timeout, capturing anyway"
            );
            break;
        }
        attempts += 1;
        tokio::time::sleep(options.retry_interval).await;
    }

    let png = surface
        .capture(options)
        .map_err(|e| ExportError::CaptureFailed(e.to_string()))?;
    if png.is_empty() {
        return Err(ExportError::CaptureFailed("capture produced no image".to_string()));
    }
    debug!(attempts, bytes = png.len(), "chart captured");
    Ok(png)
}

/// A chart drawn straight from a series with no display in between.
#[derive(Debug, Clone)]
pub struct SeriesChart {
    points: Vec<ChartPoint>,
}

impl SeriesChart {
    pub fn new(points: Vec<ChartPoint>) -> Self {
        Self { points }
    }
}

impl ChartSurface for SeriesChart {
    fn is_rendered(&self) -> bool {
        !self.points.is_empty()
    }

    fn capture(&self, options: &CaptureOptions) -> Result<Vec<u8>, ExportError> {
        if self.points.is_empty() {
            return Err(ExportError::CaptureFailed("no data to chart".to_string()));
        }
        let (width, height) = options.pixel_size()?;
        chart::render_png(&self.points, width, height, options.background)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
