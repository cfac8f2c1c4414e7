use crate::ledger::Ledger;
use crate::models::chart::{ChartPoint, TrendLine};

pub const INITIAL_SUPINE_TIME: f64 = -2.0;
pub const LOWEST_SUPINE_TIME: f64 = -1.0;

/// Build the plot series: optional supine baselines followed by one point
/// per ledger entry, ascending by time.
pub fn build_series(
    initial_pr: Option<u32>,
    lowest_supine_pr: Option<u32>,
    ledger: &Ledger,
) -> Vec<ChartPoint> {
    let mut points = Vec::with_capacity(ledger.len() + 2);

    if let Some(heart_rate) = initial_pr {
        points.push(pre_test_point(INITIAL_SUPINE_TIME, heart_rate, "Initial (Supine)"));
    }
    if let Some(heart_rate) = lowest_supine_pr {
        points.push(pre_test_point(LOWEST_SUPINE_TIME, heart_rate, "Lowest Supine"));
    }

    points.extend(ledger.iter().map(|m| ChartPoint {
        time: m.chart_time(),
        heart_rate: m.pulse_rate,
        label: format!("{} (Standing)", m.label()),
        is_pre_test: false,
        trend_value: None,
    }));

    points.sort_by(|a, b| a.time.total_cmp(&b.time));
    points
}

/// Least-squares line through the standing points only.
///
/// Needs at least two standing points at distinct times.
pub fn fit_trend(points: &[ChartPoint]) -> Option<TrendLine> {
    let standing: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| !p.is_pre_test)
        .map(|p| (p.time, f64::from(p.heart_rate)))
        .collect();

    if standing.len() < 2 {
        return None;
    }

    let n = standing.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = standing.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), &(x, y)| (sx + x, sy + y, sxy + x * y, sxx + x * x),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(TrendLine { slope, intercept })
}

/// Attach the standing trend value to every point, pre-test ones included.
/// Points are returned untouched when no trend can be fitted.
pub fn attach_trend(mut points: Vec<ChartPoint>) -> Vec<ChartPoint> {
    if let Some(trend) = fit_trend(&points) {
        for point in &mut points {
            point.trend_value = Some(trend.value_at(point.time));
        }
    }
    points
}

fn pre_test_point(time: f64, heart_rate: u32, label: &str) -> ChartPoint {
    ChartPoint {
        time,
        heart_rate,
        label: label.to_string(),
        is_pre_test: true,
        trend_value: None,
    }
}
