mod support;

use orthostat_export::chart::{render_png, render_svg};
use orthostat_export::naming::{chart_file_name, file_safe_name, report_file_name};

use support::{report_data, sample_run};

#[test]
fn png_has_requested_dimensions() {
    let data = report_data(&sample_run());
    let png = render_png(&data.series, 400, 200, [255, 255, 255]).unwrap();

    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 200));
}

#[test]
fn png_of_empty_series_keeps_background() {
    let png = render_png(&[], 300, 150, [250, 250, 240]).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(decoded.get_pixel(0, 0).0, [250, 250, 240]);
}

fn dark_pixels(png: &[u8], x: std::ops::Range<u32>, y: std::ops::Range<u32>) -> usize {
    let decoded = image::load_from_memory(png).unwrap().to_rgb8();
    y.flat_map(|py| x.clone().map(move |px| (px, py)))
        .filter(|&(px, py)| decoded.get_pixel(px, py).0.iter().all(|&c| c < 100))
        .count()
}

#[test]
fn png_carries_caption_and_axis_labels() {
    let data = report_data(&sample_run());
    let png = render_png(&data.series, 800, 400, [255, 255, 255]).unwrap();

    // Caption band above the plotting area.
    assert!(dark_pixels(&png, 200..600, 0..40) > 50);
    // Rate tick labels and axis description left of the plotting area.
    assert!(dark_pixels(&png, 0..60, 60..340) > 50);
}

#[test]
fn zero_sized_canvas_is_an_error() {
    assert!(render_png(&[], 0, 100, [255, 255, 255]).is_err());
    assert!(render_png(&[], 5000, 5000, [255, 255, 255]).is_err());
}

#[test]
fn svg_is_a_document() {
    let data = report_data(&sample_run());
    let svg = render_svg(&data.series, 800, 400).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("Heart Rate Response"));
    assert!(svg.contains("Time (minutes)"));
}

#[test]
fn file_names_hyphenate_whitespace() {
    let date = jiff::civil::date(2025, 3, 14);
    assert_eq!(file_safe_name(" Jane \t Q  Doe "), "Jane-Q-Doe");
    assert_eq!(
        chart_file_name("pots-chart", "Jane  Doe", date),
        "pots-chart-Jane-Doe-2025-03-14.png"
    );
    assert_eq!(report_file_name("Jane Doe", date), "POTS-Report-Jane-Doe-2025-03-14.docx");
}
