use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, PageMargin, PageOrientationType, Paragraph, Pic, Run,
    RunFonts, Style, StyleType, Table, TableCell, TableRow,
};
use tracing::info;

use crate::error::ExportError;
use crate::render::render_report;
use crate::report::ReportData;
use crate::styles::{DocumentStyles, Orientation, ReportOptions};

const EMU_PER_TWIP: u32 = 635;

/// Marker line replaced by the chart image.
pub const CHART_MARKER: &str = "[chart]";

/// Build the DOCX report for a run.
///
/// Without `chart_png` the chart section is left out entirely.
pub fn generate_report(
    data: &ReportData,
    options: &ReportOptions,
    styles: &DocumentStyles,
    chart_png: Option<&[u8]>,
) -> Result<Vec<u8>, ExportError> {
    data.require_patient_name()?;
    styles.validate()?;

    let chart_png = chart_png.filter(|_| options.include_chart);
    let rendered = render_report(data, options, chart_png.is_some())?;
    let bytes = generate_docx(&rendered, styles, options, chart_png)?;

    info!(
        measurements = data.measurements.len(),
        chart = chart_png.is_some(),
        bytes = bytes.len(),
        "report generated"
    );
    Ok(bytes)
}

/// Generate a DOCX document from rendered Markdown-ish template output.
///
/// The `rendered` content uses a simple subset:
/// - `# Heading` → DOCX Heading 1
/// - `## Heading` → DOCX Heading 2
/// - `### Heading` → DOCX Heading 3
/// - `- item` → bullet list item (prefixed with bullet character)
/// - `| a | b |` → table row; consecutive rows form one table, the first
///   row bold
/// - `[chart]` → the chart image, when one is supplied
/// - `**bold**` → bold run
/// - `---` or `***` → page break
/// - Everything else → normal paragraph
pub fn generate_docx(
    rendered: &str,
    styles: &DocumentStyles,
    options: &ReportOptions,
    chart_png: Option<&[u8]>,
) -> Result<Vec<u8>, ExportError> {
    let (page_width, page_height) = options.page_twips();
    let margin = (styles.margin_inches * 1440.0).round() as i32;

    let mut docx = Docx::new()
        .page_size(page_width, page_height)
        .page_margin(
            PageMargin::new()
                .top(margin)
                .bottom(margin)
                .left(margin)
                .right(margin),
        )
        .add_style(heading_style("Heading1", "heading 1", styles.heading1_size, styles))
        .add_style(heading_style("Heading2", "heading 2", styles.heading2_size, styles))
        .add_style(heading_style("Heading3", "heading 3", styles.heading3_size, styles));
    if options.orientation == Orientation::Landscape {
        docx = docx.page_orient(PageOrientationType::Landscape);
    }

    let content_width = page_width.saturating_sub(2 * margin.max(0) as u32);
    let mut table: Vec<Vec<String>> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();

        if let Some(cells) = table_cells(trimmed) {
            table.push(cells);
            continue;
        }
        if !table.is_empty() {
            docx = docx.add_table(build_table(&std::mem::take(&mut table), styles));
        }

        if trimmed.is_empty() {
            docx = docx.add_paragraph(Paragraph::new());
            continue;
        }

        if trimmed == CHART_MARKER {
            if let Some(png) = chart_png {
                docx = docx.add_paragraph(chart_paragraph(png, content_width));
            }
        } else if let Some(text) = trimmed.strip_prefix("### ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading3"));
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading2"));
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            docx = docx.add_paragraph(heading_paragraph(text, "Heading1"));
        } else if let Some(text) = trimmed.strip_prefix("- ") {
            docx = docx.add_paragraph(bullet_paragraph(text, styles));
        } else if trimmed == "---" || trimmed == "***" {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
            );
        } else {
            docx = docx.add_paragraph(body_paragraph(trimmed, styles));
        }
    }
    if !table.is_empty() {
        docx = docx.add_table(build_table(&table, styles));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

/// Cells of a `| a | b |` line, or `None` for any other line.
pub fn table_cells(line: &str) -> Option<Vec<String>> {
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    Some(inner.split('|').map(|c| c.trim().to_string()).collect())
}

fn heading_style(style_id: &str, name: &str, size_pt: usize, styles: &DocumentStyles) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size_pt * 2) // OOXML uses half-points
        .bold()
        .fonts(RunFonts::new().ascii(&styles.heading_font))
}

fn heading_paragraph(text: &str, style_id: &str) -> Paragraph {
    Paragraph::new()
        .style(style_id)
        .add_run(Run::new().add_text(text))
}

fn chart_paragraph(png: &[u8], width_twips: u32) -> Paragraph {
    let width = width_twips * EMU_PER_TWIP;
    let pic = Pic::new(png).size(width, width / 2);
    Paragraph::new()
        .align(AlignmentType::Center)
        .add_run(Run::new().add_image(pic))
}

fn build_table(rows: &[Vec<String>], styles: &DocumentStyles) -> Table {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            TableRow::new(
                cells
                    .iter()
                    .map(|text| {
                        let mut run = Run::new()
                            .add_text(text)
                            .size(styles.table_size * 2)
                            .fonts(RunFonts::new().ascii(&styles.body_font));
                        if i == 0 {
                            run = run.bold();
                        }
                        TableCell::new().add_paragraph(Paragraph::new().add_run(run))
                    })
                    .collect(),
            )
        })
        .collect();
    Table::new(rows)
}

fn bullet_paragraph(text: &str, styles: &DocumentStyles) -> Paragraph {
    let bullet_run = Run::new()
        .add_text("\u{2022} ")
        .fonts(RunFonts::new().ascii(&styles.body_font));

    let mut para = Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(bullet_run);

    for run in parse_inline(text, styles) {
        para = para.add_run(run);
    }

    para
}

fn body_paragraph(text: &str, styles: &DocumentStyles) -> Paragraph {
    let mut para = Paragraph::new().align(AlignmentType::Left);
    for run in parse_inline(text, styles) {
        para = para.add_run(run);
    }
    para
}

fn body_run(text: &str, styles: &DocumentStyles) -> Run {
    Run::new()
        .add_text(text)
        .size(styles.body_size * 2)
        .fonts(RunFonts::new().ascii(&styles.body_font))
}

/// Parse simple inline formatting: **bold** segments.
fn parse_inline(text: &str, styles: &DocumentStyles) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("**") {
        let before = &remaining[..start];
        if !before.is_empty() {
            runs.push(body_run(before, styles));
        }

        let after_start = &remaining[start + 2..];
        if let Some(end) = after_start.find("**") {
            runs.push(body_run(&after_start[..end], styles).bold());
            remaining = &after_start[end + 2..];
        } else {
            // No closing **, treat rest as normal text
            runs.push(body_run(remaining, styles));
            return runs;
        }
    }

    if !remaining.is_empty() {
        runs.push(body_run(remaining, styles));
    }

    runs
}
