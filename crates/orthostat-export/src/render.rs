use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ExportError;
use crate::report::{CLINICAL_DISCLAIMER, ReportData};
use crate::styles::ReportOptions;

/// Plain-text summary for the clipboard or a `.txt` file.
pub const SUMMARY_TEMPLATE: &str = r#"NASA 10-Minute Lean Test Results
================================

Patient: {{ patient_name }}
Test Date: {{ test_date }}

Supine Baseline:
- Blood Pressure: {% if initial_bp %}{{ initial_bp }} mmHg{% else %}not recorded{% endif %}
- Initial Pulse Rate: {% if initial_pr %}{{ initial_pr }} bpm{% else %}not recorded{% endif %}
- Lowest Supine Pulse Rate: {% if lowest_supine_pr %}{{ lowest_supine_pr }} bpm{% else %}not recorded{% endif %}

Standing Measurements:
{% set recorded = measurements | length %}{% for m in measurements %}{{ m.time }}: {{ m.pulse_rate }} bpm{% if m.symptoms %} ({{ m.symptoms }}){% endif %}
{% endfor %}{% if recorded == 0 %}none recorded
{% endif %}
Results:
- Lowest HR: {{ stats.lowest }} bpm
- Highest HR: {{ stats.highest }} bpm
- Maximum ΔHR: {{ stats.delta }} bpm

Interpretation: {{ interpretation_text }}

Generated: {{ generated_at }}
"#;

/// Markdown-ish source that [`crate::docx::generate_docx`] lays out.
///
/// `| a | b |` lines become table rows and a lone `[chart]` line marks
/// where the chart image goes.
pub const REPORT_TEMPLATE: &str = r#"# {{ clinic.name }}
{% if clinic.address %}{{ clinic.address }}
{% endif %}{% if clinic.phone %}Phone: {{ clinic.phone }}
{% endif %}
## NASA 10-Minute Lean Test Report

**Patient:** {{ patient_name }}
**Test Date:** {{ test_date }}
**Result:** {{ interpretation }}

| Lowest HR | Highest HR | ΔHR |
| {{ stats.lowest }} bpm | {{ stats.highest }} bpm | +{{ stats.delta }} bpm |

### Baseline Measurements

| Measure | Value |
| Blood Pressure | {% if initial_bp %}{{ initial_bp }} mmHg{% else %}not recorded{% endif %} |
| Initial Pulse Rate | {% if initial_pr %}{{ initial_pr }} bpm{% else %}not recorded{% endif %} |
| Lowest Supine HR | {% if lowest_supine_pr %}{{ lowest_supine_pr }} bpm{% else %}not recorded{% endif %} |
| Measurements Recorded | {{ measurements | length }} |
{% if include_chart %}
### Heart Rate Response

[chart]
{% endif %}
### Standing Measurements

{% if include_symptoms %}| Time | Heart Rate | Symptoms |
{% for row in rows %}| {{ row.time }} | {{ row.pulse_rate }} bpm | {{ row.symptoms }} |
{% endfor %}{% if more > 0 %}| ... and {{ more }} more measurements | | |
{% endif %}{% else %}| Time | Heart Rate |
{% for row in rows %}| {{ row.time }} | {{ row.pulse_rate }} bpm |
{% endfor %}{% if more > 0 %}| ... and {{ more }} more measurements | |
{% endif %}{% endif %}{% if include_interpretation %}
### Clinical Interpretation

**{{ interpretation_text }}**
{{ interpretation_paragraph }}
{{ disclaimer }}
{% endif %}
Report generated on {{ generated_at }}
For questions about this report, please contact your healthcare provider
"#;

/// Render a Tera template against any serializable value.
pub fn render_template<T: Serialize>(
    template_name: &str,
    template_content: &str,
    value: &T,
) -> Result<String, ExportError> {
    let context = Context::from_value(serde_json::to_value(value)?)
        .map_err(|e| ExportError::TemplateRender(e.to_string()))?;
    render_with(template_name, template_content, &context)
}

/// The plain-text summary, one line per measurement in time order.
pub fn render_summary(data: &ReportData) -> Result<String, ExportError> {
    render_template("summary.txt", SUMMARY_TEMPLATE, data)
}

/// Report source text for [`crate::docx::generate_docx`].
pub fn render_report(
    data: &ReportData,
    options: &ReportOptions,
    has_chart: bool,
) -> Result<String, ExportError> {
    let (rows, more) = data.table_rows(options);
    let rows: Vec<_> = rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            // Cell text cannot contain the column separator.
            row.symptoms = row.symptoms.replace('|', "/");
            row
        })
        .collect();

    let mut context = Context::from_value(serde_json::to_value(data)?)
        .map_err(|e| ExportError::TemplateRender(e.to_string()))?;
    context.insert("rows", &rows);
    context.insert("more", &more);
    context.insert("include_chart", &(options.include_chart && has_chart));
    context.insert("include_symptoms", &options.include_symptoms);
    context.insert("include_interpretation", &options.include_interpretation);
    context.insert("interpretation_paragraph", &data.interpretation_paragraph());
    context.insert("disclaimer", CLINICAL_DISCLAIMER);

    render_with("report.md", REPORT_TEMPLATE, &context)
}

fn render_with(
    template_name: &str,
    template_content: &str,
    context: &Context,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
    Ok(tera.render(template_name, context)?)
}
