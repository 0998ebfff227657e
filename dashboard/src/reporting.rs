use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use dashboard_cli_types::TableKind;
use itertools::Itertools;
use plotly::Plot;

use crate::{
    chart::SummaryChart,
    data::ReportData,
    defaults::{DEFAULT_REPORT_TITLE, SUMMARY_CHART_TITLE},
    error::DashboardError,
    filter::FilterState,
    page::{RenderedPage, RenderedTable, ReportPage},
    table::{TableModel, TableRow},
};

const JQUERY_URL: &str = "https://code.jquery.com/jquery-3.7.1.min.js";
const TABLESORTER_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/jquery.tablesorter/2.31.3/js/jquery.tablesorter.combined.min.js";
const TABLESORTER_THEME_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/jquery.tablesorter/2.31.3/css/theme.blue.min.css";

/// Element id of the summary chart container.
const SUMMARY_CHART_DIV_ID: &str = "requests-summary";

/// Initialises every dashboard table with its `data-sortlist`.
const SORTER_INIT_SCRIPT: &str = r#"<script>
$(function() {
    $("table.dashboard-table").each(function() {
        $(this).tablesorter({
            theme: "blue",
            cssInfoBlock: "tablesorter-no-sort",
            widthFixed: true,
            widgets: ["zebra"],
            sortList: $(this).data("sortlist")
        });
    });
});
</script>"#;

/// Default HTML template used when no custom template is provided.
const DEFAULT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{TITLE}}</title>
    {{HEAD}}
    <style>{{CUSTOM_CSS}}</style>
</head>
<body>
    <h1>{{TITLE}}</h1>
    <p class="dashboard-meta">Generated {{TIMESTAMP}} from {{SOURCE}}</p>
    <p class="dashboard-filter">{{FILTER}}</p>
    {{SUMMARY_CHART}}
    {{TABLES}}
</body>
</html>"#;

/// Metadata for rendering report templates
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMetadata {
    pub title: String,
    pub custom_css: String,
    pub timestamp: String,
    pub source: String,
    pub filter: String,
}

impl ReportMetadata {
    pub fn new(
        title: Option<String>,
        custom_css: String,
        source: &Path,
        filter_description: Option<&str>,
    ) -> ReportMetadata {
        ReportMetadata {
            title: title.unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string()),
            custom_css,
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            source: source.display().to_string(),
            filter: filter_description.unwrap_or("No filter").to_string(),
        }
    }
}

impl Default for ReportMetadata {
    fn default() -> Self {
        ReportMetadata {
            title: DEFAULT_REPORT_TITLE.to_string(),
            custom_css: String::new(),
            timestamp: String::new(),
            source: String::new(),
            filter: String::new(),
        }
    }
}

/// Template, stylesheet and title, already merged from command line and config.
#[derive(Debug, Clone, Default)]
pub struct ReportTemplateConfig {
    pub template_path: Option<PathBuf>,
    pub custom_css_path: Option<PathBuf>,
    pub title: Option<String>,
}

pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Projects a rendered page onto an output format.
pub trait Reporter {
    fn add_metadata(&mut self, metadata: &ReportMetadata);
    fn add_chart(&mut self, chart: &SummaryChart);
    fn add_table(&mut self, table: &RenderedTable);
    fn as_bytes(&self) -> Vec<u8>;

    fn add_page(&mut self, page: &RenderedPage) {
        if let Some(chart) = &page.chart {
            self.add_chart(chart);
        }
        for table in &page.tables {
            self.add_table(table);
        }
    }
}

pub struct HtmlReporter {
    template: Option<String>,
    metadata: ReportMetadata,
    chart: Option<String>,
    tables: Vec<String>,
}

impl HtmlReporter {
    pub fn new(template: Option<String>) -> HtmlReporter {
        HtmlReporter {
            template,
            metadata: ReportMetadata::default(),
            chart: None,
            tables: vec![],
        }
    }

    fn head() -> String {
        [
            Plot::online_cdn_js(),
            format!(r#"<link rel="stylesheet" href="{}">"#, TABLESORTER_THEME_URL),
            format!(r#"<script src="{}"></script>"#, JQUERY_URL),
            format!(r#"<script src="{}"></script>"#, TABLESORTER_URL),
            SORTER_INIT_SCRIPT.to_string(),
        ]
        .join("\n")
    }
}

fn html_row(row: &TableRow) -> String {
    let cells = row
        .cells
        .iter()
        .map(|c| format!("<td>{}</td>", html_escape(&c.text)))
        .join("");
    if row.is_controller {
        format!(r#"<tr class="controller">{}</tr>"#, cells)
    } else {
        format!("<tr>{}</tr>", cells)
    }
}

fn html_table(id: &str, model: &TableModel) -> String {
    let mut html = format!(
        r#"<table id="{}" class="dashboard-table tablesorter" data-sortlist="{}">"#,
        id, model.default_sort
    );
    html.push_str("\n<thead>\n");
    if let Some(groups) = &model.extra_header {
        let cells = groups
            .iter()
            .map(|g| {
                format!(
                    r#"<th colspan="{}" class="sorter-false">{}</th>"#,
                    g.column_span,
                    html_escape(&g.label)
                )
            })
            .join("");
        html.push_str(&format!(
            r#"<tr class="tablesorter-no-sort tablesorter-ignoreRow">{}</tr>"#,
            cells
        ));
        html.push('\n');
    }
    let titles = model
        .titles
        .iter()
        .map(|t| format!("<th>{}</th>", html_escape(t)))
        .join("");
    html.push_str(&format!("<tr>{}</tr>\n</thead>\n", titles));

    if let Some(overall) = &model.overall {
        html.push_str(&format!(
            "<tbody class=\"tablesorter-no-sort\">\n{}\n</tbody>\n",
            html_row(overall)
        ));
    }

    html.push_str("<tbody>\n");
    for row in model.sorted_rows() {
        html.push_str(&html_row(row));
        html.push('\n');
    }
    html.push_str("</tbody>\n</table>");
    html
}

fn table_id(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Apdex => "apdexTable",
        TableKind::Statistics => "statisticsTable",
        TableKind::Errors => "errorsTable",
        TableKind::Top5Errors => "top5ErrorsBySamplerTable",
    }
}

impl Reporter for HtmlReporter {
    fn add_metadata(&mut self, metadata: &ReportMetadata) {
        self.metadata = metadata.clone();
    }

    fn add_chart(&mut self, chart: &SummaryChart) {
        if chart.is_empty() {
            log::warn!("Requests summary has no positive shares, skipping chart");
            return;
        }
        self.chart = Some(chart.to_inline_html(SUMMARY_CHART_DIV_ID));
    }

    fn add_table(&mut self, table: &RenderedTable) {
        let body = match &table.table {
            Ok(model) => html_table(table_id(table.kind), model),
            Err(e) => format!(
                r#"<div class="dashboard-error">Could not render table: {}</div>"#,
                html_escape(&e.to_string())
            ),
        };
        self.tables.push(format!(
            "<section class=\"dashboard-section\">\n<h2>{}</h2>\n{}\n</section>",
            html_escape(table.title),
            body
        ));
    }

    fn as_bytes(&self) -> Vec<u8> {
        let template = self.template.as_deref().unwrap_or(DEFAULT_HTML_TEMPLATE);
        let chart = self.chart.as_deref().unwrap_or_default();

        template
            .replace("{{TITLE}}", &html_escape(&self.metadata.title))
            .replace("{{HEAD}}", &HtmlReporter::head())
            .replace("{{CUSTOM_CSS}}", &self.metadata.custom_css)
            .replace("{{TIMESTAMP}}", &self.metadata.timestamp)
            .replace("{{SOURCE}}", &html_escape(&self.metadata.source))
            .replace("{{FILTER}}", &html_escape(&self.metadata.filter))
            .replace("{{SUMMARY_CHART}}", chart)
            .replace("{{TABLES}}", &self.tables.join("\n"))
            .into_bytes()
    }
}

/// Tab-delimited dump of a page, one block per table.
#[derive(Default)]
pub struct CsvReporter {
    blocks: Vec<Vec<String>>,
}

impl CsvReporter {
    pub fn new() -> Self {
        CsvReporter::default()
    }
}

fn csv_field(text: &str) -> String {
    text.replace(['\t', '\n'], " ")
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields.into_iter().map(csv_field).join("\t")
}

impl Reporter for CsvReporter {
    fn add_metadata(&mut self, metadata: &ReportMetadata) {
        let mut block = vec![format!("# {}", csv_field(&metadata.title))];
        if !metadata.filter.is_empty() {
            block.push(format!("# filter: {}", csv_field(&metadata.filter)));
        }
        self.blocks.push(block);
    }

    fn add_chart(&mut self, chart: &SummaryChart) {
        let mut block = vec![format!("## {}", SUMMARY_CHART_TITLE)];
        block.extend(
            chart
                .slices()
                .iter()
                .map(|s| format!("{}\t{}", s.label, s.percent_label())),
        );
        self.blocks.push(block);
    }

    fn add_table(&mut self, table: &RenderedTable) {
        let mut block = vec![format!("## {}", table.title)];
        match &table.table {
            Ok(model) => {
                block.push(csv_line(model.titles.iter().map(String::as_str)));
                if let Some(overall) = &model.overall {
                    block.push(csv_line(overall.texts()));
                }
                block.extend(model.sorted_rows().into_iter().map(|r| csv_line(r.texts())));
            }
            Err(e) => block.push(format!("error\t{}", csv_field(&e.to_string()))),
        }
        self.blocks.push(block);
    }

    fn as_bytes(&self) -> Vec<u8> {
        if self.blocks.is_empty() {
            return Vec::new();
        }
        let mut output = self.blocks.iter().map(|b| b.join("\n")).join("\n\n");
        output.push('\n');
        output.into_bytes()
    }
}

pub struct ReporterFactory {}

impl ReporterFactory {
    pub fn from_file_name(path: &Path, template: Option<String>) -> Option<Box<dyn Reporter>> {
        if path == Path::new("-") {
            return Some(Box::new(CsvReporter::new()) as Box<dyn Reporter>);
        }
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.to_str()? {
            "html" => Some(Box::new(HtmlReporter::new(template)) as Box<dyn Reporter>),
            "csv" => Some(Box::new(CsvReporter::new()) as Box<dyn Reporter>),
            _ => None,
        }
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("html"))
        .unwrap_or(false)
}

/// Load template from file, `None` for the built-in template
fn load_template(template_path: Option<&PathBuf>) -> Result<Option<String>> {
    let Some(template_path) = template_path else {
        return Ok(None);
    };

    if !template_path.exists() {
        bail!("Template file not found: {}", template_path.display());
    }

    let content = fs::read_to_string(template_path)
        .with_context(|| format!("Failed to read template file {}", template_path.display()))?;
    Ok(Some(content))
}

/// Load custom CSS content from file
fn load_custom_css(custom_css_path: Option<&PathBuf>) -> Result<String> {
    let Some(css_path) = custom_css_path else {
        return Ok(String::new());
    };

    if !css_path.exists() {
        bail!("Custom CSS file not found: {}", css_path.display());
    }

    fs::read_to_string(css_path)
        .with_context(|| format!("Failed to read custom CSS file {}", css_path.display()))
}

pub fn load_report_data(input: &Path) -> Result<ReportData> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read report data {}", input.display()))?;
    ReportData::from_json(&json)
        .with_context(|| format!("Failed to parse report data {}", input.display()))
}

fn write_output(output: &Path, bytes: &[u8]) -> Result<()> {
    if output == Path::new("-") {
        match io::stdout().write_all(bytes) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            res => res,
        }?;
    } else {
        File::create(output)
            .and_then(|mut f| f.write_all(bytes))
            .with_context(|| format!("Failed to write report {}", output.display()))?;
    }
    Ok(())
}

/// Render the dashboard for `input` into `output`.
///
/// Tables that fail to render are replaced by an error notice and do not fail
/// the report.
pub fn report(
    input: &Path,
    output: &Path,
    filter_state: FilterState,
    tables: &[TableKind],
    template_config: ReportTemplateConfig,
) -> Result<()> {
    let data = load_report_data(input)?;

    let (template, custom_css) = if is_html(output) {
        (
            load_template(template_config.template_path.as_ref())?,
            load_custom_css(template_config.custom_css_path.as_ref())?,
        )
    } else {
        (None, String::new())
    };

    let mut reporter = ReporterFactory::from_file_name(output, template)
        .ok_or(anyhow!("Could not infer output format"))?;

    let page = ReportPage::new(data)
        .with_tables(tables)
        .with_filter_state(filter_state);
    let rendered = page.render();

    let metadata = ReportMetadata::new(
        template_config.title,
        custom_css,
        input,
        rendered.filter_description.as_deref(),
    );
    reporter.add_metadata(&metadata);
    reporter.add_page(&rendered);

    if rendered.failed_tables() > 0 {
        log::warn!(
            "{} of {} tables could not be rendered",
            rendered.failed_tables(),
            rendered.tables.len()
        );
    }

    write_output(output, &reporter.as_bytes())
}

/// Validate every table of `input` without writing a report. Prints one line
/// per table and fails if any table is malformed.
pub fn check(input: &Path) -> Result<()> {
    let data = load_report_data(input)?;
    let rendered = ReportPage::new(data).render();

    let mut stdout = io::stdout();
    let mut failures: Vec<&DashboardError> = vec![];
    for table in &rendered.tables {
        let line = match &table.table {
            Ok(model) => format!("ok\t{}\t{} rows", table.title, model.rows.len()),
            Err(e) => {
                failures.push(e);
                format!("error\t{}\t{}", table.title, e)
            }
        };
        match writeln!(stdout, "{}", line) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(()),
            res => res?,
        }
    }

    if !failures.is_empty() {
        bail!("{} table(s) are malformed", failures.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_report_data, SAMPLE_REPORT_JSON};
    use tempfile::TempDir;

    fn sample_page() -> RenderedPage {
        ReportPage::new(sample_report_data()).render()
    }

    fn html_for(page: &RenderedPage, template: Option<String>) -> String {
        let mut reporter = HtmlReporter::new(template);
        reporter.add_metadata(&ReportMetadata {
            title: "Run <42>".to_string(),
            custom_css: "body { color: red; }".to_string(),
            timestamp: "2024-01-01 00:00:00 UTC".to_string(),
            source: "report-data.json".to_string(),
            filter: "No filter".to_string(),
        });
        reporter.add_page(page);
        String::from_utf8(reporter.as_bytes()).unwrap()
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_reporter_factory_html_extension() {
        assert!(ReporterFactory::from_file_name(Path::new("out.html"), None).is_some());
    }

    #[test]
    fn test_reporter_factory_csv_extension() {
        assert!(ReporterFactory::from_file_name(Path::new("out.csv"), None).is_some());
    }

    #[test]
    fn test_reporter_factory_stdout() {
        assert!(ReporterFactory::from_file_name(Path::new("-"), None).is_some());
    }

    #[test]
    fn test_reporter_factory_unsupported_extension() {
        assert!(ReporterFactory::from_file_name(Path::new("out.pdf"), None).is_none());
    }

    #[test]
    fn test_reporter_factory_no_extension() {
        assert!(ReporterFactory::from_file_name(Path::new("output"), None).is_none());
    }

    #[test]
    fn test_reporter_factory_uppercase_extension() {
        assert!(ReporterFactory::from_file_name(Path::new("OUT.HTML"), None).is_some());
    }

    #[test]
    fn test_html_default_template() {
        let html = html_for(&sample_page(), None);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Run &lt;42&gt;</title>"));
        assert!(html.contains("body { color: red; }"));
        assert!(html.contains("2024-01-01 00:00:00 UTC"));
        assert!(html.contains("jquery.tablesorter"));
        assert!(html.contains("plotly"));
        assert!(html.contains(SUMMARY_CHART_DIV_ID));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_html_tables_markup() {
        let html = html_for(&sample_page(), None);
        assert!(html.contains(r#"id="statisticsTable""#));
        assert!(html.contains(r#"data-sortlist="[[1,1]]""#));
        assert!(html.contains(r#"<th colspan="7" class="sorter-false">Response Times (ms)</th>"#));
        assert!(html.contains("<h2>APDEX (Application Performance Index)</h2>"));
        assert!(html.contains("<tbody class=\"tablesorter-no-sort\">"));
        assert!(html.contains(r#"<tr class="controller"><td>SCENARIO: Patient Lifecycle</td>"#));
        assert!(html.contains("<td>0.07%</td>"));
    }

    #[test]
    fn test_html_error_notice() {
        let mut data = sample_report_data();
        if let Some(apdex) = data.apdex.as_mut() {
            apdex.titles.pop();
        }
        let html = html_for(&ReportPage::new(data).render(), None);
        assert!(html.contains("dashboard-error"));
        assert!(html.contains(r#"id="statisticsTable""#));
        assert!(!html.contains(r#"id="apdexTable""#));
    }

    #[test]
    fn test_html_custom_template() {
        let template = "<html>{{TITLE}}|{{FILTER}}|{{SOURCE}}{{TABLES}}</html>".to_string();
        let html = html_for(&sample_page(), Some(template));
        assert!(html.starts_with("<html>Run &lt;42&gt;|No filter|report-data.json<section"));
        assert!(!html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_csv_reporter_empty_on_init() {
        assert!(CsvReporter::new().as_bytes().is_empty());
    }

    #[test]
    fn test_csv_exact_errors_block() {
        let page = ReportPage::new(sample_report_data())
            .with_tables(&[TableKind::Errors])
            .render();
        let mut reporter = CsvReporter::new();
        reporter.add_page(&page);
        let output = String::from_utf8(reporter.as_bytes()).unwrap();
        assert_eq!(
            output,
            "## Requests Summary\nFAIL\t0.07%\nPASS\t99.93%\n\n\
             ## Errors\n\
             Type of error\tNumber of errors\t% in errors\t% in all samples\n\
             500\t3\t100.00%\t0.07%\n"
        );
    }

    #[test]
    fn test_csv_rows_follow_default_sort() {
        let page = ReportPage::new(sample_report_data())
            .with_tables(&[TableKind::Top5Errors])
            .render();
        let mut reporter = CsvReporter::new();
        reporter.add_table(&page.tables[0]);
        let output = String::from_utf8(reporter.as_bytes()).unwrap();
        let labels = output
            .lines()
            .skip(3)
            .map(|l| l.split('\t').next().unwrap_or(""))
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["DELETE Medecin", "GET Medecin", "POST Create Medecin"]);
    }

    #[test]
    fn test_report_writes_html_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("report-data.json");
        fs::write(&input, SAMPLE_REPORT_JSON).unwrap();
        let css = temp_dir.path().join("style.css");
        fs::write(&css, ".dashboard-table { width: 100%; }").unwrap();
        let output = temp_dir.path().join("dashboard.html");

        report(
            &input,
            &output,
            FilterState::default(),
            &[],
            ReportTemplateConfig {
                template_path: None,
                custom_css_path: Some(css),
                title: Some("Nightly".to_string()),
            },
        )
        .unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<title>Nightly</title>"));
        assert!(html.contains(".dashboard-table { width: 100%; }"));
        assert!(html.contains(r#"id="top5ErrorsBySamplerTable""#));
    }

    #[test]
    fn test_report_missing_template_fails() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("report-data.json");
        fs::write(&input, SAMPLE_REPORT_JSON).unwrap();

        let result = report(
            &input,
            &temp_dir.path().join("dashboard.html"),
            FilterState::default(),
            &[],
            ReportTemplateConfig {
                template_path: Some(temp_dir.path().join("missing.html")),
                ..Default::default()
            },
        );
        assert!(result.unwrap_err().to_string().contains("Template file not found"));
    }

    #[test]
    fn test_report_unknown_format_fails() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("report-data.json");
        fs::write(&input, SAMPLE_REPORT_JSON).unwrap();
        let result = report(
            &input,
            &temp_dir.path().join("dashboard.pdf"),
            FilterState::default(),
            &[],
            ReportTemplateConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_report_data_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.json");
        fs::write(&input, "{ not json").unwrap();
        let err = load_report_data(&input).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse report data"));
    }

    #[test]
    fn test_check_reports_malformed_tables() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("report-data.json");
        fs::write(&input, SAMPLE_REPORT_JSON).unwrap();
        assert!(check(&input).is_ok());

        let mut data = sample_report_data();
        if let Some(errors) = data.errors.as_mut() {
            errors.items[0].data.push(1.0.into());
        }
        fs::write(&input, serde_json::to_string(&data).unwrap()).unwrap();
        assert!(check(&input).is_err());
    }
}
