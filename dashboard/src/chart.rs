use itertools::Itertools;
use plotly::{common::Marker, common::Title, Layout, Pie, Plot};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::data::RequestsSummary;
use crate::defaults::{FAIL_COLOR, PASS_COLOR, SLICE_PERCENT_DECIMALS, SUMMARY_CHART_TITLE};

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    /// Share of all requests, in percent.
    pub value: f64,
    pub color: String,
}

impl PieSlice {
    fn new(label: &str, value: f64, color: &str) -> PieSlice {
        PieSlice {
            label: label.to_string(),
            value,
            color: color.to_string(),
        }
    }

    /// Percentage rounded to two decimals, e.g. `99.93%`.
    pub fn percent_label(&self) -> String {
        format!("{}%", round_to(self.value, SLICE_PERCENT_DECIMALS))
    }
}

/// Rounds the shortest decimal form of `value`, ties away from zero, and
/// drops trailing zeros. `1.005` becomes `1.01` even though the nearest `f64`
/// lies below the midpoint.
fn round_to(value: f64, decimals: u32) -> String {
    match value.to_string().parse::<Decimal>() {
        Ok(shortest) => shortest
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string(),
        Err(_) => value.to_string(),
    }
}

/// Two-slice pie of failed versus passed requests.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryChart {
    slices: Vec<PieSlice>,
}

impl SummaryChart {
    /// Slices are ordered FAIL then PASS. A slice without a positive, finite
    /// share is left out, so a run without failures yields a single PASS slice.
    pub fn new(pass_percent: f64, fail_percent: f64) -> SummaryChart {
        let slices = [
            ("FAIL", fail_percent, FAIL_COLOR),
            ("PASS", pass_percent, PASS_COLOR),
        ]
        .into_iter()
        .filter(|(_, value, _)| value.is_finite() && *value > 0.0)
        .map(|(label, value, color)| PieSlice::new(label, value, color))
        .collect();
        SummaryChart { slices }
    }

    pub fn from_summary(summary: &RequestsSummary) -> SummaryChart {
        SummaryChart::new(summary.ok_percent, summary.ko_percent)
    }

    pub fn slices(&self) -> &[PieSlice] {
        &self.slices
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn to_plot(&self) -> Plot {
        let mut plot = Plot::new();
        let (labels, values, colors, texts): (Vec<String>, Vec<f64>, Vec<String>, Vec<String>) =
            self.slices
                .iter()
                .map(|s| (s.label.clone(), s.value, s.color.clone(), s.percent_label()))
                .multiunzip();
        let trace = Pie::new(values)
            .labels(labels)
            .marker(Marker::new().color_array(colors))
            .sort(false)
            .text_array(texts)
            .text_info("label+text");
        plot.add_trace(trace);
        plot.set_layout(
            Layout::new()
                .title(Title::from(SUMMARY_CHART_TITLE))
                .show_legend(true),
        );
        plot
    }

    /// Standalone `<div>` with the chart, relying on the page to load plotly.js.
    pub fn to_inline_html(&self, div_id: &str) -> String {
        self.to_plot().to_inline_html(Some(div_id))
    }
}
