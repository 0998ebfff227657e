use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::data::{Dataset, Row};
use crate::defaults;

/// Page-wide filter toggles. Owned by the page and read by every table render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Regex matched case-insensitively against the series column. Empty means no filtering.
    pub series_pattern: String,
    /// When set, tables without controller discrimination ignore the series pattern.
    pub filters_only_sample_series: bool,
    /// Restrict controller-discriminating tables to controller rows.
    pub show_controllers_only: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            series_pattern: String::new(),
            filters_only_sample_series: defaults::DEFAULT_FILTERS_ONLY_SAMPLE_SERIES,
            show_controllers_only: defaults::DEFAULT_SHOW_CONTROLLERS_ONLY,
        }
    }
}

impl FilterState {
    pub fn set_series_pattern(&mut self, pattern: impl Into<String>) {
        self.series_pattern = pattern.into();
    }

    pub fn set_filters_only_sample_series(&mut self, value: bool) {
        self.filters_only_sample_series = value;
    }

    pub fn set_show_controllers_only(&mut self, value: bool) {
        self.show_controllers_only = value;
    }

    /// One line summary of the active filters, `None` when nothing is filtered.
    pub fn describe(&self) -> Option<String> {
        let mut parts = vec![];
        if !self.series_pattern.is_empty() {
            let scope = if self.filters_only_sample_series {
                "sample series"
            } else {
                "all series"
            };
            parts.push(format!("series matching '{}' ({})", self.series_pattern, scope));
        }
        if self.show_controllers_only {
            parts.push("controllers only".to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Compile a series pattern into a case-insensitive regex.
/// Returns `None` for an empty pattern.
pub fn compile_series_pattern(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .with_context(|| format!("Invalid regex pattern: '{}'", pattern))
}

/// Visibility predicate for the rows of one render pass. The pattern is
/// compiled once on construction.
#[derive(Debug)]
pub struct SeriesFilter<'a> {
    state: &'a FilterState,
    regex: Option<Regex>,
}

impl<'a> SeriesFilter<'a> {
    /// An invalid pattern is logged and treated as no pattern.
    pub fn new(state: &'a FilterState) -> SeriesFilter<'a> {
        let regex = match compile_series_pattern(&state.series_pattern) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("{:#}, showing all series", e);
                None
            }
        };
        SeriesFilter { state, regex }
    }

    pub fn is_visible(&self, row: &Row, series_column: usize, dataset: &Dataset) -> bool {
        if row.is_placeholder() {
            return false;
        }

        let matches_pattern = match &self.regex {
            None => true,
            Some(_)
                if self.state.filters_only_sample_series
                    && !dataset.supports_controllers_discrimination =>
            {
                true
            }
            Some(regex) => {
                let series = row
                    .data
                    .get(series_column)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                regex.is_match(&series)
            }
        };

        let matches_controller = !self.state.show_controllers_only
            || !dataset.supports_controllers_discrimination
            || row.is_controller;

        matches_pattern && matches_controller
    }
}

/// Single-row convenience form of [`SeriesFilter::is_visible`].
pub fn is_visible(
    row: &Row,
    series_column: usize,
    dataset: &Dataset,
    filter_state: &FilterState,
) -> bool {
    SeriesFilter::new(filter_state).is_visible(row, series_column, dataset)
}
