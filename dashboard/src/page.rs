use dashboard_cli_types::TableKind;

use crate::chart::SummaryChart;
use crate::data::{Dataset, ReportData};
use crate::error::DashboardError;
use crate::filter::FilterState;
use crate::formatter::{ColumnFormatter, FormatRule};
use crate::header::{HeaderBuilder, StatisticsHeader};
use crate::table::{self, SortSpec, TableModel};

/// All tables in the order they appear on the page.
pub const ALL_TABLES: [TableKind; 4] = [
    TableKind::Apdex,
    TableKind::Statistics,
    TableKind::Errors,
    TableKind::Top5Errors,
];

/// How one of the standard tables is formatted, sorted and filtered.
pub struct TableDescriptor {
    pub kind: TableKind,
    pub title: &'static str,
    pub formatter: ColumnFormatter,
    pub default_sort: SortSpec,
    pub series_column: usize,
    pub header: Option<&'static dyn HeaderBuilder>,
}

impl TableDescriptor {
    pub fn for_kind(kind: TableKind) -> TableDescriptor {
        match kind {
            TableKind::Apdex => TableDescriptor {
                kind,
                title: "APDEX (Application Performance Index)",
                formatter: ColumnFormatter::new()
                    .with_rule(0, FormatRule::Fixed(3))
                    .with_rules([1, 2], FormatRule::Duration),
                default_sort: SortSpec::ascending(0),
                series_column: 3,
                header: None,
            },
            TableKind::Statistics => TableDescriptor {
                kind,
                title: "Statistics",
                formatter: ColumnFormatter::new()
                    .with_rule(3, FormatRule::Percentage(2))
                    .with_rules([4, 7, 8, 9, 10, 11, 12, 13], FormatRule::Fixed(2)),
                default_sort: SortSpec::ascending(0),
                series_column: 0,
                header: Some(&StatisticsHeader),
            },
            TableKind::Errors => TableDescriptor {
                kind,
                title: "Errors",
                formatter: ColumnFormatter::new().with_rules([2, 3], FormatRule::Percentage(2)),
                default_sort: SortSpec::descending(1),
                series_column: 0,
                header: None,
            },
            TableKind::Top5Errors => TableDescriptor {
                kind,
                title: "Top 5 Errors by sampler",
                formatter: ColumnFormatter::new(),
                default_sort: SortSpec::ascending(0),
                series_column: 0,
                header: None,
            },
        }
    }

    pub fn dataset<'a>(&self, data: &'a ReportData) -> Option<&'a Dataset> {
        match self.kind {
            TableKind::Apdex => data.apdex.as_ref(),
            TableKind::Statistics => data.statistics.as_ref(),
            TableKind::Errors => data.errors.as_ref(),
            TableKind::Top5Errors => data.top5_errors_by_sampler.as_ref(),
        }
    }

    pub fn render(
        &self,
        dataset: &Dataset,
        filter_state: &FilterState,
    ) -> Result<TableModel, DashboardError> {
        table::render(
            dataset,
            &self.formatter,
            &self.default_sort,
            self.series_column,
            self.header,
            filter_state,
            self.title,
        )
    }
}

pub struct RenderedTable {
    pub kind: TableKind,
    pub title: &'static str,
    pub table: Result<TableModel, DashboardError>,
}

/// One render pass over the page. Tables missing from the input are absent.
pub struct RenderedPage {
    pub tables: Vec<RenderedTable>,
    pub chart: Option<SummaryChart>,
    pub filter_description: Option<String>,
}

impl RenderedPage {
    pub fn failed_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.table.is_err()).count()
    }
}

/// The dashboard page: input data plus the filter toggles shared by every table.
pub struct ReportPage {
    data: ReportData,
    filter_state: FilterState,
    tables: Vec<TableKind>,
}

impl ReportPage {
    pub fn new(data: ReportData) -> ReportPage {
        ReportPage {
            data,
            filter_state: FilterState::default(),
            tables: ALL_TABLES.to_vec(),
        }
    }

    /// Restrict the page to `kinds`, kept in page order. An empty selection
    /// means every table.
    #[must_use]
    pub fn with_tables(mut self, kinds: &[TableKind]) -> ReportPage {
        self.tables = if kinds.is_empty() {
            ALL_TABLES.to_vec()
        } else {
            ALL_TABLES
                .into_iter()
                .filter(|k| kinds.contains(k))
                .collect()
        };
        self
    }

    #[must_use]
    pub fn with_filter_state(mut self, filter_state: FilterState) -> ReportPage {
        self.filter_state = filter_state;
        self
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter_state
    }

    pub fn set_series_pattern(&mut self, pattern: impl Into<String>) {
        self.filter_state.set_series_pattern(pattern);
    }

    pub fn set_filters_only_sample_series(&mut self, value: bool) {
        self.filter_state.set_filters_only_sample_series(value);
    }

    pub fn set_show_controllers_only(&mut self, value: bool) {
        self.filter_state.set_show_controllers_only(value);
    }

    pub fn data(&self) -> &ReportData {
        &self.data
    }

    /// Render every selected table and the summary chart. A table that fails
    /// keeps its error in the result; the others are unaffected.
    pub fn render(&self) -> RenderedPage {
        let tables = self
            .tables
            .iter()
            .filter_map(|&kind| {
                let descriptor = TableDescriptor::for_kind(kind);
                let Some(dataset) = descriptor.dataset(&self.data) else {
                    log::warn!("No data for table '{}', skipping", descriptor.title);
                    return None;
                };
                let table = descriptor.render(dataset, &self.filter_state);
                match &table {
                    Ok(model) => log::info!(
                        "Rendered table '{}' with {} rows",
                        descriptor.title,
                        model.rows.len()
                    ),
                    Err(e) => log::error!("{}", e),
                }
                Some(RenderedTable {
                    kind,
                    title: descriptor.title,
                    table,
                })
            })
            .collect();

        let chart = match &self.data.requests_summary {
            Some(summary) => Some(SummaryChart::from_summary(summary)),
            None => {
                log::warn!("No requests summary, skipping summary chart");
                None
            }
        };

        RenderedPage {
            tables,
            chart,
            filter_description: self.filter_state.describe(),
        }
    }
}
