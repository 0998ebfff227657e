use std::cmp::Ordering;
use std::fmt::{self, Display};

use itertools::Itertools;

use crate::data::{CellValue, Dataset, Row};
use crate::error::DashboardError;
use crate::filter::{FilterState, SeriesFilter};
use crate::formatter::ValueFormatter;
use crate::header::{check_header_span, HeaderBuilder, HeaderGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Numeric code understood by the table sorter (0 ascending, 1 descending).
    pub fn code(self) -> u8 {
        match self {
            SortDirection::Ascending => 0,
            SortDirection::Descending => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

/// Default sort order applied once when a table is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn new(keys: &[(usize, SortDirection)]) -> SortSpec {
        SortSpec(
            keys.iter()
                .map(|&(column, direction)| SortKey { column, direction })
                .collect(),
        )
    }

    pub fn ascending(column: usize) -> SortSpec {
        SortSpec::new(&[(column, SortDirection::Ascending)])
    }

    pub fn descending(column: usize) -> SortSpec {
        SortSpec::new(&[(column, SortDirection::Descending)])
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }
}

/// Renders as the sorter's `[[column,direction],...]` notation.
impl Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .0
            .iter()
            .map(|k| format!("[{},{}]", k.column, k.direction.code()))
            .join(",");
        write!(f, "[{}]", pairs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub raw: CellValue,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    pub is_controller: bool,
}

impl TableRow {
    fn from_row(row: &Row, formatter: &dyn ValueFormatter) -> TableRow {
        let cells = row
            .data
            .iter()
            .enumerate()
            .map(|(column, value)| Cell {
                raw: value.clone(),
                text: formatter.format(column, value),
            })
            .collect();
        TableRow {
            cells,
            is_controller: row.is_controller,
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

/// A rendered table, independent of the surface it will be drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub extra_header: Option<Vec<HeaderGroup>>,
    pub titles: Vec<String>,
    /// Pinned summary row, never filtered or sorted.
    pub overall: Option<TableRow>,
    /// Visible item rows in dataset order.
    pub rows: Vec<TableRow>,
    pub default_sort: SortSpec,
}

impl TableModel {
    /// Rows in the order the default sort produces. The sort is stable, so rows
    /// that compare equal keep their dataset order.
    pub fn sorted_rows(&self) -> Vec<&TableRow> {
        let mut rows = self.rows.iter().collect_vec();
        if self.default_sort.keys().is_empty() {
            return rows;
        }
        rows.sort_by(|a, b| {
            self.default_sort
                .keys()
                .iter()
                .map(|key| {
                    let ordering = compare_cells(
                        a.cells.get(key.column).map(|c| &c.raw),
                        b.cells.get(key.column).map(|c| &c.raw),
                    );
                    match key.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        rows
    }
}

/// Numbers sort before text, numbers numerically, text case-insensitively.
fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (Some(CellValue::Number(x)), Some(CellValue::Number(y))) => x.total_cmp(y),
        (Some(CellValue::Number(_)), Some(CellValue::Text(_))) => Ordering::Less,
        (Some(CellValue::Text(_)), Some(CellValue::Number(_))) => Ordering::Greater,
        (Some(CellValue::Text(x)), Some(CellValue::Text(y))) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Build the table model for `dataset`.
///
/// The extra header (if any) and the title row come first, then the overall
/// row formatted but unfiltered, then every item that passes the series filter
/// in dataset order. Nothing is cached between calls: rendering again after a
/// filter change re-evaluates every row.
///
/// # Errors
/// Fails when a row does not have one cell per title, when the header groups
/// do not span the titles exactly, or when the series column does not exist.
pub fn render(
    dataset: &Dataset,
    formatter: &dyn ValueFormatter,
    default_sort: &SortSpec,
    series_column: usize,
    header_builder: Option<&dyn HeaderBuilder>,
    filter_state: &FilterState,
    context: &str,
) -> Result<TableModel, DashboardError> {
    dataset.validate(context)?;

    if !dataset.titles.is_empty() && series_column >= dataset.titles.len() {
        return Err(DashboardError::SeriesColumnOutOfRange {
            context: context.to_string(),
            column: series_column,
            titles: dataset.titles.len(),
        });
    }

    let extra_header = match header_builder {
        Some(builder) => {
            let groups = builder.build_extra_header();
            check_header_span(&groups, dataset.titles.len(), context)?;
            Some(groups)
        }
        None => None,
    };

    let overall = dataset
        .overall
        .as_ref()
        .map(|row| TableRow::from_row(row, formatter));

    let filter = SeriesFilter::new(filter_state);
    let rows = dataset
        .items
        .iter()
        .filter(|item| filter.is_visible(item, series_column, dataset))
        .map(|item| TableRow::from_row(item, formatter))
        .collect_vec();

    log::debug!(
        "{}: {} of {} items visible",
        context,
        rows.len(),
        dataset.items.len()
    );

    Ok(TableModel {
        extra_header,
        titles: dataset.titles.clone(),
        overall,
        rows,
        default_sort: default_sort.clone(),
    })
}
