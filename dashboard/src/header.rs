use crate::error::DashboardError;

/// A cell of the grouping row drawn above the column titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGroup {
    pub label: String,
    pub column_span: usize,
}

impl HeaderGroup {
    pub fn new(label: &str, column_span: usize) -> HeaderGroup {
        HeaderGroup {
            label: label.to_string(),
            column_span,
        }
    }
}

/// Produces an extra, non-sortable header row for a table.
pub trait HeaderBuilder {
    fn build_extra_header(&self) -> Vec<HeaderGroup>;
}

impl<F> HeaderBuilder for F
where
    F: Fn() -> Vec<HeaderGroup>,
{
    fn build_extra_header(&self) -> Vec<HeaderGroup> {
        self()
    }
}

/// Groups the fourteen columns of the statistics table by category.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsHeader;

impl HeaderBuilder for StatisticsHeader {
    fn build_extra_header(&self) -> Vec<HeaderGroup> {
        vec![
            HeaderGroup::new("Requests", 1),
            HeaderGroup::new("Executions", 3),
            HeaderGroup::new("Response Times (ms)", 7),
            HeaderGroup::new("Throughput", 1),
            HeaderGroup::new("Network (KB/sec)", 2),
        ]
    }
}

pub fn total_span(groups: &[HeaderGroup]) -> usize {
    groups.iter().map(|g| g.column_span).sum()
}

/// Fails if the groups do not cover exactly `titles` columns.
pub fn check_header_span(
    groups: &[HeaderGroup],
    titles: usize,
    context: &str,
) -> Result<(), DashboardError> {
    let span = total_span(groups);
    if span != titles {
        return Err(DashboardError::HeaderSpanMismatch {
            context: context.to_string(),
            span,
            titles,
        });
    }
    Ok(())
}
