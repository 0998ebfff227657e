/// Contract violations detected while turning a dataset into a table.
///
/// A table that fails with one of these is not rendered. Other tables of the
/// same page are unaffected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error("{context}: {row} row has {actual} cells but the table has {expected} titles")]
    MalformedDataset {
        context: String,
        row: String,
        expected: usize,
        actual: usize,
    },

    #[error("{context}: header groups span {span} columns but the table has {titles} titles")]
    HeaderSpanMismatch {
        context: String,
        span: usize,
        titles: usize,
    },

    #[error("{context}: series column {column} is out of range for {titles} titles")]
    SeriesColumnOutOfRange {
        context: String,
        column: usize,
        titles: usize,
    },
}
