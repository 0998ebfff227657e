use std::collections::BTreeMap;
use std::time::Duration;

use human_repr::HumanDuration;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::data::CellValue;

/// How a single column is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatRule {
    #[default]
    Identity,
    /// Round to the given number of decimals, ties away from zero.
    Fixed(usize),
    /// Round to the given number of decimals and append `%`.
    Percentage(usize),
    /// Millisecond count rendered as a human readable duration.
    Duration,
}

impl FormatRule {
    /// Formats `value` according to this rule. Values the rule cannot handle
    /// (text where a number is expected, NaN, negative durations) are rendered
    /// unchanged.
    pub fn apply(&self, value: &CellValue) -> String {
        if *self == FormatRule::Identity {
            return value.to_string();
        }
        let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
            return value.to_string();
        };

        match self {
            FormatRule::Identity => value.to_string(),
            FormatRule::Fixed(decimals) => to_fixed(number, *decimals),
            FormatRule::Percentage(decimals) => format!("{}%", to_fixed(number, *decimals)),
            FormatRule::Duration => {
                format_duration_millis(number).unwrap_or_else(|| value.to_string())
            }
        }
    }
}

/// Maps a (column index, raw value) pair to display text.
pub trait ValueFormatter {
    fn format(&self, column: usize, value: &CellValue) -> String;
}

impl<F> ValueFormatter for F
where
    F: Fn(usize, &CellValue) -> String,
{
    fn format(&self, column: usize, value: &CellValue) -> String {
        self(column, value)
    }
}

/// Per-table formatting rules keyed by column index. Columns without a rule
/// render their raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFormatter {
    rules: BTreeMap<usize, FormatRule>,
}

impl ColumnFormatter {
    pub fn new() -> ColumnFormatter {
        ColumnFormatter::default()
    }

    #[must_use]
    pub fn with_rule(mut self, column: usize, rule: FormatRule) -> ColumnFormatter {
        self.rules.insert(column, rule);
        self
    }

    #[must_use]
    pub fn with_rules(
        mut self,
        columns: impl IntoIterator<Item = usize>,
        rule: FormatRule,
    ) -> ColumnFormatter {
        for column in columns {
            self.rules.insert(column, rule);
        }
        self
    }

    pub fn rule_for(&self, column: usize) -> FormatRule {
        self.rules.get(&column).copied().unwrap_or_default()
    }
}

impl ValueFormatter for ColumnFormatter {
    fn format(&self, column: usize, value: &CellValue) -> String {
        self.rule_for(column).apply(value)
    }
}

/// Rounds the exact binary value of `number`, resolving ties away from zero,
/// and pads to `decimals` places. `format!` alone would round ties to even.
fn to_fixed(number: f64, decimals: usize) -> String {
    let places = u32::try_from(decimals).unwrap_or(u32::MAX);
    match Decimal::from_f64_retain(number) {
        Some(exact) => format!(
            "{:.*}",
            decimals,
            exact.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => format!("{:.*}", decimals, number),
    }
}

fn format_duration_millis(millis: f64) -> Option<String> {
    if millis < 0.0 {
        return None;
    }
    let duration = Duration::try_from_secs_f64(millis / 1000.0).ok()?;
    Some(duration.human_duration().to_string())
}
