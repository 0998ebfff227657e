//! Sample datasets shared by unit tests, integration tests and benchmarks.

use crate::data::{CellValue, Dataset, ReportData, Row};

/// Report data of a real run, as shipped in `demos/`.
pub const SAMPLE_REPORT_JSON: &str = include_str!("../../demos/report-data.json");

pub fn sample_report_data() -> ReportData {
    ReportData::from_json(SAMPLE_REPORT_JSON).expect("sample report data is valid JSON")
}

pub fn apdex_dataset() -> Dataset {
    sample_report_data().apdex.expect("sample has apdex")
}

pub fn statistics_dataset() -> Dataset {
    sample_report_data()
        .statistics
        .expect("sample has statistics")
}

pub fn errors_dataset() -> Dataset {
    sample_report_data().errors.expect("sample has errors")
}

pub fn top5_errors_dataset() -> Dataset {
    sample_report_data()
        .top5_errors_by_sampler
        .expect("sample has top 5 errors")
}

/// Statistics-shaped dataset with `rows` samplers. Every tenth row is a
/// controller and labels cycle through the HTTP verbs.
pub fn generated_statistics_dataset(rows: usize) -> Dataset {
    const VERBS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];
    let titles = statistics_dataset().titles;

    let items = (0..rows)
        .map(|i| {
            let is_controller = i % 10 == 0;
            let label = if is_controller {
                format!("SCENARIO: Flow {}", i)
            } else {
                format!("{} Resource {}", VERBS[i % VERBS.len()], i)
            };
            let base = (i % 97) as f64;
            let mut data: Vec<CellValue> = vec![label.into(), 330.0.into(), 0.0.into()];
            data.push((base / 100.0).into());
            data.extend((0..10).map(|c| CellValue::Number(base * 1.5 + c as f64)));
            Row::new(data, is_controller)
        })
        .collect();

    Dataset {
        titles,
        overall: None,
        items,
        supports_controllers_discrimination: true,
    }
}
