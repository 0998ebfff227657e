use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// A single table cell as emitted by the load-test run. Its meaning is given by
/// the column it appears in, not by the value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value.into())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub data: Vec<CellValue>,
    #[serde(default)]
    pub is_controller: bool,
}

impl Row {
    pub fn new(data: Vec<CellValue>, is_controller: bool) -> Row {
        Row {
            data,
            is_controller,
        }
    }

    /// Rows without data stand for "no entry" and are never rendered.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<Row>,
    #[serde(default)]
    pub items: Vec<Row>,
    #[serde(default)]
    pub supports_controllers_discrimination: bool,
}

impl Dataset {
    /// Checks that the overall row and every non-placeholder item carry exactly
    /// one cell per title.
    pub fn validate(&self, context: &str) -> Result<(), DashboardError> {
        let expected = self.titles.len();

        if let Some(overall) = &self.overall {
            if overall.data.len() != expected {
                return Err(DashboardError::MalformedDataset {
                    context: context.to_string(),
                    row: "overall".to_string(),
                    expected,
                    actual: overall.data.len(),
                });
            }
        }

        for (index, item) in self.items.iter().enumerate() {
            if !item.is_placeholder() && item.data.len() != expected {
                return Err(DashboardError::MalformedDataset {
                    context: context.to_string(),
                    row: format!("item {}", index),
                    expected,
                    actual: item.data.len(),
                });
            }
        }

        Ok(())
    }

    /// Number of items that carry data.
    pub fn populated_items(&self) -> usize {
        self.items.iter().filter(|i| !i.is_placeholder()).count()
    }
}

/// Overall pass/fail ratio of the run, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestsSummary {
    pub ok_percent: f64,
    pub ko_percent: f64,
}

/// Everything the upstream report generator hands over for one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_summary: Option<RequestsSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apdex: Option<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Dataset>,
    #[serde(
        default,
        rename = "top5ErrorsBySampler",
        skip_serializing_if = "Option::is_none"
    )]
    pub top5_errors_by_sampler: Option<Dataset>,
}

impl ReportData {
    pub fn from_json(json: &str) -> serde_json::Result<ReportData> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display_matches_report_output() {
        assert_eq!(CellValue::from(500.0).to_string(), "500");
        assert_eq!(CellValue::from(0.0).to_string(), "0");
        assert_eq!(CellValue::from(8.0).to_string(), "8");
        assert_eq!(
            CellValue::from(9.772399348382596).to_string(),
            "9.772399348382596"
        );
        assert_eq!(CellValue::from("Total").to_string(), "Total");
    }

    #[test]
    fn test_deserialize_dataset_field_names() {
        let json = r#"{
            "supportsControllersDiscrimination": true,
            "overall": {"data": [0.9975135135135135, 500, 1500, "Total"], "isController": false},
            "titles": ["Apdex", "T (Toleration threshold)", "F (Frustration threshold)", "Label"],
            "items": [
                {"data": [0.9817073170731707, 500, 1500, "SCENARIO: Patient Lifecycle"], "isController": true},
                {"data": [], "isController": false}
            ]
        }"#;

        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert!(dataset.supports_controllers_discrimination);
        assert_eq!(dataset.titles.len(), 4);
        let overall = dataset.overall.as_ref().unwrap();
        assert_eq!(overall.data[1], CellValue::Number(500.0));
        assert_eq!(overall.data[3], CellValue::Text("Total".to_string()));
        assert!(dataset.items[0].is_controller);
        assert!(dataset.items[1].is_placeholder());
        assert_eq!(dataset.populated_items(), 1);
    }

    #[test]
    fn test_serialize_keeps_upstream_shape() {
        let dataset = Dataset {
            titles: vec!["Type of error".to_string()],
            overall: None,
            items: vec![Row::new(vec!["500".into()], false)],
            supports_controllers_discrimination: false,
        };
        let json = serde_json::to_string(&dataset).unwrap();
        assert_eq!(
            json,
            r#"{"titles":["Type of error"],"items":[{"data":["500"],"isController":false}],"supportsControllersDiscrimination":false}"#
        );
    }

    #[test]
    fn test_validate_accepts_placeholders() {
        let dataset = Dataset {
            titles: vec!["Sample".to_string(), "#Samples".to_string()],
            overall: Some(Row::new(vec!["Total".into(), 10.0.into()], false)),
            items: vec![
                Row::default(),
                Row::new(vec!["GET".into(), 10.0.into()], false),
            ],
            supports_controllers_discrimination: false,
        };
        assert!(dataset.validate("test").is_ok());
    }

    #[test]
    fn test_validate_rejects_short_rows() {
        let dataset = Dataset {
            titles: vec!["Sample".to_string(), "#Samples".to_string()],
            overall: None,
            items: vec![
                Row::new(vec!["GET".into(), 10.0.into()], false),
                Row::new(vec!["POST".into()], false),
            ],
            supports_controllers_discrimination: false,
        };
        let err = dataset.validate("Errors").unwrap_err();
        assert_eq!(
            err,
            DashboardError::MalformedDataset {
                context: "Errors".to_string(),
                row: "item 1".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_validate_rejects_long_overall() {
        let dataset = Dataset {
            titles: vec!["Label".to_string()],
            overall: Some(Row::new(vec!["Total".into(), 1.0.into()], false)),
            items: vec![],
            supports_controllers_discrimination: false,
        };
        assert!(matches!(
            dataset.validate("Statistics"),
            Err(DashboardError::MalformedDataset { ref row, .. }) if row == "overall"
        ));
    }

    #[test]
    fn test_report_data_optional_tables() {
        let data = ReportData::from_json(
            r#"{"requestsSummary": {"OkPercent": 99.5, "KoPercent": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(
            data.requests_summary,
            Some(RequestsSummary {
                ok_percent: 99.5,
                ko_percent: 0.5
            })
        );
        assert!(data.apdex.is_none());
        assert!(data.top5_errors_by_sampler.is_none());
    }
}
