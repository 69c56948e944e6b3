//! Execution summaries and the rendered test report.

use serde::Serialize;
use serde_json::Value;

/// Status counts derived from a cycle's execution list.
///
/// Always recomputed from the executions, never read back from upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub blocked: u64,
    pub in_progress: u64,
    pub not_executed: u64,
    pub pass_rate: f64,
}

/// Counts executions by status. Tolerates both the tool-level spellings
/// (`PASS`, `WIP`) and the upstream ones (`Pass`, `In Progress`); anything
/// unrecognized counts as not executed.
pub fn summarize(executions: &[Value]) -> ExecutionSummary {
    let mut summary = ExecutionSummary::default();
    for execution in executions {
        summary.total += 1;
        let status = execution.get("status").and_then(Value::as_str).unwrap_or("");
        match status {
            "Pass" | "PASS" => summary.passed += 1,
            "Fail" | "FAIL" => summary.failed += 1,
            "Blocked" | "BLOCKED" => summary.blocked += 1,
            "In Progress" | "WIP" => summary.in_progress += 1,
            _ => summary.not_executed += 1,
        }
    }
    if summary.total > 0 {
        summary.pass_rate = (summary.passed as f64 / summary.total as f64) * 100.0;
    }
    summary
}

/// One cycle's report: metadata, derived summary, raw executions.
///
/// Both output formats share this value; only the final rendering differs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub cycle_id: String,
    pub cycle_name: String,
    pub project_key: String,
    pub summary: ExecutionSummary,
    pub executions: Vec<Value>,
    pub generated_on: String,
}

impl TestReport {
    pub fn new(cycle_id: &str, cycle: &Value, executions: Vec<Value>) -> Self {
        Self {
            cycle_id: cycle_id.to_string(),
            cycle_name: cycle
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            project_key: cycle
                .get("projectKey")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            summary: summarize(&executions),
            executions,
            generated_on: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Renders the report as a standalone HTML document.
pub fn render_html(report: &TestReport) -> String {
    let executions: String = report.executions.iter().map(execution_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Test Execution Report - {cycle_name}</title>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 20px; }}
    .header {{ background-color: #f5f5f5; padding: 20px; border-radius: 5px; }}
    .summary {{ display: flex; gap: 20px; margin: 20px 0; }}
    .metric {{ background-color: #e8f4f8; padding: 15px; border-radius: 5px; text-align: center; }}
    .metric h3 {{ margin: 0 0 10px 0; }}
    .metric .value {{ font-size: 24px; font-weight: bold; }}
    .executions {{ margin-top: 30px; }}
    .execution {{ padding: 10px; border-left: 4px solid #ddd; margin: 10px 0; }}
    .execution.pass {{ border-left-color: #4caf50; }}
    .execution.fail {{ border-left-color: #f44336; }}
    .execution.blocked {{ border-left-color: #ff9800; }}
    .execution.progress {{ border-left-color: #2196f3; }}
  </style>
</head>
<body>
  <div class="header">
    <h1>Test Execution Report</h1>
    <h2>{cycle_name}</h2>
    <p>Project: {project_key}</p>
    <p>Generated: {generated_on}</p>
  </div>
  <div class="summary">
    <div class="metric"><h3>Total Tests</h3><div class="value">{total}</div></div>
    <div class="metric"><h3>Passed</h3><div class="value">{passed}</div></div>
    <div class="metric"><h3>Failed</h3><div class="value">{failed}</div></div>
    <div class="metric"><h3>Blocked</h3><div class="value">{blocked}</div></div>
    <div class="metric"><h3>Pass Rate</h3><div class="value">{pass_rate}%</div></div>
  </div>
  <div class="executions">
    <h3>Test Executions</h3>
{executions}  </div>
</body>
</html>
"#,
        cycle_name = report.cycle_name,
        project_key = report.project_key,
        generated_on = report.generated_on,
        total = report.summary.total,
        passed = report.summary.passed,
        failed = report.summary.failed,
        blocked = report.summary.blocked,
        pass_rate = report.summary.pass_rate.round() as u64,
    )
}

fn execution_row(execution: &Value) -> String {
    let key = execution.get("key").and_then(Value::as_str).unwrap_or("?");
    let status = execution
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("Not Executed");
    let css_class = match status {
        "Pass" | "PASS" => "pass",
        "Fail" | "FAIL" => "fail",
        "Blocked" | "BLOCKED" => "blocked",
        "In Progress" | "WIP" => "progress",
        _ => "",
    };

    let comment = execution
        .get("comment")
        .and_then(Value::as_str)
        .map(|c| format!("<p>{c}</p>"))
        .unwrap_or_default();
    let defects = execution
        .get("defects")
        .and_then(Value::as_array)
        .filter(|list| !list.is_empty())
        .map(|list| {
            let keys: Vec<&str> = list
                .iter()
                .filter_map(|d| d.get("key").and_then(Value::as_str))
                .collect();
            format!("<p>Defects: {}</p>", keys.join(", "))
        })
        .unwrap_or_default();

    format!(
        "    <div class=\"execution {css_class}\"><strong>{key}</strong> - {status}{comment}{defects}</div>\n"
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_counts_both_status_spellings() {
        let executions = vec![
            json!({"status": "Pass"}),
            json!({"status": "PASS"}),
            json!({"status": "Fail"}),
            json!({"status": "WIP"}),
            json!({"status": "In Progress"}),
            json!({"status": "Blocked"}),
            json!({}),
        ];

        let summary = summarize(&executions);
        assert_eq!(summary.total, 7);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.in_progress, 2);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.not_executed, 1);
    }

    #[test]
    fn empty_cycle_has_zero_pass_rate() {
        let summary = summarize(&[]);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn html_report_carries_metrics_and_defects() {
        let cycle = json!({"name": "Release 1.2", "projectKey": "ABC"});
        let executions = vec![
            json!({"key": "E-1", "status": "Pass"}),
            json!({"key": "E-2", "status": "Fail", "comment": "timeout",
                   "defects": [{"key": "ABC-9"}]}),
        ];
        let report = TestReport::new("C-1", &cycle, executions);
        let html = render_html(&report);

        assert!(html.contains("Release 1.2"));
        assert!(html.contains("Project: ABC"));
        assert!(html.contains("<strong>E-2</strong> - Fail"));
        assert!(html.contains("Defects: ABC-9"));
        assert!(html.contains("50%"));
    }
}
