use std::time::Duration;
use tfcheck_core::{RunState, SuiteReport, TargetReport, ToolCommand, ValidationTarget};

/// Render one target's outcome, including the tool output of a failing step
pub fn format_target_report(report: &TargetReport) -> String {
    let label = report.target.label();
    let elapsed = seconds(report.duration);
    let mut out = String::new();

    match &report.state {
        RunState::Passed => {
            out.push_str(&format!("✅ PASS  {label} ({elapsed})\n"));
        }
        RunState::Failed { step, cause } => {
            out.push_str(&format!("❌ FAIL  {label} at `{step}` ({elapsed})\n"));
            out.push_str(&format!("   {cause}\n"));
            for line in cause.output().lines() {
                out.push_str(&format!("   │ {line}\n"));
            }
        }
        other => {
            out.push_str(&format!("⏸  {other}  {label}\n"));
        }
    }

    for record in report.steps.iter().filter(|r| r.retries() > 0) {
        out.push_str(&format!(
            "   ↻ {} retried {} time(s)\n",
            record.step,
            record.retries()
        ));
    }

    out
}

/// Every target followed by a summary line
pub fn format_suite_report(report: &SuiteReport) -> String {
    let mut out = String::new();
    for target in &report.reports {
        out.push_str(&format_target_report(target));
    }

    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!(
        "{} passed, {} failed, {} total\n",
        report.passed(),
        report.failed(),
        report.reports.len()
    ));
    out
}

/// The commands that would run for `target`
pub fn format_dry_run(target: &ValidationTarget, commands: &[ToolCommand]) -> String {
    let mut out = format!("📁 {}\n", target.label());
    for command in commands {
        out.push_str(&format!("   {}\n", command.to_shell_command()));
    }
    out.push_str(&format!("   Working directory: {}\n", target.dir.display()));
    out
}

fn seconds(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}
