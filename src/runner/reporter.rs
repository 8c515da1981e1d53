use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::runner::types::{PlanReport, StepOutcome, TestSummary};

/// verbose 模式下响应体最多显示的字符数
const BODY_PREVIEW_CHARS: usize = 512;

pub struct TestReporter {
    verbose: bool,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印测试开始
    pub fn print_header(&self, source: &str, total: usize) {
        println!("\nRunning {} requests from {}...\n", total, source.bold());
    }

    /// 打印单个请求的结果
    pub fn print_outcome(&self, outcome: &StepOutcome) {
        if outcome.is_cancelled() && !outcome.dispatched {
            println!(
                " {} [{}] {} {} {}",
                "⊘".dimmed(),
                outcome.step,
                outcome.method.to_string().cyan(),
                outcome.url,
                "(cancelled)".dimmed()
            );
            return;
        }

        let symbol = if outcome.is_success() {
            "✓".green()
        } else {
            "✗".red()
        };
        let status = outcome
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "---".to_string());

        println!(
            " {} [{}] {} {} {} ({}ms)",
            symbol,
            outcome.step,
            outcome.method.to_string().cyan(),
            outcome.url,
            status,
            outcome.duration.as_millis()
        );

        for failure in &outcome.failures {
            let text = failure.to_string();
            let mut lines = text.lines();
            if let Some(first) = lines.next() {
                println!("   {}: {}", "Error".red().bold(), first);
            }
            for line in lines {
                println!("     {}", line);
            }
        }
        if !outcome.failures.is_empty() {
            println!();
        }
    }

    /// 打印完整报告：每个请求的结果、汇总表和摘要
    pub fn print_report(&self, report: &PlanReport) {
        self.print_header(&report.name, report.steps.len());
        for outcome in &report.steps {
            self.print_outcome(outcome);
        }

        if self.verbose {
            self.print_stored(report);
        }

        println!("\n{}", self.step_table(report));
        self.print_summary(&report.summary());
    }

    /// 每个请求一行的汇总表
    pub fn step_table(&self, report: &PlanReport) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["#", "Method", "URL", "Status", "Duration", "Result"]);

        for outcome in &report.steps {
            let (result, color) = if outcome.is_success() {
                ("pass".to_string(), Color::Green)
            } else if outcome.is_cancelled() {
                ("cancelled".to_string(), Color::Yellow)
            } else {
                (format!("{} failed", outcome.failures.len()), Color::Red)
            };
            let status = match outcome.status {
                Some(code) => Cell::new(code).fg(if code < 400 { Color::Green } else { Color::Red }),
                None => Cell::new("---").add_attribute(Attribute::Dim),
            };

            table.add_row(vec![
                Cell::new(outcome.step),
                Cell::new(outcome.method),
                Cell::new(&outcome.url).add_attribute(Attribute::Dim),
                status,
                Cell::new(format!("{}ms", outcome.duration.as_millis())),
                Cell::new(result).fg(color),
            ]);
        }

        table
    }

    fn print_stored(&self, report: &PlanReport) {
        let mut keys: Vec<&str> = report.store.keys().collect();
        keys.sort_unstable();

        for key in keys {
            let Some(record) = report.store.get(key) else {
                continue;
            };
            let text = record.text();
            let preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
            println!("   {} {} → {}", "stored".dimmed(), key.bold(), record.status);
            for line in preview.lines() {
                println!("     {}", line.dimmed());
            }
        }
    }

    /// 打印测试摘要
    pub fn print_summary(&self, summary: &TestSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        if summary.failed == 0 {
            println!(
                "  {}: {} passed, {} total",
                "Requests".bold(),
                summary.passed.to_string().green(),
                summary.total
            );
        } else {
            println!(
                "  {}: {} passed, {} failed, {} total",
                "Requests".bold(),
                summary.passed.to_string().green(),
                summary.failed.to_string().red(),
                summary.total
            );
            println!(
                "  {}: {}",
                "Failures".bold(),
                summary.total_failures.to_string().red()
            );
        }

        if summary.cancelled > 0 {
            println!(
                "  {}: {}",
                "Cancelled".bold(),
                summary.cancelled.to_string().yellow()
            );
        }

        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new(false)
    }
}
