use std::fmt;
use std::time::Duration;

use crate::error::PilotError;
use crate::http::{Method, ResponseRecord};
use crate::runner::store::ResponseStore;

/// 单个请求的执行结果
#[derive(Debug)]
pub struct StepOutcome {
    /// 请求序号（从 1 开始）
    pub step: usize,

    pub method: Method,

    /// 替换占位符后的 URL；替换失败时为原始模板
    pub url: String,

    /// 响应状态码（收到响应时）
    pub status: Option<u16>,

    /// 执行耗时
    pub duration: Duration,

    /// 请求是否已交给传输层
    pub dispatched: bool,

    /// 本请求的全部失败（占位符、传输、期望等）
    pub failures: Vec<PilotError>,
}

impl StepOutcome {
    pub fn new(step: usize, method: Method, url: impl Into<String>) -> Self {
        Self {
            step,
            method,
            url: url.into(),
            status: None,
            duration: Duration::ZERO,
            dispatched: false,
            failures: Vec::new(),
        }
    }

    pub fn cancelled(step: usize, method: Method, url: impl Into<String>) -> Self {
        let mut outcome = Self::new(step, method, url);
        outcome.failures.push(PilotError::Cancelled);
        outcome
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.failures
            .iter()
            .any(|f| matches!(f, PilotError::Cancelled))
    }

    /// 是否收到了响应
    pub fn responded(&self) -> bool {
        self.status.is_some()
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} {} {}", self.step, self.method, self.url)
    }
}

/// 测试计划的执行报告
#[derive(Debug)]
pub struct PlanReport {
    pub name: String,
    pub steps: Vec<StepOutcome>,
    pub store: ResponseStore,
}

impl PlanReport {
    pub fn summary(&self) -> TestSummary {
        TestSummary::from_outcomes(&self.steps)
    }

    /// 全部失败，按请求顺序
    pub fn failures(&self) -> impl Iterator<Item = (&StepOutcome, &PilotError)> {
        self.steps
            .iter()
            .flat_map(|step| step.failures.iter().map(move |failure| (step, failure)))
    }

    pub fn is_success(&self) -> bool {
        self.steps.iter().all(StepOutcome::is_success)
    }

    /// 最后一次收到的响应
    pub fn response(&self) -> Option<&ResponseRecord> {
        self.store.last()
    }

    pub fn response_for_key(&self, key: &str) -> Option<&ResponseRecord> {
        self.store.get(key)
    }

    /// 在测试中使用：有任何失败时 panic 并列出全部失败
    pub fn assert_passed(&self) {
        if self.is_success() {
            return;
        }
        let lines: Vec<String> = self
            .failures()
            .map(|(step, failure)| format!("  {}: {}", step, failure))
            .collect();
        panic!("test plan '{}' failed:\n{}", self.name, lines.join("\n"));
    }
}

/// 测试摘要
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// 没有收到响应的请求数（占位符错误、传输错误、取消）
    pub unanswered: usize,
    pub cancelled: usize,
    pub total_failures: usize,
    pub total_duration: Duration,
}

impl TestSummary {
    pub fn from_outcomes(outcomes: &[StepOutcome]) -> Self {
        let passed = outcomes.iter().filter(|o| o.is_success()).count();

        Self {
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
            unanswered: outcomes.iter().filter(|o| !o.responded()).count(),
            cancelled: outcomes.iter().filter(|o| o.is_cancelled()).count(),
            total_failures: outcomes.iter().map(|o| o.failures.len()).sum(),
            total_duration: outcomes.iter().map(|o| o.duration).sum(),
        }
    }
}
