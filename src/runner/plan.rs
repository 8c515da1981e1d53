use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::error::{PilotError, Result};
use crate::http::{HttpTransport, Method, ResponseRecord, Status, Transport};
use crate::placeholder::resolve;
use crate::runner::request::RequestSpec;
use crate::runner::store::ResponseStore;
use crate::runner::types::{PlanReport, StepOutcome};

/// 测试计划的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    /// 可以追加请求，没有网络活动
    Building,
    Running,
    Completed,
}

/// 取消正在执行（或尚未执行）的测试计划
///
/// 取消后当前请求被中断，后续请求全部标记为已取消；已记录的响应不受影响。
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// 按顺序执行的请求序列
///
/// 每个计划独占自己的响应存储。`run` 消耗计划本身，因此计划只能执行一次；
/// 从未执行就被丢弃的计划会 panic。
pub struct TestPlan<T: Transport = HttpTransport> {
    name: String,
    transport: T,
    settings: Settings,
    steps: Vec<RequestSpec>,
    state: PlanState,
    cancel: watch::Sender<bool>,
}

impl TestPlan<HttpTransport> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_transport(name, HttpTransport::default())
    }

    /// 使用配置中的超时创建 HTTP 传输
    pub fn from_settings(name: impl Into<String>, settings: Settings) -> Result<Self> {
        let transport = HttpTransport::with_timeout(settings.timeout)?;
        Ok(Self::with_transport(name, transport).with_settings(settings))
    }
}

impl<T: Transport> TestPlan<T> {
    pub fn with_transport(name: impl Into<String>, transport: T) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            name: name.into(),
            transport,
            settings: Settings::default(),
            steps: Vec::new(),
            state: PlanState::Building,
            cancel,
        }
    }

    /// base_url 和默认请求头；超时只在 `from_settings` 中生效
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 追加一个请求，返回其构建器
    pub fn request(&mut self, method: Method, url: impl Into<String>) -> &mut RequestSpec {
        self.push(RequestSpec::new(method, url))
    }

    pub fn push(&mut self, spec: RequestSpec) -> &mut RequestSpec {
        self.steps.push(spec);
        let index = self.steps.len() - 1;
        &mut self.steps[index]
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            sender: self.cancel.clone(),
        }
    }

    /// 按追加顺序执行全部请求
    ///
    /// 单个请求的失败不会阻止后续请求执行；取消会中断当前请求并跳过其余请求。
    pub async fn run(mut self) -> PlanReport {
        self.transition(PlanState::Running);
        info!(plan = %self.name, steps = self.steps.len(), "running test plan");

        let steps = std::mem::take(&mut self.steps);
        let mut cancel_rx = self.cancel.subscribe();
        let mut store = ResponseStore::new();
        let mut outcomes = Vec::with_capacity(steps.len());
        let mut cancelled = false;

        for (index, spec) in steps.iter().enumerate() {
            let number = index + 1;
            cancelled = cancelled || *cancel_rx.borrow();

            let outcome = if cancelled {
                StepOutcome::cancelled(number, spec.method(), spec.url())
            } else {
                self.run_step(number, spec, &mut store, &mut cancel_rx).await
            };
            cancelled = cancelled || outcome.is_cancelled();

            for failure in &outcome.failures {
                warn!(plan = %self.name, step = number, url = %outcome.url, "{}", failure);
            }
            outcomes.push(outcome);
        }

        self.transition(PlanState::Completed);
        let report = PlanReport {
            name: self.name.clone(),
            steps: outcomes,
            store,
        };
        let summary = report.summary();
        info!(
            plan = %report.name,
            passed = summary.passed,
            failed = summary.failed,
            "test plan completed"
        );
        report
    }

    async fn run_step(
        &self,
        number: usize,
        spec: &RequestSpec,
        store: &mut ResponseStore,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::new(number, spec.method(), spec.url());

        // 占位符或请求构建失败时请求不会发送
        let url = match resolve(spec.url(), store) {
            Ok(url) => self.settings.apply_base(&url),
            Err(e) => {
                outcome.failures.push(e.into());
                return outcome;
            }
        };
        outcome.url = url.clone();
        let request = match spec.to_outbound(url, &self.settings.default_headers) {
            Ok(request) => request,
            Err(e) => {
                outcome.failures.push(e);
                return outcome;
            }
        };

        info!(plan = %self.name, step = number, method = %spec.method(), url = %outcome.url, "sending request");
        let start = Instant::now();
        outcome.dispatched = true;
        let sent = tokio::select! {
            result = self.transport.send(request) => Some(result),
            _ = wait_cancelled(cancel_rx) => None,
        };
        outcome.duration = start.elapsed();

        let raw = match sent {
            Some(Ok(raw)) => raw,
            Some(Err(e)) => {
                outcome.failures.push(e.into());
                return outcome;
            }
            None => {
                outcome.failures.push(PilotError::Cancelled);
                return outcome;
            }
        };
        let status = match Status::new(raw.status) {
            Ok(status) => status,
            Err(e) => {
                outcome.failures.push(e);
                return outcome;
            }
        };
        outcome.status = Some(raw.status);
        debug!(step = number, status = raw.status, bytes = raw.body.len(), "response received");

        let record = ResponseRecord::new(status, raw.headers, raw.body, outcome.duration);
        store.record(record, spec.store_key());

        let store = &*store;
        if let (Some(expect), Some(record)) = (spec.expectation(), store.last()) {
            outcome
                .failures
                .extend(expect.check(record, store).into_iter().map(PilotError::from));
        }
        outcome
    }

    fn transition(&mut self, next: PlanState) {
        debug!(plan = %self.name, from = ?self.state, to = ?next, "plan state");
        self.state = next;
    }
}

impl<T: Transport> Drop for TestPlan<T> {
    fn drop(&mut self) {
        if self.state == PlanState::Building && !std::thread::panicking() {
            error!(plan = %self.name, "run was not called");
            panic!("test plan '{}': run was not called", self.name);
        }
    }
}

/// 等待取消信号；所有发送端都释放后永不完成
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
