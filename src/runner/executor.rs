use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;

use crate::http::ProxyClient;
use crate::runner::check::Check;
use crate::runner::reporter::TestReporter;
use crate::runner::types::{RunOutcome, TestResult, TestSummary};

pub struct TestRunner {
    client: ProxyClient,
    reporter: TestReporter,
    /// 两个测试之间的等待时间，避免压垮远端服务
    delay: Duration,
}

impl TestRunner {
    pub fn new(client: ProxyClient, reporter: TestReporter, delay: Duration) -> Self {
        Self {
            client,
            reporter,
            delay,
        }
    }

    /// 先做健康检查，再按注册顺序逐个执行测试
    pub async fn run(&self, checks: &[Box<dyn Check>]) -> RunOutcome {
        self.reporter
            .print_header(self.client.base_url(), self.client.model(), checks.len());

        match self.client.health().await {
            Ok(health) => self.reporter.print_health(&health),
            Err(e) => {
                tracing::warn!(error = %e, "health check failed, aborting run");
                self.reporter.print_health_failure(&e);
                return RunOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
        }

        let mut results = Vec::with_capacity(checks.len());
        for (index, check) in checks.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let result = self.run_one(check.as_ref()).await;
            self.reporter.print_result(&result);
            results.push(result);
        }

        let summary = TestSummary::from_results(&results);
        self.reporter.print_summary(&results, &summary);

        RunOutcome::Completed { results, summary }
    }

    /// 执行单个测试，错误和 panic 都转换为失败记录
    async fn run_one(&self, check: &dyn Check) -> TestResult {
        let name = check.name();
        self.reporter.print_check_start(name);

        let start = Instant::now();
        let outcome = AssertUnwindSafe(check.run(&self.client, &self.reporter))
            .catch_unwind()
            .await;
        let duration = start.elapsed();

        match outcome {
            Ok(Ok(true)) => TestResult::passed(name, duration),
            Ok(Ok(false)) => {
                tracing::warn!(check = name, "check reported failure");
                TestResult::failed(name, None, duration)
            }
            Ok(Err(e)) => {
                tracing::warn!(check = name, error = %e, "check failed");
                TestResult::failed(name, Some(e.to_string()), duration)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(check = name, panic = %message, "check panicked");
                TestResult::failed(name, Some(format!("unexpected panic: {}", message)), duration)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
