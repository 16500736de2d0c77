use std::time::Duration;

/// 单个测试的执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// 测试名称
    pub name: String,

    /// 是否成功
    pub success: bool,

    /// 错误消息（请求出错或 panic 时）
    pub error: Option<String>,

    /// 执行耗时
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            success: true,
            error: None,
            duration,
        }
    }

    pub fn failed(name: impl Into<String>, error: Option<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            success: false,
            error,
            duration,
        }
    }
}

/// 测试摘要
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    /// 失败测试的名称，保持注册顺序
    pub failed_tests: Vec<String>,
    pub total_duration: Duration,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        let failed_tests = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.name.clone())
            .collect();

        Self {
            total: results.len(),
            passed,
            failed_tests,
            total_duration: results.iter().map(|r| r.duration).sum(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed_tests.is_empty()
    }
}

/// 一次完整运行的结局
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 健康检查失败，没有执行任何测试
    Aborted { reason: String },
    Completed {
        results: Vec<TestResult>,
        summary: TestSummary,
    },
}

impl RunOutcome {
    /// 运行完成且全部通过
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::Aborted { .. } => false,
            RunOutcome::Completed { summary, .. } => summary.all_passed(),
        }
    }
}
