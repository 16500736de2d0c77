use futures::future::BoxFuture;

use crate::Result;
use crate::http::ProxyClient;
use crate::runner::reporter::TestReporter;

/// 一个具名的功能测试
///
/// `run` 返回 `Ok(true)` 表示通过；`Ok(false)`、`Err` 或 panic 都记为失败。
pub trait Check: Send + Sync {
    /// CLI 中 `--only` 使用的标识
    fn key(&self) -> &'static str;

    /// 报告中显示的名称
    fn name(&self) -> &'static str;

    fn run<'a>(
        &'a self,
        client: &'a ProxyClient,
        reporter: &'a TestReporter,
    ) -> BoxFuture<'a, Result<bool>>;
}
