use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use proxycheck::config::{ConfigLoader, Profile, Settings};
use proxycheck::http::ProxyClient;
use proxycheck::runner::{TestReporter, TestRunner};
use proxycheck::suite;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 代理服务地址，支持 ":8080" 这类简写
    #[arg(long)]
    pub base_url: Option<String>,

    /// 请求中使用的模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// Bearer token，传空字符串表示不发送 Authorization 头
    #[arg(long)]
    pub api_key: Option<String>,

    /// 使用配置文件中的指定环境
    #[arg(short, long)]
    pub env: Option<String>,

    /// 配置文件路径，默认自动查找 proxycheck.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 两个测试之间的等待时间（毫秒）
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// 单个请求的超时时间（秒）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 只运行指定的测试，可重复或用逗号分隔
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// 输出完整响应
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 列出内置测试
    List,
}

impl Cli {
    fn overrides(&self) -> Profile {
        Profile {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            delay_ms: self.delay_ms,
            timeout_secs: self.timeout,
        }
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(Commands::List) = cli.command {
        for check in suite::default_suite() {
            println!("{:<14} {}", check.key(), check.name());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => Some(ConfigLoader::load_from_path(path)?),
        None => ConfigLoader::find_and_load()?,
    };
    let settings = Settings::resolve(config.as_ref(), cli.env.as_deref(), &cli.overrides())?;
    tracing::debug!(base_url = %settings.base_url, model = %settings.model, "resolved settings");

    let checks = suite::select(&cli.only)?;
    let client = ProxyClient::new(&settings)?;
    let runner = TestRunner::new(client, TestReporter::new(cli.verbose), settings.delay);

    let outcome = runner.run(&checks).await;
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
