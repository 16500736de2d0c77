use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ProbeError;
use crate::http::{BaseUrl, ChatCompletion, HealthStatus};
use crate::runner::types::{TestResult, TestSummary};
use crate::utils::{ResponseFormat, ResponseFormatter};
use chrono::Local;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};

/// 控制台输出
pub struct TestReporter {
    formatter: ResponseFormatter,
    /// 流式片段输出后光标停在行中，下一次整行输出前要先换行
    line_open: AtomicBool,
}

impl TestReporter {
    pub fn new(verbose: bool) -> Self {
        let format = if verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };

        Self {
            formatter: ResponseFormatter::new(format),
            line_open: AtomicBool::new(false),
        }
    }

    fn close_line(&self) {
        if self.line_open.swap(false, Ordering::Relaxed) {
            println!();
        }
    }

    /// 打印测试开始
    pub fn print_header(&self, base_url: &BaseUrl, model: &str, total: usize) {
        println!(
            "\nRunning {} checks against {} (model {}) at {}",
            total,
            base_url.to_string().bold(),
            model.cyan(),
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("{}", "━".repeat(50));
    }

    pub fn print_health(&self, health: &HealthStatus) {
        println!(" {} Health check", "✓".green());
        match self.formatter.format_health(health) {
            Ok(formatted) => {
                for line in formatted.lines() {
                    println!("   {}", line);
                }
            }
            Err(e) => println!("   {}: Failed to format response: {}", "Warning".yellow(), e),
        }
    }

    pub fn print_health_failure(&self, error: &ProbeError) {
        println!(" {} Health check", "✗".red());
        self.print_error(error);
        println!(
            "\n{} the proxy is not reachable, no checks were run. Make sure the service is running.",
            "Aborted:".red().bold()
        );
    }

    pub fn print_check_start(&self, name: &str) {
        println!("\n {} {}", "▶".cyan(), name.bold());
    }

    pub fn print_completion(&self, completion: &ChatCompletion) {
        match self.formatter.format_completion(completion) {
            Ok(formatted) => {
                for line in formatted.lines() {
                    println!("   {}", line);
                }
            }
            Err(e) => println!("   {}: Failed to format response: {}", "Warning".yellow(), e),
        }
    }

    pub fn print_stream_start(&self) {
        print!("   ");
        let _ = std::io::stdout().flush();
        self.line_open.store(true, Ordering::Relaxed);
    }

    /// 流式片段原样输出，不换行
    pub fn print_fragment(&self, fragment: &str) {
        print!("{}", fragment);
        let _ = std::io::stdout().flush();
        self.line_open.store(true, Ordering::Relaxed);
    }

    pub fn print_stream_end(&self, full: &str) {
        self.close_line();
        println!("   {} stream complete ({} chars)", "✓".green(), full.chars().count());
        if full.is_empty() {
            println!("   {}: streamed response was empty", "Warning".yellow());
        }
    }

    /// 流在中途出错，结束片段所在的行
    pub fn print_stream_interrupted(&self) {
        self.close_line();
        println!("   {} stream interrupted", "✗".red());
    }

    pub fn print_warning(&self, message: &str) {
        self.close_line();
        println!("   {}: {}", "Warning".yellow(), message);
    }

    pub fn print_error(&self, error: &ProbeError) {
        self.close_line();
        println!("   {}: {}", "Error".red().bold(), error);
    }

    /// 打印单个测试结果
    pub fn print_result(&self, result: &TestResult) {
        self.close_line();
        let symbol = if result.success {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            " {} {} ({}ms)",
            symbol,
            result.name,
            result.duration.as_millis()
        );
        if let Some(error) = &result.error {
            println!("   {}: {}", "Error".red().bold(), error);
        }
    }

    /// 打印测试摘要
    pub fn print_summary(&self, results: &[TestResult], summary: &TestSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Check", "Result", "Duration"]);
        for result in results {
            let (label, color) = if result.success {
                ("PASS", Color::Green)
            } else {
                ("FAIL", Color::Red)
            };
            table.add_row(vec![
                Cell::new(&result.name),
                Cell::new(label).fg(color),
                Cell::new(format!("{}ms", result.duration.as_millis())),
            ]);
        }
        println!("{}", table);

        let tally = format!("{}/{}", summary.passed, summary.total);
        let tally = if summary.all_passed() {
            tally.green()
        } else {
            tally.red()
        };
        println!("  {}: {} passed", "Checks".bold(), tally);
        if !summary.all_passed() {
            println!(
                "  {}: {}",
                "Failed".bold(),
                summary.failed_tests.join(", ").red()
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
