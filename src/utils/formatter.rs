use crate::http::{ChatCompletion, HealthStatus};
use crate::Result;
use colored::*;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

/// 把代理返回的内容整理成控制台输出
pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
    /// Compact 模式下回答最多显示的字符数
    max_answer_chars: usize,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
            max_answer_chars: 200,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format_health(&self, health: &HealthStatus) -> Result<String> {
        let body = match self.format {
            ResponseFormat::Compact => serde_json::to_string(&health.body)?,
            ResponseFormat::Verbose => serde_json::to_string_pretty(&health.body)?,
        };
        Ok(format!("{}\n{}", self.status_line(health.status), body))
    }

    pub fn format_completion(&self, completion: &ChatCompletion) -> Result<String> {
        match self.format {
            ResponseFormat::Compact => Ok(self.format_compact(completion)),
            ResponseFormat::Verbose => self.format_verbose(completion),
        }
    }

    fn format_compact(&self, completion: &ChatCompletion) -> String {
        let mut output = Vec::new();
        let answer = completion.first_content().unwrap_or_default();
        output.push(format!(
            "{} {}",
            self.label("Answer:"),
            truncate(answer.trim(), self.max_answer_chars)
        ));
        if let Some(usage) = completion.usage {
            output.push(format!(
                "{} {} prompt + {} completion = {} tokens",
                self.label("Usage:"),
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            ));
        }
        output.join("\n")
    }

    fn format_verbose(&self, completion: &ChatCompletion) -> Result<String> {
        let mut output = Vec::new();
        output.push(self.label("Response:"));
        output.push(serde_json::to_string_pretty(completion)?);
        output.push(String::new());
        output.push(self.label("Answer:"));
        output.push(completion.first_content().unwrap_or_default().to_string());
        Ok(output.join("\n"))
    }

    fn status_line(&self, status: u16) -> String {
        let line = format!("HTTP {}", status);
        if !self.color {
            return line;
        }
        if (200..300).contains(&status) {
            line.green().to_string()
        } else {
            line.red().to_string()
        }
    }

    fn label(&self, text: &str) -> String {
        if self.color {
            text.blue().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// 按字符截断，超出部分以 "..." 结尾
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
