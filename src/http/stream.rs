//! 流式 chat 响应的解码
//!
//! 服务端以 `text/event-stream` 返回 `data: <chunk json>` 行，
//! 以 `data: [DONE]` 结束。这里把字节流转换为文本片段流。

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};

use crate::http::chat::ChatCompletionChunk;
use crate::{ProbeError, Result};

const DONE_MARKER: &str = "[DONE]";

/// 按行切分 SSE 字节流，提取 `data:` 字段
///
/// 网络 chunk 的边界可能落在一行（甚至一个 UTF-8 字符）中间，
/// 未完成的行留在缓冲区里等待下一次 feed。
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一段字节，返回其中所有完整 `data:` 行的内容
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = Self::parse_line(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// 流结束时处理缓冲区中没有换行结尾的最后一行
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Self::parse_line(&line)
    }

    fn parse_line(line: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(line);
        let text = text.trim_end_matches(['\n', '\r']);
        let data = text.strip_prefix("data:")?;
        Some(data.strip_prefix(' ').unwrap_or(data).to_string())
    }
}

struct DecodeState {
    bytes: BoxStream<'static, Result<Vec<u8>>>,
    parser: SseParser,
    pending: VecDeque<String>,
    finished: bool,
}

/// 文本片段流：惰性、有限、不可重放
pub struct ChatStream {
    inner: BoxStream<'static, Result<String>>,
}

impl ChatStream {
    /// 由 HTTP 响应体的字节流构造
    pub fn from_bytes<S, B, E>(bytes: S) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]>,
        E: Into<ProbeError>,
    {
        let state = DecodeState {
            bytes: bytes
                .map(|item| item.map(|b| b.as_ref().to_vec()).map_err(Into::into))
                .boxed(),
            parser: SseParser::new(),
            pending: VecDeque::new(),
            finished: false,
        };

        let inner = stream::unfold(state, |mut state| async move {
            loop {
                if let Some(payload) = state.pending.pop_front() {
                    if payload.trim() == DONE_MARKER {
                        return None;
                    }
                    match decode_fragment(&payload) {
                        Some(fragment) => return Some((Ok(fragment), state)),
                        None => continue,
                    }
                }

                if state.finished {
                    return None;
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        let payloads = state.parser.feed(&chunk);
                        state.pending.extend(payloads);
                    }
                    Some(Err(err)) => {
                        state.finished = true;
                        state.pending.clear();
                        return Some((Err(err), state));
                    }
                    None => {
                        state.finished = true;
                        let tail = state.parser.finish();
                        state.pending.extend(tail);
                    }
                }
            }
        })
        .boxed();

        Self { inner }
    }
}

impl Stream for ChatStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

fn decode_fragment(payload: &str) -> Option<String> {
    if payload.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => chunk.fragment().map(str::to_owned),
        Err(e) => {
            tracing::debug!(error = %e, payload, "skipping malformed stream chunk");
            None
        }
    }
}

/// 按到达顺序拼接所有非空片段，每个片段到达时回调 `on_fragment`
pub async fn collect_fragments<S, F>(mut stream: S, mut on_fragment: F) -> Result<String>
where
    S: Stream<Item = Result<String>> + Unpin,
    F: FnMut(&str),
{
    let mut full = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        if fragment.is_empty() {
            continue;
        }
        on_fragment(&fragment);
        full.push_str(&fragment);
    }
    Ok(full)
}
