pub mod chat;
pub mod client;
pub mod stream;
pub mod types;

// Re-export commonly used types for convenient access
pub use chat::{ChatCompletion, ChatMessage, ChatRequest, ContentPart, MessageContent, Role};
pub use client::ProxyClient;
pub use stream::{ChatStream, SseParser, collect_fragments};
pub use types::{BaseUrl, HealthStatus};
