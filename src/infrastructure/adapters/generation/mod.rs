//! Generation Adapter - Gemini 客户端与离线替身

mod fake_generation_client;
mod gemini_client;
mod gemini_wire;

pub use fake_generation_client::{FakeGenerationClient, FakeGenerationConfig};
pub use gemini_client::{ApiKey, GeminiClient, GeminiClientConfig};
