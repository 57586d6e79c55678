//! Prompt enhancement over multiple LLM providers (OpenAI, Anthropic, Gemini).
//!
//! Provides the provider `registry`, the token `budget` estimator, the
//! `Enhancer` orchestrator, an `HttpTransport` seam, the message `Gateway`
//! and the in-place text-field flow.

mod anthropic;
mod budget;
mod enhancer;
mod field;
mod gateway;
mod gemini;
mod instruction;
mod openai;
pub mod registry;
mod transport;
mod types;

pub use budget::*;
pub use enhancer::*;
pub use field::*;
pub use gateway::*;
pub use instruction::*;
pub use registry::{AuthScheme, ProviderSpec};
pub use transport::*;
pub use types::{BodyParams, ExtractError, TEMPERATURE, UNKNOWN_ERROR};
