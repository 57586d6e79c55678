//! Output token budget derived from input size.
//!
//! The estimate is a coarse heuristic (about four UTF-16 code units per
//! token), not a tokenizer. The budget never fails and never truncates input.

use std::fmt;

pub const MIN_OUTPUT_TOKENS: u32 = 1500;
pub const MAX_OUTPUT_TOKENS: u32 = 4000;
pub const EXPANSION_FACTOR: usize = 3;

const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count: `ceil(len / 4)`, with `len` in UTF-16 code units.
pub fn estimate_tokens(text: &str) -> usize {
    text.encode_utf16().count().div_ceil(CHARS_PER_TOKEN)
}

/// Cap on generated output length, always within
/// `[MIN_OUTPUT_TOKENS, MAX_OUTPUT_TOKENS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenBudget(u32);

impl TokenBudget {
    /// Allow up to 3x expansion of the estimated input, clamped.
    pub fn for_input(raw_text: &str) -> Self {
        let expanded = estimate_tokens(raw_text).saturating_mul(EXPANSION_FACTOR);
        let clamped = expanded.clamp(MIN_OUTPUT_TOKENS as usize, MAX_OUTPUT_TOKENS as usize);
        Self(clamped as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TokenBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
