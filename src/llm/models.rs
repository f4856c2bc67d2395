//! Known upstream models and their token budgets.

use crate::config::defaults::{REASONING_MAX_TOKENS, STANDARD_MAX_TOKENS};

/// A model the mobile client can select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiModel {
    pub display_name: &'static str,
    pub api_value: &'static str,
    pub max_tokens: u32,
}

/// Models offered in the app's picker.
pub const MODEL_CATALOG: &[AiModel] = &[
    AiModel { display_name: "GPT-4.1 Nano ($0.10)", api_value: "openai/gpt-4.1-nano", max_tokens: 150 },
    AiModel { display_name: "GPT-5 Mini ($0.25)", api_value: "openai/gpt-5-mini", max_tokens: 2500 },
    AiModel { display_name: "GPT-5 Nano ($0.05)", api_value: "openai/gpt-5-nano", max_tokens: 2500 },
    AiModel { display_name: "GPT-4o Mini ($0.15)", api_value: "openai/gpt-4o-mini", max_tokens: 150 },
    AiModel { display_name: "Gemini 2.5 Flash ($0.30)", api_value: "google/gemini-2.5-flash", max_tokens: 150 },
    AiModel { display_name: "Qwen3 235B Thinking", api_value: "qwen/qwen3-235b-a22b-thinking-2507", max_tokens: 2500 },
    AiModel { display_name: "Llama 3.2 3B", api_value: "meta-llama/llama-3.2-3b-instruct", max_tokens: 150 },
    AiModel { display_name: "Claude 3 Haiku ($0.25)", api_value: "anthropic/claude-3-haiku", max_tokens: 150 },
];

/// Look up a catalog entry by its API value.
pub fn find_model(api_value: &str) -> Option<&'static AiModel> {
    MODEL_CATALOG.iter().find(|m| m.api_value == api_value)
}

/// Models that think before answering and need a larger completion budget.
pub fn is_reasoning_model(model: &str) -> bool {
    ["gpt-5", "o1", "o4", "thinking"]
        .iter()
        .any(|marker| model.contains(marker))
}

/// Completion budget for `model`: catalog value, else the reasoning heuristic.
pub fn max_tokens_for_model(model: &str) -> u32 {
    find_model(model).map_or_else(
        || {
            if is_reasoning_model(model) {
                REASONING_MAX_TOKENS
            } else {
                STANDARD_MAX_TOKENS
            }
        },
        |m| m.max_tokens,
    )
}
