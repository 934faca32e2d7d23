//! Upstream model catalogue and the name mapping into it.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Model used when nothing better matches.
pub const DEFAULT_MODEL: &str = "claude-4.1-opus";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpModel {
    pub id: &'static str,
    pub name: &'static str,
}

/// Models the upstream serves natively.
pub const WARP_MODELS: &[WarpModel] = &[
    WarpModel { id: "claude-4.1-opus", name: "Claude 4.1 Opus" },
    WarpModel { id: "claude-4-opus", name: "Claude 4 Opus" },
    WarpModel { id: "claude-4-5-opus", name: "Claude 4.5 Opus" },
    WarpModel { id: "claude-4-sonnet", name: "Claude 4 Sonnet" },
    WarpModel { id: "claude-4-5-sonnet", name: "Claude 4.5 Sonnet" },
    WarpModel { id: "gpt-5", name: "GPT-5" },
    WarpModel { id: "gpt-4.1", name: "GPT-4.1" },
    WarpModel { id: "gpt-4o", name: "GPT-4o" },
    WarpModel { id: "o3", name: "O3" },
    WarpModel { id: "o4-mini", name: "O4 Mini" },
    WarpModel { id: "gemini-2.5-pro", name: "Gemini 2.5 Pro" },
];

lazy_static! {
    static ref MODEL_ALIASES: HashMap<&'static str, &'static str> = HashMap::from([
        ("claude-opus-4-5-20251101", "claude-4-5-opus"),
        ("claude-haiku-4-5-20251001", "claude-4-5-sonnet"),
        ("claude-sonnet-4-20250514", "claude-4-sonnet"),
        ("claude-3-5-sonnet-20241022", "claude-4-sonnet"),
        ("claude-3-opus-20240229", "claude-4-opus"),
        ("claude-3-sonnet-20240229", "claude-4-sonnet"),
        ("claude-3-haiku-20240307", "claude-4-sonnet"),
        ("gemini-2.5-flash", "gemini-2.5-pro"),
        ("gemini-2.5-flash-lite", "gemini-2.5-pro"),
        ("gemini-2.5-flash-thinking", "gemini-2.5-pro"),
        ("gemini-2.5-pro", "gemini-2.5-pro"),
        ("gemini-3-flash", "gemini-2.5-pro"),
        ("gemini-3-pro", "gemini-3-pro"),
        ("gemini-3-pro-high", "gemini-3-pro"),
        ("gemini-3-pro-low", "gemini-2.5-pro"),
        ("gpt-4-turbo", "gpt-4.1"),
        ("gpt-4-turbo-preview", "gpt-4.1"),
        ("gpt-4", "gpt-4.1"),
        ("gpt-4o", "gpt-4o"),
        ("gpt-4o-mini", "gpt-4.1"),
        ("o1", "o3"),
        ("o1-mini", "o4-mini"),
        ("o1-preview", "o3"),
    ]);
}

/// Map a client-facing model name onto an upstream model id.
///
/// Exact aliases first, then native ids, then family heuristics.
pub fn map_model_to_warp(model: &str) -> &'static str {
    let model = model.trim().to_lowercase();
    if model.is_empty() {
        return DEFAULT_MODEL;
    }

    if let Some(mapped) = MODEL_ALIASES.get(model.as_str()) {
        return *mapped;
    }
    if let Some(native) = WARP_MODELS.iter().find(|m| m.id == model) {
        return native.id;
    }

    let minor_5 = model.contains("4.5") || model.contains("4-5");
    if model.contains("opus") {
        if minor_5 {
            "claude-4-5-opus"
        } else if model.contains("4.1") {
            "claude-4.1-opus"
        } else {
            "claude-4-opus"
        }
    } else if model.contains("sonnet") {
        if minor_5 {
            "claude-4-5-sonnet"
        } else {
            "claude-4-sonnet"
        }
    } else if model.contains("haiku") {
        "claude-4-sonnet"
    } else if model.contains("claude") {
        DEFAULT_MODEL
    } else if model.contains("gemini") {
        "gemini-2.5-pro"
    } else if model.contains("gpt") {
        "gpt-4.1"
    } else {
        DEFAULT_MODEL
    }
}
