use serde::{Deserialize, Serialize};

/// How a V4_SWAP whose `params` list is shorter than its `actions` is treated
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamsLengthPolicy {
    /// Fail before walking the actions.
    #[default]
    Strict,
    /// Walk every action and fail only when a recognised action has no param.
    Lenient,
}

/// Rewriter options
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    pub params_length: ParamsLengthPolicy,
    /// Classify command bytes after masking off the allow-revert flag.
    pub honor_revert_flag: bool,
}

impl RewriterConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
