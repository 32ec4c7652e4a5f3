use crate::commands::{Action, Command};

/// Errors raised while rewriting or inspecting router calldata
///
/// Every variant is fatal for the call that produced it: no partially
/// rewritten calldata is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The payload is not a Universal Router `execute` call.
    #[error("calldata is not a Universal Router execute call: {source}")]
    OuterDecode {
        #[source]
        source: alloy_sol_types::Error,
    },

    #[error("failed to decode input of command {index} ({command:?}): {source}")]
    CommandDecode {
        index: usize,
        command: Command,
        #[source]
        source: alloy_sol_types::Error,
    },

    #[error(
        "failed to decode param of action {action_index} ({action:?}) in command {command_index}: {source}"
    )]
    ActionDecode {
        command_index: usize,
        action_index: usize,
        action: Action,
        #[source]
        source: alloy_sol_types::Error,
    },

    #[error("command {command_index} has {actions} V4 actions but only {params} params")]
    ActionParamsLength {
        command_index: usize,
        actions: usize,
        params: usize,
    },

    #[error("action {action_index} ({action:?}) in command {command_index} has no param")]
    MissingActionParam {
        command_index: usize,
        action_index: usize,
        action: Action,
    },
}

impl RewriteError {
    /// True when the outer payload itself could not be decoded.
    pub fn is_outer(&self) -> bool {
        matches!(self, Self::OuterDecode { .. })
    }

    /// Index of the command the failure belongs to, if any.
    pub fn command_index(&self) -> Option<usize> {
        match self {
            Self::OuterDecode { .. } => None,
            Self::CommandDecode { index, .. } => Some(*index),
            Self::ActionDecode { command_index, .. }
            | Self::ActionParamsLength { command_index, .. }
            | Self::MissingActionParam { command_index, .. } => Some(*command_index),
        }
    }

    /// Index of the nested V4 action the failure belongs to, if any.
    pub fn action_index(&self) -> Option<usize> {
        match self {
            Self::ActionDecode { action_index, .. }
            | Self::MissingActionParam { action_index, .. } => Some(*action_index),
            _ => None,
        }
    }
}
