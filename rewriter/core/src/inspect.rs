//! Read-only view of a router plan
//!
//! Lists the commands of an `execute` payload, the actions nested in each
//! `V4_SWAP`, and the recipient of every settlement command or action. The
//! decode rules match the rewriter: unrecognised opcodes are never decoded,
//! and a recognised one that fails to decode is an error. Missing params are
//! reported rather than rejected.

use std::fmt;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use serde::Serialize;

use crate::commands::{
    Action, Command, PayPortionParams, SweepParams, TakeParams, TakePortionParams, V4SwapParams,
};
use crate::config::{ParamsLengthPolicy, RewriterConfig};
use crate::error::RewriteError;
use crate::rewriter::ExecutePayload;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PlanSummary {
    /// `None` for the `execute(bytes,bytes[])` overload
    pub deadline: Option<U256>,
    pub commands: Vec<CommandSummary>,
    /// Inputs past the last command, which the router ignores
    pub extra_inputs: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CommandSummary {
    pub index: usize,
    pub opcode: u8,
    pub name: Option<String>,
    pub input_len: Option<usize>,
    pub recipient: Option<Address>,
    pub actions: Vec<ActionSummary>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ActionSummary {
    pub index: usize,
    pub opcode: u8,
    pub name: Option<String>,
    pub param_len: Option<usize>,
    pub recipient: Option<Address>,
}

/// Summarises `calldata` with the default configuration.
pub fn inspect(calldata: &[u8]) -> Result<PlanSummary, RewriteError> {
    inspect_with_config(calldata, &RewriterConfig::default())
}

/// Summarises `calldata` under `config`.
///
/// Opcodes are classified and the params-length policy applied as the
/// rewriter does. Under the lenient policy an action without a param is
/// listed with no param instead of failing.
pub fn inspect_with_config(
    calldata: &[u8],
    config: &RewriterConfig,
) -> Result<PlanSummary, RewriteError> {
    let payload = ExecutePayload::decode(calldata)?;
    let inputs = payload.inputs();

    let mut commands = Vec::with_capacity(payload.commands().len());
    for (index, &opcode) in payload.commands().iter().enumerate() {
        let command = Command::from_byte(opcode, config.honor_revert_flag);
        let input = inputs.get(index);
        let mut summary = CommandSummary {
            index,
            opcode,
            name: command.map(|c| format!("{c:?}")),
            input_len: input.map(|b| b.len()),
            recipient: None,
            actions: Vec::new(),
        };

        if let (Some(command), Some(input)) = (command, input) {
            let decode_err = |source| RewriteError::CommandDecode {
                index,
                command,
                source,
            };
            match command {
                Command::Sweep => {
                    let params =
                        <SweepParams as SolValue>::abi_decode_validate(input).map_err(decode_err)?;
                    summary.recipient = Some(params.recipient);
                }
                Command::PayPortion => {
                    let params = <PayPortionParams as SolValue>::abi_decode_validate(input)
                        .map_err(decode_err)?;
                    summary.recipient = Some(params.recipient);
                }
                Command::V4Swap => {
                    let swap = <V4SwapParams as SolValue>::abi_decode_params_validate(input)
                        .map_err(decode_err)?;
                    if config.params_length == ParamsLengthPolicy::Strict
                        && swap.params.len() < swap.actions.len()
                    {
                        return Err(RewriteError::ActionParamsLength {
                            command_index: index,
                            actions: swap.actions.len(),
                            params: swap.params.len(),
                        });
                    }
                    summary.actions = summarize_actions(index, &swap.actions, &swap.params)?;
                }
                _ => {}
            }
        }

        commands.push(summary);
    }

    Ok(PlanSummary {
        deadline: payload.deadline(),
        extra_inputs: inputs.len().saturating_sub(commands.len()),
        commands,
    })
}

fn summarize_actions(
    command_index: usize,
    actions: &[u8],
    params: &[Bytes],
) -> Result<Vec<ActionSummary>, RewriteError> {
    let mut out = Vec::with_capacity(actions.len());
    for (index, &opcode) in actions.iter().enumerate() {
        let action = Action::from_byte(opcode);
        let param = params.get(index);
        let mut summary = ActionSummary {
            index,
            opcode,
            name: action.map(|a| format!("{a:?}")),
            param_len: param.map(|b| b.len()),
            recipient: None,
        };

        if let (Some(action), Some(param)) = (action, param) {
            let decode_err = |source| RewriteError::ActionDecode {
                command_index,
                action_index: index,
                action,
                source,
            };
            summary.recipient = match action {
                Action::Take => Some(
                    <TakeParams as SolValue>::abi_decode_validate(param)
                        .map_err(decode_err)?
                        .recipient,
                ),
                Action::TakePortion => Some(
                    <TakePortionParams as SolValue>::abi_decode_validate(param)
                        .map_err(decode_err)?
                        .recipient,
                ),
                _ => None,
            };
        }

        out.push(summary);
    }
    Ok(out)
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.deadline {
            Some(deadline) => writeln!(f, "deadline: {deadline}")?,
            None => writeln!(f, "deadline: none")?,
        }
        for command in &self.commands {
            write!(
                f,
                "[{}] 0x{:02x} {}",
                command.index,
                command.opcode,
                command.name.as_deref().unwrap_or("Unknown")
            )?;
            match command.input_len {
                Some(len) => write!(f, " ({len} bytes)")?,
                None => write!(f, " (no input)")?,
            }
            if let Some(recipient) = command.recipient {
                write!(f, " recipient={recipient}")?;
            }
            writeln!(f)?;

            for action in &command.actions {
                write!(
                    f,
                    "    [{}] 0x{:02x} {}",
                    action.index,
                    action.opcode,
                    action.name.as_deref().unwrap_or("Unknown")
                )?;
                if action.param_len.is_none() {
                    write!(f, " (no param)")?;
                }
                if let Some(recipient) = action.recipient {
                    write!(f, " recipient={recipient}")?;
                }
                writeln!(f)?;
            }
        }
        if self.extra_inputs > 0 {
            writeln!(f, "extra inputs: {}", self.extra_inputs)?;
        }
        Ok(())
    }
}
