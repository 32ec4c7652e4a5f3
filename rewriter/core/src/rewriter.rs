use std::borrow::Cow;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};

use crate::commands::{
    Action, Command, IUniversalRouter, PayPortionParams, SweepParams, TakeParams,
    TakePortionParams, V4SwapParams,
};
use crate::config::{ParamsLengthPolicy, RewriterConfig};
use crate::dispatch::{PlanStep, rewrite_plan};
use crate::error::RewriteError;
use crate::recipient::RecipientPolicy;
use crate::trace::{Location, NoopTracer, RecipientEvent, RewriteTracer};

/// A decoded `execute` call, remembering which overload it came from
pub(crate) enum ExecutePayload {
    WithDeadline(IUniversalRouter::execute_0Call),
    NoDeadline(IUniversalRouter::execute_1Call),
}

impl ExecutePayload {
    pub(crate) fn decode(calldata: &[u8]) -> Result<Self, RewriteError> {
        let decoded = if calldata.starts_with(&IUniversalRouter::execute_1Call::SELECTOR) {
            IUniversalRouter::execute_1Call::abi_decode(calldata).map(Self::NoDeadline)
        } else {
            IUniversalRouter::execute_0Call::abi_decode(calldata).map(Self::WithDeadline)
        };
        decoded.map_err(|source| RewriteError::OuterDecode { source })
    }

    pub(crate) fn commands(&self) -> &[u8] {
        match self {
            Self::WithDeadline(call) => &call.commands,
            Self::NoDeadline(call) => &call.commands,
        }
    }

    pub(crate) fn inputs(&self) -> &[Bytes] {
        match self {
            Self::WithDeadline(call) => &call.inputs,
            Self::NoDeadline(call) => &call.inputs,
        }
    }

    pub(crate) fn deadline(&self) -> Option<U256> {
        match self {
            Self::WithDeadline(call) => Some(call.deadline),
            Self::NoDeadline(_) => None,
        }
    }

    /// Re-encodes the call with the same overload and a new input list.
    fn encode_with_inputs(self, inputs: Vec<Bytes>) -> Vec<u8> {
        match self {
            Self::WithDeadline(call) => {
                IUniversalRouter::execute_0Call { inputs, ..call }.abi_encode()
            }
            Self::NoDeadline(call) => {
                IUniversalRouter::execute_1Call { inputs, ..call }.abi_encode()
            }
        }
    }
}

/// Argument tuples that pay out to a recipient
trait Settlement: Sized {
    fn decode(data: &[u8]) -> Result<Self, alloy_sol_types::Error>;
    fn encode(&self) -> Vec<u8>;
    fn recipient_mut(&mut self) -> &mut Address;
}

macro_rules! impl_settlement {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Settlement for $ty {
                fn decode(data: &[u8]) -> Result<Self, alloy_sol_types::Error> {
                    <$ty as SolValue>::abi_decode_validate(data)
                }

                fn encode(&self) -> Vec<u8> {
                    <$ty as SolValue>::abi_encode(self)
                }

                fn recipient_mut(&mut self) -> &mut Address {
                    &mut self.recipient
                }
            }
        )*
    };
}

impl_settlement!(SweepParams, PayPortionParams, TakeParams, TakePortionParams);

/// Decodes a settlement tuple and re-encodes it if its recipient is redirected.
fn redirect_settlement<P: Settlement, T: RewriteTracer>(
    data: &[u8],
    location: Location,
    policy: &RecipientPolicy,
    tracer: &mut T,
) -> Result<Option<Bytes>, alloy_sol_types::Error> {
    let mut params = P::decode(data)?;
    let recipient = params.recipient_mut();
    let decision = policy.classify(*recipient);
    tracer.on_recipient(&RecipientEvent {
        location,
        recipient: *recipient,
        decision,
    });
    if !decision.is_redirect() {
        return Ok(None);
    }
    *recipient = policy.target();
    Ok(Some(params.encode().into()))
}

struct CommandStep<'a, T> {
    policy: &'a RecipientPolicy,
    config: &'a RewriterConfig,
    tracer: &'a mut T,
}

impl<T: RewriteTracer> CommandStep<'_, T> {
    fn rewrite_v4_swap(
        &mut self,
        index: usize,
        arg: &Bytes,
    ) -> Result<Option<Bytes>, RewriteError> {
        let swap = <V4SwapParams as SolValue>::abi_decode_params_validate(arg).map_err(
            |source| RewriteError::CommandDecode {
                index,
                command: Command::V4Swap,
                source,
            },
        )?;

        if self.config.params_length == ParamsLengthPolicy::Strict
            && swap.params.len() < swap.actions.len()
        {
            return Err(RewriteError::ActionParamsLength {
                command_index: index,
                actions: swap.actions.len(),
                params: swap.params.len(),
            });
        }

        let mut step = ActionStep {
            command_index: index,
            policy: self.policy,
            tracer: &mut *self.tracer,
        };
        let Some(params) = rewrite_plan(&swap.actions, &swap.params, &mut step)? else {
            return Ok(None);
        };

        let patched = V4SwapParams {
            actions: swap.actions,
            params,
        };
        Ok(Some(patched.abi_encode_params().into()))
    }
}

impl<T: RewriteTracer> PlanStep for CommandStep<'_, T> {
    type Op = Command;

    fn opcode(&self, raw: u8) -> Option<Command> {
        Command::from_byte(raw, self.config.honor_revert_flag)
    }

    fn rewrite(
        &mut self,
        index: usize,
        command: Command,
        arg: &Bytes,
    ) -> Result<Option<Bytes>, RewriteError> {
        let location = Location::Command { index, command };
        let result = match command {
            Command::Sweep => {
                redirect_settlement::<SweepParams, _>(arg, location, self.policy, self.tracer)
            }
            Command::PayPortion => {
                redirect_settlement::<PayPortionParams, _>(arg, location, self.policy, self.tracer)
            }
            Command::V4Swap => return self.rewrite_v4_swap(index, arg),
            _ => return Ok(None),
        };
        result.map_err(|source| RewriteError::CommandDecode {
            index,
            command,
            source,
        })
    }

    // commands past the end of `inputs` are ignored
    fn missing(&self, _index: usize, _command: Command) -> Option<RewriteError> {
        None
    }
}

struct ActionStep<'a, T> {
    command_index: usize,
    policy: &'a RecipientPolicy,
    tracer: &'a mut T,
}

impl<T: RewriteTracer> PlanStep for ActionStep<'_, T> {
    type Op = Action;

    fn opcode(&self, raw: u8) -> Option<Action> {
        Action::from_byte(raw)
    }

    fn rewrite(
        &mut self,
        action_index: usize,
        action: Action,
        arg: &Bytes,
    ) -> Result<Option<Bytes>, RewriteError> {
        let location = Location::Action {
            command_index: self.command_index,
            action_index,
            action,
        };
        let result = match action {
            Action::Take => {
                redirect_settlement::<TakeParams, _>(arg, location, self.policy, self.tracer)
            }
            Action::TakePortion => {
                redirect_settlement::<TakePortionParams, _>(arg, location, self.policy, self.tracer)
            }
            _ => return Ok(None),
        };
        result.map_err(|source| RewriteError::ActionDecode {
            command_index: self.command_index,
            action_index,
            action,
            source,
        })
    }

    fn missing(&self, action_index: usize, action: Action) -> Option<RewriteError> {
        match action {
            Action::Take | Action::TakePortion => Some(RewriteError::MissingActionParam {
                command_index: self.command_index,
                action_index,
                action,
            }),
            _ => None,
        }
    }
}

/// Rewrites Universal Router `execute` calldata so that settlement outputs
/// go to a smart pool
///
/// `SWEEP` and `PAY_PORTION` commands, and `TAKE` and `TAKE_PORTION` actions
/// nested in `V4_SWAP`, have their recipient replaced by the target unless
/// it already is the target or a router sentinel. Everything else is left
/// byte for byte as it was.
#[derive(Clone, Debug)]
pub struct CalldataRewriter {
    policy: RecipientPolicy,
    config: RewriterConfig,
}

impl CalldataRewriter {
    pub fn new(target: Address) -> Self {
        Self::with_config(target, RewriterConfig::default())
    }

    pub fn with_config(target: Address, config: RewriterConfig) -> Self {
        Self {
            policy: RecipientPolicy::new(target),
            config,
        }
    }

    pub fn target(&self) -> Address {
        self.policy.target()
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Rewrites `calldata`, borrowing it back unchanged when no recipient
    /// needed redirecting.
    ///
    /// # Errors
    ///
    /// Fails if the calldata is not an `execute` call or if the input of a
    /// recognised command or action does not decode.
    pub fn rewrite<'a>(&self, calldata: &'a [u8]) -> Result<Cow<'a, [u8]>, RewriteError> {
        self.rewrite_traced(calldata, &mut NoopTracer)
    }

    /// Same as [`rewrite`](Self::rewrite), reporting each recipient decision to
    /// `tracer`.
    pub fn rewrite_traced<'a, T: RewriteTracer>(
        &self,
        calldata: &'a [u8],
        tracer: &mut T,
    ) -> Result<Cow<'a, [u8]>, RewriteError> {
        let payload = ExecutePayload::decode(calldata)?;

        let mut step = CommandStep {
            policy: &self.policy,
            config: &self.config,
            tracer,
        };
        match rewrite_plan(payload.commands(), payload.inputs(), &mut step)? {
            None => Ok(Cow::Borrowed(calldata)),
            Some(inputs) => Ok(Cow::Owned(payload.encode_with_inputs(inputs))),
        }
    }
}

/// One-shot rewrite with the default configuration.
pub fn rewrite_calldata(
    calldata: &[u8],
    target: Address,
) -> Result<Cow<'_, [u8]>, RewriteError> {
    CalldataRewriter::new(target).rewrite(calldata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use pretty_assertions::assert_eq;

    const POOL: Address = address!("0x00000000000000000000000000000000000b0b01");
    const USER: Address = address!("0x1111111111111111111111111111111111111111");
    const WETH: Address = address!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

    fn encode_execute_call(commands: &[u8], inputs: Vec<Vec<u8>>, deadline: u64) -> Vec<u8> {
        IUniversalRouter::execute_0Call {
            commands: Bytes::from(commands.to_vec()),
            inputs: inputs.into_iter().map(Bytes::from).collect(),
            deadline: U256::from(deadline),
        }
        .abi_encode()
    }

    fn sweep(recipient: Address) -> Vec<u8> {
        SweepParams {
            token: WETH,
            recipient,
            amountMinimum: U256::from(1000),
        }
        .abi_encode()
    }

    #[test]
    fn test_execute_payload_accessors() {
        let input = encode_execute_call(&[0x04, 0x0b], vec![sweep(USER)], 1_700_000_000);
        let payload = ExecutePayload::decode(&input).unwrap();
        assert_eq!(payload.commands(), &[0x04, 0x0b]);
        assert_eq!(payload.inputs().len(), 1);
        assert_eq!(payload.deadline(), Some(U256::from(1_700_000_000u64)));
    }

    #[test]
    fn test_execute_payload_rejects_other_calls() {
        for input in [&[][..], &[0xde, 0xad, 0xbe, 0xef, 0x00][..]] {
            assert!(matches!(
                ExecutePayload::decode(input),
                Err(RewriteError::OuterDecode { .. })
            ));
        }
    }

    #[test]
    fn test_settlement_encoding_is_three_words() {
        assert_eq!(sweep(USER).len(), 96);
        let decoded = <SweepParams as Settlement>::decode(&sweep(USER)).unwrap();
        assert_eq!(decoded.recipient, USER);
        assert_eq!(decoded.encode(), sweep(USER));
    }

    #[test]
    fn test_redirect_settlement_reports_decision() {
        let policy = RecipientPolicy::new(POOL);
        let mut events = Vec::new();
        let location = Location::Command {
            index: 3,
            command: Command::Sweep,
        };

        let out =
            redirect_settlement::<SweepParams, _>(&sweep(USER), location, &policy, &mut events)
                .unwrap();
        assert_eq!(out, Some(Bytes::from(sweep(POOL))));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient, USER);
        assert!(events[0].decision.is_redirect());

        let out =
            redirect_settlement::<SweepParams, _>(&sweep(POOL), location, &policy, &mut events)
                .unwrap();
        assert_eq!(out, None);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_rewrite_borrows_when_unchanged() {
        let input = encode_execute_call(&[0x04], vec![sweep(POOL)], 1);
        let out = CalldataRewriter::new(POOL).rewrite(&input).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_rewrite_owns_when_changed() {
        let input = encode_execute_call(&[0x04], vec![sweep(USER)], 1);
        let out = rewrite_calldata(&input, POOL).unwrap();
        assert!(matches!(out, Cow::Owned(_)));
        assert_eq!(out.as_ref(), encode_execute_call(&[0x04], vec![sweep(POOL)], 1));
    }
}
