//! Injectable observation of rewrite decisions
//!
//! The rewriter reports every recipient it classifies to a [`RewriteTracer`].
//! The default tracer does nothing; [`LogTracer`] forwards decisions to the
//! `log` facade and `Vec<RecipientEvent>` records them.

use alloy_primitives::Address;
use serde::Serialize;

use crate::commands::{Action, Command};
use crate::recipient::RecipientDecision;

/// Where in the plan a recipient was found
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "level")]
pub enum Location {
    Command {
        index: usize,
        #[serde(serialize_with = "serialize_debug")]
        command: Command,
    },
    Action {
        command_index: usize,
        action_index: usize,
        #[serde(serialize_with = "serialize_debug")]
        action: Action,
    },
}

/// A single recipient decision
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RecipientEvent {
    pub location: Location,
    pub recipient: Address,
    pub decision: RecipientDecision,
}

pub trait RewriteTracer {
    fn on_recipient(&mut self, _event: &RecipientEvent) {}
}

/// Tracer that ignores every event
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopTracer;

impl RewriteTracer for NoopTracer {}

/// Tracer that logs every event at debug level
#[derive(Copy, Clone, Debug, Default)]
pub struct LogTracer;

impl RewriteTracer for LogTracer {
    fn on_recipient(&mut self, event: &RecipientEvent) {
        match event.location {
            Location::Command { index, command } => log::debug!(
                "command {index} ({command:?}): recipient {} -> {:?}",
                event.recipient,
                event.decision
            ),
            Location::Action {
                command_index,
                action_index,
                action,
            } => log::debug!(
                "command {command_index} action {action_index} ({action:?}): recipient {} -> {:?}",
                event.recipient,
                event.decision
            ),
        }
    }
}

impl RewriteTracer for Vec<RecipientEvent> {
    fn on_recipient(&mut self, event: &RecipientEvent) {
        self.push(event.clone());
    }
}

/// Forwards every event to both tracers, in order
impl<A: RewriteTracer, B: RewriteTracer> RewriteTracer for (A, B) {
    fn on_recipient(&mut self, event: &RecipientEvent) {
        self.0.on_recipient(event);
        self.1.on_recipient(event);
    }
}

impl<T: RewriteTracer + ?Sized> RewriteTracer for &mut T {
    fn on_recipient(&mut self, event: &RecipientEvent) {
        (**self).on_recipient(event);
    }
}

fn serialize_debug<T: std::fmt::Debug, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{value:?}"))
}
