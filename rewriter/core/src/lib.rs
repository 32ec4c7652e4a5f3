//! Smart-pool calldata rewriting for the Uniswap Universal Router
//!
//! Swap calldata built for an end user pays settlement outputs to that
//! user. When the swap is executed on behalf of a Rigoblock smart pool, the
//! outputs must land in the pool instead. [`CalldataRewriter`] patches the
//! recipient of every `SWEEP` and `PAY_PORTION` command, and of every `TAKE`
//! and `TAKE_PORTION` action nested in `V4_SWAP`, and re-encodes the call
//! without touching anything else.
//!
//! ```rust,ignore
//! use smartpool_calldata::CalldataRewriter;
//!
//! let rewriter = CalldataRewriter::new(pool_address);
//! let patched = rewriter.rewrite(&calldata)?;
//! ```

pub mod commands;
pub mod config;
mod dispatch;
pub mod error;
pub mod inspect;
pub mod recipient;
pub mod rewriter;
pub mod trace;

pub use commands::{Action, Command};
pub use config::{ParamsLengthPolicy, RewriterConfig};
pub use error::RewriteError;
pub use inspect::{PlanSummary, inspect, inspect_with_config};
pub use recipient::{ADDRESS_THIS, MSG_SENDER, RecipientDecision, RecipientPolicy, Sentinel};
pub use rewriter::{CalldataRewriter, rewrite_calldata};
pub use trace::{Location, LogTracer, NoopTracer, RecipientEvent, RewriteTracer};
