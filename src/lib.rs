//! A Tokio-based toolkit for concurrent execution of units of work with one
//! shared cancellation and decoration model.
//!
//! A unit of work ([`Call`]) is an async function from an input to an output
//! or error. It can be wrapped in composable decorators ([`CallOption`]:
//! timeouts, fail-fast escalation) and handed to one of three runners:
//!
//! - [`run_from_input`]: one invocation, one-result stream;
//! - [`run_from_channel`]: sequential consumption of an input stream;
//! - [`run_worker_pool`]: a bounded pool of workers over a shared input
//!   stream, fanned back into one merged result stream.
//!
//! The fan-out/fan-in primitives ([`spawn_pool`], [`merge_pool`],
//! [`merge_signal_pool`]) are exposed for callers that need to aggregate
//! their own conduit pools, including the signal-gated variant for
//! externally scheduled release of outputs.

mod call;
mod context;
mod error;
mod fanin;
mod options;
mod pool;
mod result;
mod single;
mod streaming;

pub use call::{call_fn, Call, CallOption};
pub use context::Context;
pub use error::{CallError, ExecError};
pub use fanin::{merge_pool, merge_signal_pool, spawn_pool, try_recv_signal, try_send};
pub use options::{FailFastOption, TimeoutOption};
pub use pool::run_worker_pool;
pub use result::CallResult;
pub use single::run_from_input;
pub use streaming::run_from_channel;
