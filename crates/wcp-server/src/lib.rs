//! WCP Surface binary crate (`§4.4`, `§2` ~15% share): wires the Kernel,
//! Session Store, LLM Router, and Agent Scheduler behind the transports in
//! [`transport`], plus the `clap` CLI in [`cli`].

pub mod api;
pub mod cli;
pub mod dispatch;
pub mod run;
pub mod state;
pub mod transport;
