//! OpenThread CLI UART Protocol
//!
//! This crate provides types and utilities for talking to OpenThread-capable
//! radio boards over their UART CLI. Both supported board families expose a
//! plain line-based text interface; they differ only in how the OpenThread
//! commands are reached:
//!
//! - **Zephyr (nRF)** boards run the Zephyr shell, where OpenThread commands are
//!   prefixed with `ot ` and the prompt is `uart:~$ `.
//! - **EFR32** boards run the native OpenThread CLI, where commands are sent bare
//!   and the prompt is `> `.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → firmware): ASCII text terminated with `\r\n`
//! - **Echo**: The firmware echoes the command line back before replying
//! - **Responses**: Zero or more lines of output followed by `Done` on success or
//!   `Error <n>: <reason>` on failure, then a prompt
//!
//! There is no framing, checksum or handshake beyond these textual markers, so
//! responses are classified by substring search rather than strict parsing.
//!
//! # Example
//!
//! ```rust
//! use otctl_cli_protocol::{classify_state, CliDialect, Command, ThreadRole};
//!
//! let cmd = Command::State;
//! assert_eq!(cmd.encode(CliDialect::Zephyr), b"ot state\r\n");
//!
//! assert_eq!(classify_state("ot state\r\nleader\r\nDone\r\n"), ThreadRole::Leader);
//! ```

mod codec;
mod commands;
mod error;
mod responses;

pub use codec::*;
pub use commands::*;
pub use error::*;
pub use responses::*;
