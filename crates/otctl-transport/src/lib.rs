//! Serial transport for OpenThread CLI devices.
//!
//! A [`Session`] owns one open serial endpoint for the duration of a single
//! operation and releases it when dropped, on every exit path. Endpoints are
//! obtained through a [`PortFactory`], which is the seam between the fleet logic
//! and the operating system:
//!
//! - [`SystemPortFactory`] opens real character devices through `serialport`
//! - [`mock::MockPortFactory`] serves scripted in-memory devices for tests
//!
//! No retries happen at this layer; callers own all retry policy.

mod error;
mod link;
pub mod mock;
mod session;
mod settings;

pub use error::*;
pub use link::*;
pub use session::*;
pub use settings::*;
