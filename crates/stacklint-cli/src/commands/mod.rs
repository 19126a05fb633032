// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI command implementations. Each returns the process exit code.

pub mod check;
pub mod explain;
pub mod phase;
