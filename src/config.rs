// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! by the vault core. Configuration is read from the environment by the
//! embedding application at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the record store | `data` |
//! | `RUST_LOG` | Log level filter (tracing) | `info` |

/// Environment variable name for the record store root directory.
///
/// All user documents and sealed goal tokens live under this directory;
/// see [`crate::storage`] for the layout.
///
/// # Default
/// `data` (relative to the process working directory)
pub const DATA_DIR_ENV: &str = "DATA_DIR";
