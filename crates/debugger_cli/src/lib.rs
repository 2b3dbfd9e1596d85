//! Command line host for a CrewAI debugging session.
//!
//! ## Usage
//!
//! ```text
//! crew-debugger --agents agents.yaml --tasks tasks.yaml \
//!     --crew crew.py --main main.py [--tools tools.py] [--error-log error.txt]
//! ```
//!
//! The files are read once at startup, the initial analysis runs immediately,
//! and every following line is sent as a follow-up question. Lines starting
//! with `/` are commands (`/help`, `/retry`, `/export [path]`, `/reset`,
//! `/quit`).
//!
//! ## Configuration
//!
//! The API key is read from `ANTHROPIC_API_KEY`. Set
//! `CREW_DEBUGGER_CONFIG_PATH` to a readable UTF-8 JSON file to override
//! transport settings:
//!
//! ```json
//! {
//!   "api_key": "sk-ant-...",
//!   "model": "claude-sonnet-4-20250514",
//!   "max_tokens": 8000,
//!   "connect_timeout_sec": 60,
//!   "request_timeout_sec": 120,
//!   "retry_attempts": 3,
//!   "retry_delay_sec": 3
//! }
//! ```
//!
//! Contract notes:
//! - Every field is optional; `api_key` in the file wins over the environment.
//! - Numeric fields must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr.

pub mod commands;
pub mod config;
pub mod files;
pub mod repl;
