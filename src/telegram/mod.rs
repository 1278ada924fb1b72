//! Telegram module for hostwatch
//!
//! Everything that talks to the Telegram Bot API lives here:
//! - Update polling and dispatch
//! - Per-chat onboarding sessions for adding hosts
//! - Inline keyboards and message formatting
//!
//! # Architecture
//!
//! ```text
//! telegram/
//! ├── mod.rs           # This file - public API
//! ├── polling.rs       # getUpdates loop + update dispatch
//! ├── session.rs       # per-chat add-host session state
//! ├── keyboards.rs     # inline keyboards
//! ├── formatters.rs    # HTML message formatters
//! └── commands/        # handlers
//!     ├── mod.rs       # message dispatch (/start, FSM input)
//!     ├── callbacks.rs # button click handlers
//!     ├── hosts.rs     # host list / detail / fetch flow
//!     └── onboarding.rs# add-host flow steps
//! ```

pub mod commands;
pub mod formatters;
pub mod keyboards;
pub mod polling;
pub mod session;

pub use formatters::render;
pub use polling::{run_polling, AppState};
pub use session::{get_session_manager, AddHostSession, AddHostStage, SessionManager};
