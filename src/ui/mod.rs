//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The viewer replays a recorded parse trace one shift or reduce at a time.
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus, playback
//! - **[`panes`]**: stateless render functions for each visible pane (source,
//!   parse stack, trace, output, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with the source, the
//! recorded [`TraceStep`]s and the parse outcome, then call [`App::run`] to
//! start the event loop.
//!
//! [`TraceStep`]: crate::trace::TraceStep
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
