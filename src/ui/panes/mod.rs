//! TUI pane rendering modules
//!
//! This module provides the rendering logic for all visual panes in the TUI,
//! organized by responsibility.
//!
//! # Pane Modules
//!
//! - [`source`]: Source text with syntax highlighting and the current step's line
//! - [`stack`]: Parse stack symbols after the current step
//! - [`trace`]: The shift/reduce list with the current step highlighted
//! - [`output`]: AST outline or diagnostics
//! - [`status`]: Status bar with keybindings and playback state
//!
//! # Architecture
//!
//! Each pane module exports a primary `render_*` function taking the frame,
//! its area, the data to show, whether it is focused and its scroll state.

pub mod output;
pub mod source;
pub mod stack;
pub mod status;
pub mod trace;

// Re-export render functions for convenience
pub use output::render_output_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use trace::render_trace_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block whose border reflects focus
fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp a scroll offset so the last page stays full
fn clamp_scroll(offset: usize, total_items: usize, visible_height: usize) -> usize {
    if total_items > visible_height {
        offset.min(total_items - visible_height)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        assert_eq!(clamp_scroll(5, 3, 10), 0);
        assert_eq!(clamp_scroll(usize::MAX, 30, 10), 20);
        assert_eq!(clamp_scroll(4, 30, 10), 4);
    }
}
