//! Output pane rendering: the AST outline of an accepted parse, or the
//! diagnostics of a halted one

use crate::parser::ast::Program;
use crate::parser::diagnostics::Diagnostic;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding},
    Frame,
};

/// Render the output pane
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    outcome: &Result<Program, Vec<Diagnostic>>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let (title, lines, color) = match outcome {
        Ok(program) => (" AST ", program.outline(), DEFAULT_THEME.fg),
        Err(diagnostics) => (
            " Diagnostics ",
            diagnostics.iter().map(|d| d.to_string()).collect(),
            DEFAULT_THEME.error,
        ),
    };
    let block = super::pane_block(title, is_focused).padding(Padding::new(1, 0, 0, 0));

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = super::clamp_scroll(*scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| ListItem::new(line).style(Style::default().fg(color)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
