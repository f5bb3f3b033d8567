//! Trace pane rendering: every recorded shift, reduce, accept and halt

use crate::trace::{TraceAction, TraceStep};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn action_style(action: &TraceAction) -> Style {
    match action {
        TraceAction::Shift { .. } => Style::default().fg(DEFAULT_THEME.keyword),
        TraceAction::Reduce { .. } => Style::default().fg(DEFAULT_THEME.nonterminal),
        TraceAction::Accept => Style::default()
            .fg(DEFAULT_THEME.success)
            .add_modifier(Modifier::BOLD),
        TraceAction::Halt { .. } => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD),
    }
}

/// Keep `current` inside the visible window
fn follow_current(offset: usize, current: usize, visible_height: usize) -> usize {
    if current < offset {
        current
    } else if current >= offset + visible_height {
        current + 1 - visible_height
    } else {
        offset
    }
}

/// Render the trace pane
pub fn render_trace_pane(
    frame: &mut Frame,
    area: Rect,
    steps: &[TraceStep],
    current: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Trace ({} steps) ", steps.len());
    let block = super::pane_block(&title, is_focused);

    if steps.is_empty() {
        let paragraph = Paragraph::new("(no steps recorded)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = super::clamp_scroll(
        follow_current(*scroll_offset, current, visible_height),
        steps.len(),
        visible_height,
    );

    let items: Vec<ListItem> = steps
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(index, step)| {
            let mut style = action_style(&step.action);
            if index == current {
                style = style
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:5} ", index + 1),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(step.action.to_string(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_current() {
        assert_eq!(follow_current(0, 3, 10), 0);
        assert_eq!(follow_current(0, 12, 10), 3);
        assert_eq!(follow_current(8, 2, 10), 2);
    }
}
