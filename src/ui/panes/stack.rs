//! Parse stack pane rendering
//!
//! Shows the grammar symbols on the parse stack after the current step, top
//! of the stack first.

use crate::parser::grammar::Symbol;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn symbol_style(symbol: Symbol) -> Style {
    if symbol.is_nonterminal() {
        Style::default().fg(DEFAULT_THEME.nonterminal)
    } else {
        Style::default().fg(DEFAULT_THEME.keyword)
    }
}

/// Render the parse stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &[Symbol],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = super::pane_block(" Parse Stack ", is_focused);

    if stack.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = super::clamp_scroll(*scroll_offset, stack.len(), visible_height);

    let items: Vec<ListItem> = stack
        .iter()
        .enumerate()
        .rev()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(depth, symbol)| {
            let mut name_style = symbol_style(*symbol);
            if depth + 1 == stack.len() {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:3} ", depth),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(symbol.name(), name_style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
