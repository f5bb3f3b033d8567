//! Source pane rendering with syntax highlighting
//!
//! This module renders the source pane, which displays the program being
//! parsed with basic syntax highlighting and the current step's line.
//!
//! # Features
//!
//! - Syntax highlighting for keywords, types, strings and numbers
//! - Current line highlighting; the line of a halted parse is shown in red
//! - Scroll state that keeps the current line at a fixed row while stepping
//! - Line numbering

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Simple syntax highlighting for Start/end source
fn highlight_source_code(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Handle strings
        if c == '"' {
            if !current_word.is_empty() {
                spans.push(word_span(std::mem::take(&mut current_word), false));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end] != '"' {
                if chars[end] == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            let end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Handle non-alphanumeric (delimiters)
        if !c.is_alphanumeric() && c != '_' && c != '.' {
            if !current_word.is_empty() {
                spans.push(word_span(std::mem::take(&mut current_word), c == '('));
            }

            let style = match c {
                '(' | ')' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };

            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        spans.push(word_span(current_word, false));
    }

    Line::from(spans)
}

fn word_span(word: String, is_call: bool) -> Span<'static> {
    let style = get_keyword_style(&word, is_call);
    Span::styled(word, style)
}

fn get_keyword_style(word: &str, is_call: bool) -> Style {
    match word {
        "int" | "float" | "string" | "bool" => Style::default().fg(DEFAULT_THEME.type_name),
        "Start" | "end" | "var" | "if" | "then" | "else" | "while" | "do" | "function"
        | "begin" | "return" | "and" | "or" | "not" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "true" | "false" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.nonterminal),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to (None until the first render)
    pub target_line_row: Option<usize>,
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: usize,
    is_error: bool,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = super::pane_block(" Source ", is_focused);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // borders

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // Keep the current line at the target row
    if current_line > 0 && current_line <= total_lines {
        let target_line_idx = current_line - 1;
        scroll_state.offset = super::clamp_scroll(
            target_line_idx.saturating_sub(target_row),
            total_lines,
            visible_height,
        );
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;
            let line_num_str = format!("{:4} ", line_num);

            let mut content_line = highlight_source_code(line);

            let num_style = if is_current && is_error {
                // Halted here: red background, white text
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.error)
                    .fg(ratatui::style::Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content_line.spans {
                    span.style = error_style;
                }
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                let current_style = Style::default().bg(DEFAULT_THEME.current_line_bg);
                for span in &mut content_line.spans {
                    span.style = span.style.patch(current_style);
                }
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut final_spans = vec![Span::styled(line_num_str, num_style)];
            final_spans.extend(content_line.spans);

            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_splits_words_and_strings() {
        let line = highlight_source_code("x := f(\"a b\", 2.5);");
        assert_eq!(
            words(&line),
            vec!["x", " ", ":", "=", " ", "f", "(", "\"a b\"", ",", " ", "2.5", ")", ";"]
        );
    }

    #[test]
    fn test_keyword_styles() {
        assert_eq!(
            get_keyword_style("while", false).fg,
            Some(DEFAULT_THEME.keyword)
        );
        assert_eq!(
            get_keyword_style("bool", false).fg,
            Some(DEFAULT_THEME.type_name)
        );
        assert_eq!(get_keyword_style("42", false).fg, Some(DEFAULT_THEME.number));
        assert_eq!(
            get_keyword_style("f", true).fg,
            Some(DEFAULT_THEME.nonterminal)
        );
    }

    #[test]
    fn test_unterminated_string_highlight() {
        let line = highlight_source_code("\"open");
        assert_eq!(words(&line), vec!["\"open"]);
    }
}
