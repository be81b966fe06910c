use crate::app::App;
use crate::transcript::TranscriptLine;
use anyhow::Result;
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use textwrap::wrap;

pub fn draw<B: Backend>(term: &mut Terminal<B>, app: &App, model: &str) -> Result<()> {
    let lines = app.lines();
    term.draw(|frame| {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                " Sift ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "search-grounded answers",
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .wrap(Wrap { trim: true });
        frame.render_widget(header, layout[0]);

        let visible_h = layout[1].height.saturating_sub(2) as usize;
        let content_width = layout[1].width.saturating_sub(2) as usize;
        let wrapped = wrap_transcript(&lines, content_width);
        let total = wrapped.len();
        let scroll = app.scroll.min(total.saturating_sub(visible_h));
        let start = total.saturating_sub(visible_h + scroll);
        let end = total.saturating_sub(scroll);

        let items: Vec<ListItem> = wrapped[start..end]
            .iter()
            .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.clone(), *style))))
            .collect();

        let body = List::new(items).block(Block::default().borders(Borders::ALL).title(" Answer "));
        frame.render_widget(body, layout[1]);

        let input_box = Paragraph::new(app.input.as_str().to_string())
            .block(Block::default().borders(Borders::ALL).title(" Question "));
        frame.render_widget(Clear, layout[2]);
        frame.render_widget(input_box, layout[2]);

        let caret_x =
            layout[2].x + 1 + visual_caret_col(app.input.as_str(), app.input.cursor());
        frame.set_cursor_position(Position {
            x: caret_x,
            y: layout[2].y + 1,
        });

        let activity = match app.stage() {
            Some(stage) => Span::styled(stage.label(), Style::default().fg(Color::Yellow)),
            None => Span::styled("Idle", Style::default().fg(Color::Green)),
        };
        let status_line = Line::from(vec![
            Span::raw(" "),
            Span::styled(app.spinner(), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            activity,
            Span::styled(
                format!(" • {model} • Tab select • Enter toggle • /help"),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        let status = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        frame.render_widget(status, layout[3]);
    })?;

    Ok(())
}

fn visual_caret_col(input: &str, cursor: usize) -> u16 {
    use unicode_width::UnicodeWidthStr;
    UnicodeWidthStr::width(&input[..cursor]) as u16
}

fn wrap_transcript(lines: &[TranscriptLine], width: usize) -> Vec<(String, Style)> {
    let effective_width = width.max(1);
    let mut out = Vec::new();

    for entry in lines {
        let style = entry.style;
        for raw_line in entry.text.split('\n') {
            if raw_line.is_empty() {
                out.push((String::new(), style));
                continue;
            }
            // Keep the indent of continuation lines aligned with the first.
            let indent = " ".repeat(raw_line.len() - raw_line.trim_start().len());
            let options = textwrap::Options::new(effective_width).subsequent_indent(&indent);
            let segments = wrap(raw_line, options);
            if segments.is_empty() {
                out.push((String::new(), style));
            } else {
                out.extend(segments.into_iter().map(|seg| (seg.into_owned(), style)));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn wrapped_continuations_keep_indent() {
        let lines = vec![TranscriptLine::new(
            "    Content: one two three four five six",
            Style::default(),
        )];
        let out = wrap_transcript(&lines, 20);
        assert!(out.len() > 1);
        assert!(out[1..].iter().all(|(text, _)| text.starts_with("    ")));
    }

    #[test]
    fn draws_into_a_test_backend() {
        let mut term = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let app = App::new();
        draw(&mut term, &app, "scripted").unwrap();
        let buffer = term.backend().buffer().clone();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Sift"));
        assert!(rendered.contains("Idle"));
    }
}
