use crate::tui::state::{AppState, EntryKind, Focus, Page};
use chrono::Datelike;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(v_chunks[0]);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(h_chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(h_chunks[1]);

    draw_month(f, state, side_chunks[0]);
    draw_calendar_toggle(f, state, side_chunks[1]);
    draw_hymns(f, state, side_chunks[2]);
    draw_header(f, state, main_chunks[0]);
    draw_entries(f, state, main_chunks[1]);
    draw_footer(f, state, v_chunks[1]);
}

fn focus_style(state: &AppState, focus: Focus) -> Style {
    if state.focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_month(f: &mut Frame, state: &AppState, area: Rect) {
    let grid = state.view.month_grid();
    let cursor_in_month =
        state.cursor.year() == grid.year && state.cursor.month() == grid.month;
    let today_in_month = state.today.year() == grid.year && state.today.month() == grid.month;

    let mut lines = vec![Line::from(Span::styled(
        WEEKDAYS.join(" "),
        Style::default().fg(Color::DarkGray),
    ))];
    for week in &grid.weeks {
        let mut spans = Vec::new();
        for (i, cell) in week.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let Some(day) = *cell else {
                spans.push(Span::raw("  "));
                continue;
            };
            let mut style = Style::default();
            if today_in_month && state.today.day() == day {
                style = style.fg(Color::Cyan);
            }
            if grid.is_selected(day) {
                style = style.add_modifier(Modifier::BOLD).bg(Color::Blue);
            }
            if cursor_in_month && state.cursor.day() == day && state.focus == Focus::Calendar {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!("{:>2}", day), style));
        }
        lines.push(Line::from(spans));
    }

    let month = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.view.month_label()))
            .border_style(focus_style(state, Focus::Calendar)),
    );
    f.render_widget(month, area);
}

fn draw_calendar_toggle(f: &mut Frame, state: &AppState, area: Rect) {
    let label = match state.view.calendar {
        crate::calendar::CalendarSystem::Julian => "[Old Calendar]  New Calendar ",
        crate::calendar::CalendarSystem::Gregorian => " Old Calendar  [New Calendar]",
    };
    let toggle = Paragraph::new(label)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Calendar "));
    f.render_widget(toggle, area);
}

fn draw_hymns(f: &mut Frame, state: &AppState, area: Rect) {
    let hymns = &state.hymns;
    let playlist = hymns.playlist();
    let mut lines = Vec::new();

    if hymns.tracks().is_empty() {
        lines.push(Line::from(Span::styled(
            "No hymns found.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let playing = hymns
            .now_playing()
            .unwrap_or_else(|| format!("{} hymns ready.", hymns.tracks().len()));
        lines.push(Line::from(playing));
        if playlist.is_paused() {
            lines.push(Line::from(Span::styled(
                "Paused",
                Style::default().fg(Color::Yellow),
            )));
        }
    }
    lines.push(Line::from(format!(
        "Volume: {:>3}%",
        (playlist.volume() * 100.0).round() as u32
    )));
    lines.push(Line::from(if playlist.is_looping() {
        "Loop: on"
    } else {
        "Loop: off"
    }));

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Hymns "));
    f.render_widget(panel, area);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let lines = match (state.page, &state.day) {
        (Page::Prayers, _) => vec![Line::from(Span::styled(
            "Daily Prayers",
            Style::default().add_modifier(Modifier::BOLD),
        ))],
        (Page::Day, Some(day)) => {
            let mut lines = vec![Line::from(Span::styled(
                day.civil_date.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if let Some(lit) = &day.liturgical_date {
                lines.push(Line::from(format!("{} {}", day.calendar_label, lit)));
            }
            lines
        }
        (Page::Day, None) => vec![Line::from(crate::calendar::civil_label(
            state.view.selected(),
        ))],
    };
    let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_entries(f: &mut Frame, state: &mut AppState, area: Rect) {
    // Borders plus the highlight symbol.
    let width = area.width.saturating_sub(4).max(10) as usize;

    let items: Vec<ListItem> = state
        .entries
        .iter()
        .map(|entry| match entry.kind {
            EntryKind::Heading => ListItem::new(Line::from(Span::styled(
                entry.title.to_uppercase(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))),
            EntryKind::Card => {
                let mut lines: Vec<Line> = wrap_text(&entry.title, width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::White))))
                    .collect();
                if let Some(sub) = &entry.subtitle {
                    lines.extend(wrap_text(sub, width).into_iter().map(|l| {
                        Line::from(Span::styled(l, Style::default().fg(Color::DarkGray)))
                    }));
                }
                if entry.expanded
                    && let Some(detail) = &entry.detail
                {
                    lines.extend(
                        wrap_text(detail, width.saturating_sub(2))
                            .into_iter()
                            .map(|l| Line::from(format!("  {}", l))),
                    );
                }
                let toggle = entry.toggle_label();
                if !toggle.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("  [{}]", toggle),
                        Style::default().fg(Color::Blue),
                    )));
                }
                ListItem::new(lines)
            }
        })
        .collect();

    let title = match (state.page, state.loading) {
        (Page::Prayers, _) => " Prayers ".to_string(),
        (Page::Day, true) => " Day (Loading...) ".to_string(),
        (Page::Day, false) => " Day ".to_string(),
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(state, Focus::Day)),
        )
        .highlight_symbol("> ")
        .highlight_style(Style::default().bg(Color::DarkGray));
    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let f_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let status = Paragraph::new(state.message.clone())
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                .title(" Status "),
        );
    let help_text = match state.focus {
        Focus::Calendar => "Enter:Select | []:Month | c:Calendar | t:Today | r:Prayers | m:Hymn",
        Focus::Day => "Enter:Expand | Tab:Calendar | r:Prayers | m/p/n/N/l:Hymns | +/-:Vol",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                .title(" Actions "),
        );
    f.render_widget(status, f_chunks[0]);
    f.render_widget(help, f_chunks[1]);
}

/// Greedy word wrap; explicit newlines are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::wrap_text;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("In the beginning was the Word", 12),
            vec!["In the", "beginning", "was the Word"]
        );
    }

    #[test]
    fn keeps_blank_lines_and_long_words() {
        assert_eq!(
            wrap_text("a\n\nsupercalifragilistic", 5),
            vec!["a", "", "supercalifragilistic"]
        );
    }
}
