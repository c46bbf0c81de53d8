use crate::audio::AudioEngine;
use crate::core::PlayerController;
use crate::view::{self, NowPlaying, PlayIcon};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap};

const APP_TITLE_WITH_VERSION: &str = "playbar v0.1.0  ";

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    panel_bg: Color,
    panel_alt_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    selected_bg: Color,
}

const PALETTE: Palette = Palette {
    bg: Color::Rgb(10, 15, 24),
    panel_bg: Color::Rgb(19, 29, 43),
    panel_alt_bg: Color::Rgb(24, 38, 58),
    border: Color::Rgb(69, 121, 176),
    text: Color::Rgb(214, 228, 248),
    muted: Color::Rgb(149, 173, 204),
    accent: Color::Rgb(100, 203, 184),
    alert: Color::Rgb(249, 174, 88),
    selected_bg: Color::Rgb(34, 55, 82),
};

/// Screen regions the event loop needs for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Regions {
    pub track_list: Rect,
    pub seek_bar: Rect,
    pub volume_bar: Rect,
}

struct Layouts {
    header: Rect,
    list: Rect,
    info: Rect,
    timeline: Rect,
    footer: Rect,
}

fn layouts(area: Rect) -> Layouts {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(vertical[1]);

    Layouts {
        header: vertical[0],
        list: body[0],
        info: body[1],
        timeline: vertical[2],
        footer: vertical[3],
    }
}

fn timeline_chunks(timeline: Rect) -> [Rect; 3] {
    let inner = timeline.inner(Margin {
        vertical: 1,
        horizontal: 1,
    });
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(18),
        ])
        .split(inner);
    [chunks[0], chunks[1], chunks[3]]
}

pub fn regions(area: Rect) -> Regions {
    let layout = layouts(area);
    let [_, seek_bar, volume_bar] = timeline_chunks(layout.timeline);
    Regions {
        track_list: layout.list.inner(Margin {
            vertical: 1,
            horizontal: 1,
        }),
        seek_bar,
        volume_bar,
    }
}

pub fn draw(
    frame: &mut Frame,
    core: &PlayerController,
    audio: &dyn AudioEngine,
    list_state: &mut ListState,
) {
    let colors = PALETTE;
    let layout = layouts(frame.area());
    let now = view::project(&core.state, &core.progress, audio, &core.settings);

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE_WITH_VERSION,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Tracks {}", core.state.tracks.len()),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            audio.output_name().unwrap_or_else(|| String::from("-")),
            Style::default().fg(colors.alert),
        ),
    ]))
    .block(panel_block("Status", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(header, layout.header);

    let items: Vec<ListItem> = view::track_rows(&core.state, &core.settings)
        .into_iter()
        .map(|row| {
            let (marker, title_style) = if row.active {
                (
                    "  > ",
                    Style::default()
                        .fg(colors.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("    ", Style::default().fg(colors.text))
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(colors.muted)),
                Span::styled(format!("{} ", row.icon.glyph()), Style::default().fg(colors.alert)),
                Span::styled(row.title, title_style),
                Span::styled(format!("  {}", row.artist), Style::default().fg(colors.muted)),
            ]))
        })
        .collect();

    let list_title = if core.state.tracks.is_empty() {
        String::from("Songs (none found)")
    } else {
        String::from("Songs")
    };
    let list = List::new(items)
        .block(panel_block(
            &list_title,
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, layout.list, list_state);

    frame.render_widget(now_playing_panel(&now, &colors), layout.info);
    draw_timeline(frame, layout.timeline, &now, &colors);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            "Keys: Space play/pause, Enter play, p toggle item, n/b next/prev, Left/Right seek, 0-9 jump, +/- volume, q quit",
            Style::default().fg(colors.muted),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(core.status.as_str(), Style::default().fg(colors.text)),
    ]))
    .block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(footer, layout.footer);
}

fn now_playing_panel<'a>(now: &'a NowPlaying, colors: &Palette) -> Paragraph<'a> {
    let state_label = match now.icon {
        PlayIcon::Pause => "Playing",
        PlayIcon::Play => "Paused",
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "Now",
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", now.title), Style::default().fg(colors.text)),
        ]),
        Line::from(Span::styled(
            format!("Artist  {}", now.artist),
            Style::default().fg(colors.muted),
        )),
        Line::from(Span::styled(
            format!("State   {} {state_label}", now.icon.glyph()),
            Style::default().fg(colors.alert),
        )),
        Line::from(Span::styled(
            format!(
                "Track   {}",
                now.active_index
                    .map(|index| (index + 1).to_string())
                    .unwrap_or_else(|| String::from("-"))
            ),
            Style::default().fg(colors.muted),
        )),
    ];
    Paragraph::new(lines)
        .block(panel_block(
            "Song Info",
            colors.panel_alt_bg,
            colors.text,
            colors.border,
        ))
        .wrap(Wrap { trim: true })
}

fn draw_timeline(frame: &mut Frame, area: Rect, now: &NowPlaying, colors: &Palette) {
    frame.render_widget(
        panel_block("Timeline", colors.panel_bg, colors.text, colors.border),
        area,
    );
    let [clock, seek_bar, volume_bar] = timeline_chunks(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("{} / {}", now.elapsed_text, now.total_text),
            Style::default().fg(colors.text),
        )),
        clock,
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(colors.accent).bg(colors.panel_alt_bg))
            .ratio((now.seek_percent / 100.0).clamp(0.0, 1.0))
            .label(""),
        seek_bar,
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(colors.alert).bg(colors.panel_alt_bg))
            .ratio((f64::from(now.volume_percent) / 100.0).clamp(0.0, 1.0))
            .label(format!("Vol {:>3}%", now.volume_percent)),
        volume_bar,
    );
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

/// Maps a column inside `bar` to a 0-100 slider value.
pub fn slider_value(bar: Rect, column: u16) -> Option<f64> {
    if bar.width == 0 || column < bar.x || column >= bar.x.saturating_add(bar.width) {
        return None;
    }
    let span = f64::from(bar.width.saturating_sub(1).max(1));
    Some((f64::from(column - bar.x) / span * 100.0).clamp(0.0, 100.0))
}
