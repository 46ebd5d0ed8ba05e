//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::state::App;
use super::types::Screen;
use crate::detail::{DetailRow, play_label};
use crate::directory::DirectoryRow;
use crate::genre::genre_name;
use crate::playback::PlaybackState;
use chrono::{DateTime, Utc};

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Seconds as `m:ss`, or `h:mm:ss` past the hour.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Player
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);

    if let Some(error) = &app.load_error {
        draw_load_error(frame, error, chunks[1]);
    } else {
        match app.screen {
            Screen::Loading => draw_loading(frame, app, chunks[1]),
            Screen::Directory => draw_directory(frame, app, chunks[1]),
            Screen::Detail => draw_detail(frame, app, chunks[1]),
            Screen::Favorites => draw_favorites(frame, app, chunks[1]),
        }
    }

    draw_player(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);

    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }

    if app.show_help {
        draw_help_modal(frame, app);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "podcast-browser",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(app.route.to_string(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(status) = &app.status_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let loading = Paragraph::new(app.loading_message.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"));

    frame.render_widget(loading, area);
}

fn draw_load_error(frame: &mut Frame, error: &str, area: Rect) {
    let text = format!("{}\n\nPress R to retry.", error);
    let widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: true });

    frame.render_widget(widget, area);
}

fn draw_directory(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = &app.directory else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search + filters
            Constraint::Length(3), // Featured
            Constraint::Min(0),    // List
        ])
        .split(area);

    let border_style = if app.search_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let query = if view.query.is_empty() && !app.search_focused {
        "Press '/' to search...".to_string()
    } else {
        view.query.clone()
    };
    let genre = view.genre.map(genre_name).unwrap_or("All genres");
    let search = Paragraph::new(query).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Search  [{}]  [{}]", view.sort, genre))
            .border_style(border_style),
    );
    frame.render_widget(search, chunks[0]);

    let featured = Paragraph::new(app.featured.join("  |  "))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Featured"));
    frame.render_widget(featured, chunks[1]);

    let items: Vec<ListItem> = if app.grouped {
        view.grouped_rows()
            .into_iter()
            .map(|row| match row {
                DirectoryRow::Header(group) => {
                    let toggle = if group.expanded {
                        " (show less)".to_string()
                    } else if group.hidden() > 0 {
                        format!(" (+{} more)", group.hidden())
                    } else {
                        String::new()
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            group.name,
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(toggle, Style::default().fg(Color::DarkGray)),
                    ]))
                }
                DirectoryRow::Podcast(p) => ListItem::new(format!("  {}", p.title)),
            })
            .collect()
    } else {
        view.visible()
            .into_iter()
            .map(|p| {
                ListItem::new(Line::from(vec![
                    Span::raw(p.to_display()),
                    Span::styled(
                        format!("  updated {}", format_date(p.updated)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect()
    };

    let title = format!("Podcasts ({})", view.visible().len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(highlight())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[2], &mut app.directory_state);
}

fn draw_detail(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = &app.detail else {
        return;
    };
    let show = view.show();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let (description, truncated) = view.description();
    let mut lines = vec![
        Line::from(Span::styled(
            show.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} seasons  |  last updated {}",
                show.seasons.len(),
                format_date(show.updated)
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(description),
    ];
    if truncated {
        lines.push(Line::from(Span::styled(
            "[d] show more",
            Style::default().fg(Color::DarkGray),
        )));
    } else if view.description_is_long() {
        lines.push(Line::from(Span::styled(
            "[d] show less",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if app.detail_has_history {
        lines.push(Line::from(Span::styled(
            "[r] reset listened history",
            Style::default().fg(Color::Yellow),
        )));
    }

    let about = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("About"))
        .wrap(Wrap { trim: true });
    frame.render_widget(about, chunks[0]);

    let items: Vec<ListItem> = app
        .detail_rows
        .iter()
        .map(|row| match row {
            DetailRow::Season {
                title,
                episode_count,
                expanded,
                ..
            } => {
                let marker = if *expanded { "v" } else { ">" };
                ListItem::new(format!("{} {} ({} episodes)", marker, title, episode_count))
            }
            DetailRow::Episode {
                season_index,
                episode_index,
                title,
                favorite,
                listened,
            } => {
                let playing = app.player.episode.as_ref().is_some_and(|e| {
                    e.is_same(&show.id, *season_index, *episode_index)
                });
                let star = if *favorite { "*" } else { " " };
                let style = if playing {
                    Style::default().fg(Color::Green)
                } else if *listened {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("    {} {}", star, title), style),
                    Span::styled(
                        format!("  [{}]", play_label(*listened)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Seasons"))
        .highlight_style(highlight())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[1], &mut app.detail_state);
}

fn draw_favorites(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = &app.favorites else {
        return;
    };

    let mut constraints = vec![Constraint::Min(0)];
    if !view.errors.is_empty() {
        constraints.push(Constraint::Length(view.errors.len().min(5) as u16 + 2));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let visible = view.visible();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        item.podcast_title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(item.episode_title.clone()),
                ]),
                Line::from(Span::styled(
                    format!(
                        "  {}  |  added {}  |  updated {}",
                        item.position_label(),
                        format_date(item.added_at),
                        format_date(item.updated)
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let mut title = format!("Favorites ({})  [{}]", visible.len(), view.sort);
    if view.removing_count() > 0 {
        title.push_str(&format!("  removing {}...", view.removing_count()));
    }
    let empty = visible.is_empty();
    let errors = view.errors.join("\n");

    if empty {
        let widget = Paragraph::new("No favorites yet. Press f on an episode to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(widget, chunks[0]);
    } else {
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(highlight())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, chunks[0], &mut app.favorites_state);
    }

    if chunks.len() > 1 {
        let widget = Paragraph::new(errors)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Could not load"))
            .wrap(Wrap { trim: true });
        frame.render_widget(widget, chunks[1]);
    }
}

fn draw_player(frame: &mut Frame, app: &App, area: Rect) {
    let player = &app.player;
    let line = match &player.episode {
        Some(episode) => {
            let state = match player.state {
                PlaybackState::Playing => "Playing",
                PlaybackState::Paused => "Paused",
                PlaybackState::Loading => "Loading",
                PlaybackState::Idle => "Stopped",
            };
            Line::from(vec![
                Span::styled(format!("{} ", state), Style::default().fg(Color::Green)),
                Span::styled(
                    episode.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" - {}", episode.podcast_title)),
                Span::styled(
                    format!("  {}  {}x", format_time(player.position), player.rate),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        None => Line::from(Span::styled(
            format!("Nothing playing  {}x", player.rate),
            Style::default().fg(Color::DarkGray),
        )),
    };

    let widget = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Player"));
    frame.render_widget(widget, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.search_focused {
        "[type] search  [Enter] done  [Esc] clear"
    } else {
        match app.screen {
            Screen::Directory => {
                "[/] search  [s] sort  [g] genre  [v] group  [Enter] open  [F] favorites  [?] help  [q] quit"
            }
            Screen::Detail => {
                "[Enter] expand/play  [f] favorite  [d] description  [Esc] back  [?] help  [q] quit"
            }
            Screen::Favorites => "[Enter] go to podcast  [d] remove  [s] sort  [Esc] back  [?] help  [q] quit",
            Screen::Loading => "[?] help  [q] quit",
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let help_text = Paragraph::new(help_content(app.screen))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help - {}", app.screen.title()))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn help_content(screen: Screen) -> String {
    let screen_help = match screen {
        Screen::Directory => {
            "Directory
  ↑/k ↓/j   Navigate
  Enter     Open podcast / expand genre
  /         Search titles and descriptions
  s         Cycle sort order
  g         Cycle genre filter
  v         Toggle genre groups
  Esc       Clear search and filter"
        }
        Screen::Detail => {
            "Podcast
  ↑/k ↓/j   Navigate
  Enter     Expand season / play episode
  f         Toggle favorite
  d         Expand or collapse description
  r         Reset listened history
  Esc       Back to directory"
        }
        Screen::Favorites => {
            "Favorites
  ↑/k ↓/j   Navigate
  Enter     Go to podcast
  d/Del     Remove favorite
  s         Cycle sort order
  Esc       Back to directory"
        }
        Screen::Loading => "Waiting for the catalog...",
    };

    format!(
        "{}

Global Commands
  Space     Pause / resume
  x         Stop playback
  >         Next playback rate
  h         Directory
  F         Favorites
  R         Reload
  ?         Toggle help
  q         Quit",
        screen_help
    )
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(37.5), "0:37");
        assert_eq!(format_time(3725.0), "1:02:05");
        assert_eq!(format_time(-4.0), "0:00");
    }

    #[test]
    fn test_help_mentions_global_commands() {
        assert!(help_content(Screen::Detail).contains("Reset listened history"));
        assert!(help_content(Screen::Favorites).contains("Global Commands"));
    }
}
