//! Play command implementation - interactive TUI.

// Cursor math runs in i32 and is clamped to the grid before narrowing
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use super::output::describe_outcome;
use super::{CliError, ConfigArgs};
use claimgrid::game::{CellIndex, Coord, GameState, PlayerId, Snapshot};
use claimgrid::render::owner_glyph;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if the config is invalid or the terminal fails.
pub(crate) fn execute(config: &ConfigArgs) -> Result<(), CliError> {
    let game = GameState::new(config.resolve()?)?;
    run_tui(game)
}

/// App state for the TUI.
struct App {
    game: GameState,
    snapshot: Snapshot,
    cursor: Coord,
    status: String,
}

impl App {
    fn new(game: GameState) -> Self {
        let snapshot = game.snapshot();
        Self {
            game,
            snapshot,
            cursor: Coord::new(0, 0),
            status: "Claim any cell to start".to_string(),
        }
    }

    fn size(&self) -> u16 {
        self.game.board().topology().size()
    }

    fn cursor_cell(&self) -> Option<CellIndex> {
        self.game.board().topology().index(self.cursor)
    }

    fn move_cursor(&mut self, d_row: i32, d_col: i32) {
        let max = i32::from(self.size()) - 1;
        let row = (i32::from(self.cursor.row) + d_row).clamp(0, max);
        let col = (i32::from(self.cursor.col) + d_col).clamp(0, max);
        self.cursor = Coord::new(row as u16, col as u16);
    }

    fn click(&mut self) {
        if let Some(cell) = self.cursor_cell() {
            let outcome = self.game.click(cell);
            self.status = describe_outcome(&outcome);
            self.refresh();
        }
    }

    fn select_player(&mut self, player: PlayerId) {
        self.status = match self.game.select_player(player) {
            Ok(outcome) => describe_outcome(&outcome),
            Err(e) => e.to_string(),
        };
        self.refresh();
    }

    fn cycle_player(&mut self, forward: bool) {
        let n = self.game.config().num_players;
        let active = self.game.active_player();
        let next = if forward {
            if active + 1 >= n { 0 } else { active + 1 }
        } else if active == 0 {
            n - 1
        } else {
            active - 1
        };
        self.select_player(next);
    }

    fn clear_selection(&mut self) {
        if let Some(cell) = self.game.selected_cell() {
            let outcome = self.game.select_cell(cell);
            self.status = describe_outcome(&outcome);
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.snapshot = self.game.snapshot();
    }
}

fn run_tui(game: GameState) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App::new(game);

    loop {
        terminal.draw(|f| ui(f, &app)).map_err(|e| CliError::new(e.to_string()))?;

        if event::poll(Duration::from_millis(100)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0),
                KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0),
                KeyCode::Left | KeyCode::Char('h') => app.move_cursor(0, -1),
                KeyCode::Right | KeyCode::Char('l') => app.move_cursor(0, 1),
                KeyCode::Enter | KeyCode::Char(' ') => app.click(),
                KeyCode::Tab => app.cycle_player(true),
                KeyCode::BackTab => app.cycle_player(false),
                KeyCode::Esc => app.clear_selection(),
                KeyCode::Char(c @ '0'..='9') => {
                    if let Some(digit) = c.to_digit(10) {
                        app.select_player(digit as PlayerId);
                    }
                }
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Board and players
            Constraint::Length(4), // Status and controls
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let board_width = app.size() * 2 + 2;
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Min(30)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);
    render_players(f, main_chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let snapshot = &app.snapshot;
    let selected = snapshot
        .selected_cell
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    let title = format!(
        " Claimgrid | Active: P{} | Selected: {selected} | Treasury: {:.2} | Claimed: {}/{} ",
        snapshot.active_player,
        snapshot.treasury,
        snapshot.claimed_count(),
        snapshot.cells.len()
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let snapshot = &app.snapshot;
    let size = usize::from(app.size());
    let cursor = app.cursor_cell();

    let mut colors = vec![None; snapshot.cells.len()];
    for cluster in snapshot.players.iter().flat_map(|p| &p.clusters) {
        for &cell in &cluster.cells {
            if let Some(slot) = colors.get_mut(usize::from(cell)) {
                *slot = Some(Color::Rgb(cluster.color.r, cluster.color.g, cluster.color.b));
            }
        }
    }

    let lines: Vec<Line> = snapshot
        .cells
        .chunks(size)
        .enumerate()
        .map(|(row, cells)| {
            let spans: Vec<Span> = cells
                .iter()
                .enumerate()
                .map(|(col, owner)| {
                    let index = row * size + col;
                    let cell = CellIndex::try_from(index).ok();
                    let available =
                        cell.is_some_and(|c| snapshot.available.binary_search(&c).is_ok());

                    let (glyph, mut style) = match owner {
                        Some(owner) => (
                            owner_glyph(*owner),
                            Style::default()
                                .fg(colors[index].unwrap_or(Color::White))
                                .add_modifier(Modifier::BOLD),
                        ),
                        None if available => ('+', Style::default().fg(Color::Green)),
                        None => ('·', Style::default().fg(Color::DarkGray)),
                    };
                    if cell.is_some() && cell == snapshot.selected_cell {
                        style = style.bg(Color::DarkGray).add_modifier(Modifier::UNDERLINED);
                    }
                    if cell.is_some() && cell == cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Span::styled(format!("{glyph} "), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let board = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Board "));
    f.render_widget(board, area);
}

fn render_players(f: &mut Frame, area: Rect, app: &App) {
    let snapshot = &app.snapshot;
    let mut lines = Vec::new();

    for player in &snapshot.players {
        let active = player.id == snapshot.active_player;
        let marker = if active { "▶ " } else { "  " };
        let name_style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{marker}Player {}", player.id), name_style),
            Span::raw(format!(
                "  cells {}  clusters {}  weight {:.2}",
                player.cell_count(),
                player.clusters.len(),
                player.weight
            )),
        ]));
        lines.push(Line::from(format!(
            "    spent {:.2}  earned {:.2}  balance {:+.2}",
            player.spent, player.earned, player.balance
        )));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Players "))
        .wrap(Wrap { trim: false });

    f.render_widget(widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(Span::styled(app.status.clone(), Style::default().fg(Color::White))),
        Line::from(Span::styled(
            " [←↓↑→/hjkl] Move  [Enter/Space] Click  [Tab/S-Tab] Player  [0-9] Pick player  [Esc] Deselect  [q] Quit ",
            Style::default().fg(Color::Gray),
        )),
    ];

    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use claimgrid::GameConfig;
    use claimgrid::game::Outcome;

    fn app(grid_size: u16, num_players: u8) -> App {
        let game = GameState::new(GameConfig {
            grid_size,
            num_players,
            ..GameConfig::default()
        })
        .unwrap();
        App::new(game)
    }

    #[test]
    fn test_cursor_clamps_to_grid() {
        let mut app = app(4, 2);
        app.move_cursor(-1, -1);
        assert_eq!(app.cursor, Coord::new(0, 0));

        for _ in 0..10 {
            app.move_cursor(1, 1);
        }
        assert_eq!(app.cursor, Coord::new(3, 3));
        assert_eq!(app.cursor_cell(), Some(15));

        app.move_cursor(0, -2);
        assert_eq!(app.cursor, Coord::new(3, 1));
    }

    #[test]
    fn test_cycle_player_wraps() {
        let mut app = app(4, 3);
        app.cycle_player(false);
        assert_eq!(app.game.active_player(), 2);
        app.cycle_player(true);
        assert_eq!(app.game.active_player(), 0);
        app.cycle_player(true);
        assert_eq!(app.game.active_player(), 1);
        assert_eq!(app.snapshot.active_player, 1);
    }

    #[test]
    fn test_select_invalid_player_reports_error() {
        let mut app = app(4, 3);
        app.select_player(7);
        assert_eq!(app.game.active_player(), 0);
        assert!(app.status.contains('7'), "{}", app.status);
    }

    #[test]
    fn test_click_and_clear_selection() {
        let mut app = app(4, 2);
        app.move_cursor(1, 1);
        app.click();
        assert_eq!(app.snapshot.owner(5), Some(0));

        app.click();
        assert_eq!(app.game.selected_cell(), Some(5));
        assert_eq!(app.snapshot.selected_cell, Some(5));

        app.clear_selection();
        assert!(app.game.selected_cell().is_none());
        assert_eq!(app.status, describe_outcome(&Outcome::SelectionCleared { cell: 5 }));
    }
}
