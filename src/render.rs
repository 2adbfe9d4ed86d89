//! ASCII renderer for terminal viewing with ANSI truecolor.

use crate::game::{CellIndex, Color, Coord, PlayerId, Snapshot};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const REVERSE: &str = "\x1b[7m";
const GRAY: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";

/// Render a snapshot as text.
///
/// With `ansi` set, owned cells are drawn in their cluster color and the
/// selected cell is shown in reverse video.
///
/// Output format:
/// ```text
/// Treasury: 5.50   Active: P0   Selected: -
/// ┌───────────┐
/// │ . . + . . │
/// │ . + 0 0 + │
/// │ . . + + . │
/// └───────────┘
///
/// Legend: .=Unavailable  +=Available  0-9a-z=Owner  x=Selected (plain text)
///
/// P0  cells: 2    clusters: 1   weight: 2.40     spent: 10.00    earned: 4.50     balance: -5.50
/// ```
#[must_use]
pub fn render_ascii(snapshot: &Snapshot, ansi: bool) -> String {
    let mut output = String::new();

    render_header(&mut output, snapshot);
    render_board(&mut output, snapshot, ansi);

    output.push_str("\nLegend: .=Unavailable  +=Available  0-9a-z=Owner  x=Selected (plain text)\n\n");

    render_player_stats(&mut output, snapshot);
    output
}

/// Render the header line with treasury, active player and selection.
fn render_header(output: &mut String, snapshot: &Snapshot) {
    let selected = snapshot.selected_cell.map_or_else(
        || "-".to_string(),
        |cell| {
            let Coord { row, col } = snapshot.topology.coord(cell);
            format!("{cell} (r{row}, c{col})")
        },
    );
    output.push_str(&format!(
        "Treasury: {:.2}   Active: P{}   Selected: {selected}\n",
        snapshot.treasury, snapshot.active_player
    ));
}

/// Render the board grid.
fn render_board(output: &mut String, snapshot: &Snapshot, ansi: bool) {
    let size = usize::from(snapshot.topology.size());
    let colors = cell_colors(snapshot);
    let horizontal = "─".repeat(size * 2 + 1);

    output.push_str(&format!("┌{horizontal}┐\n"));
    for (row, cells) in snapshot.cells.chunks(size).enumerate() {
        output.push_str("│ ");
        for (col, owner) in cells.iter().enumerate() {
            let index = row * size + col;
            render_cell(output, snapshot, index, *owner, colors[index], ansi);
            output.push(' ');
        }
        output.push_str("│\n");
    }
    output.push_str(&format!("└{horizontal}┘\n"));
}

/// Render a single cell.
fn render_cell(
    output: &mut String,
    snapshot: &Snapshot,
    index: usize,
    owner: Option<PlayerId>,
    color: Option<Color>,
    ansi: bool,
) {
    let cell = CellIndex::try_from(index).ok();
    let selected = cell.is_some() && snapshot.selected_cell == cell;
    let available = cell.is_some_and(|c| snapshot.available.binary_search(&c).is_ok());

    let glyph = match owner {
        Some(owner) => owner_glyph(owner),
        None if available => '+',
        None => '.',
    };

    if !ansi {
        output.push(if selected { 'x' } else { glyph });
        return;
    }

    let style = match (owner, color) {
        (Some(_), Some(c)) => format!("{BOLD}{}", truecolor(c)),
        (Some(_), None) => BOLD.to_string(),
        (None, _) if available => GREEN.to_string(),
        (None, _) => GRAY.to_string(),
    };
    let highlight = if selected { REVERSE } else { "" };
    output.push_str(&format!("{style}{highlight}{glyph}{RESET}"));
}

/// Cluster color of every cell, in cell order.
fn cell_colors(snapshot: &Snapshot) -> Vec<Option<Color>> {
    let mut colors = vec![None; snapshot.cells.len()];
    for cluster in snapshot.players.iter().flat_map(|p| &p.clusters) {
        for &cell in &cluster.cells {
            if let Some(slot) = colors.get_mut(usize::from(cell)) {
                *slot = Some(cluster.color);
            }
        }
    }
    colors
}

/// ANSI 24-bit foreground escape for a color.
fn truecolor(color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

/// Single-character label for a player: 0-9 then a-z, `#` beyond that.
#[must_use]
pub fn owner_glyph(owner: PlayerId) -> char {
    char::from_digit(u32::from(owner), 36).unwrap_or('#')
}

/// Render player statistics.
fn render_player_stats(output: &mut String, snapshot: &Snapshot) {
    for player in &snapshot.players {
        let marker = if player.id == snapshot.active_player { '>' } else { ' ' };
        output.push_str(&format!(
            "{marker}P{:<3} cells: {:<4} clusters: {:<3} weight: {:<8.2} spent: {:<8.2} earned: {:<8.2} balance: {:.2}\n",
            player.id,
            player.cell_count(),
            player.clusters.len(),
            player.weight,
            player.spent,
            player.earned,
            player.balance,
        ));
    }
}
