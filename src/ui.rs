//! Layout and drawing: board, cursor, sidebar with score and help.

use crate::board::{Board, PowerKind, TileKind};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Each board cell is drawn two terminal cells wide so the grid looks square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;

/// Glyph for a gem, by power.
fn gem_glyph(power: PowerKind) -> &'static str {
    match power {
        PowerKind::None => "◆ ",
        PowerKind::RowClear => "━━",
        PowerKind::ColumnClear => "┃ ",
        PowerKind::AreaClear => "◉ ",
        PowerKind::ColorClear => "✹ ",
    }
}

/// Board + border in terminal cells.
fn board_pixel_size(board: &Board) -> (u16, u16) {
    (
        board.width as u16 * CELL_WIDTH + 2,
        board.height as u16 + 2,
    )
}

pub fn draw(
    f: &mut Frame,
    theme: &Theme,
    board: &Board,
    cursor: (usize, usize),
    score: u32,
    seed: Option<u64>,
    message: &str,
) {
    let area = f.area();
    let (bw, bh) = board_pixel_size(board);
    let total_w = bw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(bh) / 2;
    let board_area = Rect {
        x,
        y,
        width: bw.min(area.width),
        height: bh.min(area.height),
    };
    let sidebar_area = Rect {
        x: (board_area.x + board_area.width).min(area.x + area.width),
        y,
        width: SIDEBAR_WIDTH.min(area.width.saturating_sub(board_area.width)),
        height: bh.min(area.height),
    };

    draw_board(f, theme, board, cursor, board_area);
    draw_sidebar(f, theme, score, seed, message, sidebar_area);
}

fn draw_board(f: &mut Frame, theme: &Theme, board: &Board, cursor: (usize, usize), area: Rect) {
    let mut lines = Vec::with_capacity(board.height);
    for cy in 0..board.height {
        let mut spans = Vec::with_capacity(board.width);
        for cx in 0..board.width {
            let mut style = match board.tile_kind(cx, cy) {
                // Holes read as missing board, not empty cells.
                TileKind::Blank => Style::default(),
                TileKind::Breakable { .. } => Style::default().bg(theme.inactive_fg),
                TileKind::Default => Style::default().bg(theme.bg),
            };
            let glyph = match board.get(cx, cy) {
                Some(piece) => {
                    style = style.fg(theme.gem_color(piece.color));
                    gem_glyph(piece.power)
                }
                None => "  ",
            };
            if (cx, cy) == cursor {
                style = style.bg(theme.title).add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(glyph, style));
        }
        lines.push(Line::from(spans));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .title(Span::styled("gemswap", Style::default().fg(theme.title)));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_sidebar(
    f: &mut Frame,
    theme: &Theme,
    score: u32,
    seed: Option<u64>,
    message: &str,
    area: Rect,
) {
    let fg = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);
    let seed_line = match seed {
        Some(s) => format!("seed  {s}"),
        None => String::from("seed  random"),
    };
    let lines = vec![
        Line::from(Span::styled(
            format!("score {score}"),
            Style::default().fg(theme.title),
        )),
        Line::from(Span::styled(seed_line, fg)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), fg)),
        Line::from(""),
        Line::from(Span::styled("arrows/hjkl  move", dim)),
        Line::from(Span::styled("shift+arrows swap", dim)),
        Line::from(Span::styled("n new game   q quit", dim)),
        Line::from(""),
        Line::from(Span::styled("━ row  ┃ column", dim)),
        Line::from(Span::styled("◉ area ✹ colour", dim)),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
