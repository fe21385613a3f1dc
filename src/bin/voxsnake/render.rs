//! Draw the playfield, status line, and game-over banner.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use voxsnake::config::CaptureMode;
use voxsnake::game::{Cell, GameState};
use voxsnake::orchestrator::{LoopState, Orchestrator};

/// Terminal columns per grid cell; two columns keep cells roughly square.
const CELL_COLUMNS: u16 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tile {
    Empty,
    Food,
    Head,
    Body,
}

/// Everything besides the game that the status line shows.
pub(crate) struct StatusView<'a> {
    pub(crate) mode: CaptureMode,
    pub(crate) model_loaded: bool,
    pub(crate) notice: Option<&'a str>,
}

/// Row-major tiles for the whole grid. Later layers win: food, then body, then head.
pub(crate) fn tiles(game: &GameState) -> Vec<Vec<Tile>> {
    let grid = game.grid();
    let side = grid.num_cells.max(0) as usize;
    let mut rows = vec![vec![Tile::Empty; side]; side];
    let mut paint = |cell: Cell, tile: Tile| {
        if let Some((gx, gy)) = grid.index_of(cell) {
            rows[gy as usize][gx as usize] = tile;
        }
    };
    paint(game.food().cell(), Tile::Food);
    for (index, &segment) in game.snake().segments().enumerate() {
        paint(segment, if index == 0 { Tile::Head } else { Tile::Body });
    }
    rows
}

fn tile_span(tile: Tile) -> Span<'static> {
    match tile {
        Tile::Empty => Span::styled("  ", Style::default().bg(Color::Black)),
        Tile::Food => Span::styled("  ", Style::default().bg(Color::Red)),
        Tile::Head => Span::styled("  ", Style::default().bg(Color::LightGreen)),
        Tile::Body => Span::styled("  ", Style::default().bg(Color::Green)),
    }
}

fn status_line(orch: &Orchestrator, view: &StatusView<'_>) -> Line<'static> {
    let game = orch.game();
    let heard = match orch.last_heard() {
        Some(last) if last.capture_failed => format!("{} (mic error)", last.label.label()),
        Some(last) => format!(
            "{} {:.0} dB in {} ms",
            last.label.label(),
            last.level_db,
            last.capture_ms
        ),
        None => "listening…".to_string(),
    };
    let model = if view.model_loaded { "model ok" } else { "no model" };
    let mut spans = vec![
        Span::styled(
            format!(" Score {} ", game.score()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("│ heading {} ", game.direction().label())),
        Span::raw(format!("│ heard {heard} ")),
        Span::styled(
            format!("│ {} · {model} ", view.mode.label()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(notice) = view.notice {
        spans.push(Span::styled(
            format!("│ {notice}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

/// Centre a `width` × `height` box inside `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub(crate) fn draw(frame: &mut Frame<'_>, orch: &Orchestrator, view: &StatusView<'_>) {
    let game = orch.game();
    let side = game.grid().num_cells.max(0) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.size());

    frame.render_widget(Paragraph::new(status_line(orch, view)), chunks[0]);

    let field_area = Rect {
        x: chunks[1].x,
        y: chunks[1].y,
        width: (side * CELL_COLUMNS + 2).min(chunks[1].width),
        height: (side + 2).min(chunks[1].height),
    };
    let lines: Vec<Line> = tiles(game)
        .into_iter()
        .map(|row| Line::from(row.into_iter().map(tile_span).collect::<Vec<_>>()))
        .collect();
    let field = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" VoxSnake: say up, down, left, right · r dump · q quit "),
    );
    frame.render_widget(field, field_area);

    if orch.state() != LoopState::Running {
        let banner = centered(field_area, 24, 3);
        frame.render_widget(Clear, banner);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
            banner,
        );
    }
}
