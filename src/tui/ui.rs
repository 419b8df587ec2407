//! Stateless UI rendering for the turtle canvas and board.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Circle, Context, Line as Stroke},
    },
};

use super::app::App;
use crate::actuator::{CANVAS_SIZE, DrawnMark, Rgb, SimSnapshot};
use crate::games::tictactoe::{Board, Player, Position, Square};
use crate::layout::CellLayout;

/// Half-size of a drawn mark, matching the simulator's stroke.
const MARK_RADIUS: f64 = 1.0;

/// Renders the canvas, the board and the status lines.
pub fn draw(frame: &mut Frame, app: &App, snapshot: &SimSnapshot, layout: &CellLayout) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(12),   // Canvas + board
            Constraint::Length(3), // Status
            Constraint::Length(3), // Help
        ])
        .split(frame.area());

    let title = Paragraph::new("Strictly Turtle - Tic Tac Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    draw_canvas(frame, body[0], snapshot, layout);
    let cursor_cell = layout.map_to_cell(app.cursor());
    draw_board(frame, body[1], app.game().board(), cursor_cell);

    let status = Paragraph::new(app.status_message())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, chunks[2]);

    let help = Paragraph::new("W/A/S/D: Steer | M/Space: Mark | R: Restart | Q: Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);
}

fn draw_canvas(frame: &mut Frame, area: Rect, snapshot: &SimSnapshot, layout: &CellLayout) {
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("Turtle"))
        .marker(Marker::Braille)
        .x_bounds([0.0, CANVAS_SIZE])
        .y_bounds([0.0, CANVAS_SIZE])
        .paint(|ctx| {
            draw_grid(ctx, layout);
            for mark in &snapshot.marks {
                draw_mark(ctx, mark);
            }
            let glyph = if snapshot.pen.on { "●" } else { "▲" };
            ctx.print(
                snapshot.pose.x,
                snapshot.pose.y,
                Span::styled(glyph, Style::default().fg(Color::Green)),
            );
        });
    frame.render_widget(canvas, area);
}

/// Grid lines halfway between neighbouring cell centers.
fn draw_grid(ctx: &mut Context<'_>, layout: &CellLayout) {
    let xs = [Position::TopLeft, Position::TopCenter, Position::TopRight]
        .map(|pos| layout.center(pos).x);
    let ys = [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft]
        .map(|pos| layout.center(pos).y);

    let half_x = (xs[1] - xs[0]).abs() / 2.0;
    let half_y = (ys[0] - ys[1]).abs() / 2.0;
    let (left, right) = (xs[0] - half_x, xs[2] + half_x);
    let (top, bottom) = (ys[0] + half_y, ys[2] - half_y);

    for pair in xs.windows(2) {
        let x = (pair[0] + pair[1]) / 2.0;
        ctx.draw(&Stroke::new(x, bottom, x, top, Color::DarkGray));
    }
    for pair in ys.windows(2) {
        let y = (pair[0] + pair[1]) / 2.0;
        ctx.draw(&Stroke::new(left, y, right, y, Color::DarkGray));
    }
}

fn draw_mark(ctx: &mut Context<'_>, mark: &DrawnMark) {
    let color = ink(mark.color);
    let (x, y) = (mark.center.x, mark.center.y);
    match mark.player {
        Player::X => {
            ctx.draw(&Stroke::new(
                x - MARK_RADIUS,
                y - MARK_RADIUS,
                x + MARK_RADIUS,
                y + MARK_RADIUS,
                color,
            ));
            ctx.draw(&Stroke::new(
                x - MARK_RADIUS,
                y + MARK_RADIUS,
                x + MARK_RADIUS,
                y - MARK_RADIUS,
                color,
            ));
        }
        Player::O => ctx.draw(&Circle {
            x,
            y,
            radius: MARK_RADIUS,
            color,
        }),
    }
}

fn ink(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn draw_board(frame: &mut Frame, area: Rect, board: &Board, cursor: Option<Position>) {
    let block = Block::default().borders(Borders::ALL).title("Board");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let board_area = center_rect(inner, 17, 5);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(board_area);

    let row_positions = [
        [Position::TopLeft, Position::TopCenter, Position::TopRight],
        [Position::MiddleLeft, Position::Center, Position::MiddleRight],
        [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    ];
    for (i, positions) in row_positions.iter().enumerate() {
        frame.render_widget(board_row(board, cursor, positions), rows[i * 2]);
        if i < 2 {
            let sep = Paragraph::new("─────┼─────┼─────").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(sep, rows[i * 2 + 1]);
        }
    }
}

fn board_row<'a>(board: &Board, cursor: Option<Position>, positions: &[Position; 3]) -> Paragraph<'a> {
    let mut spans = Vec::with_capacity(5);
    for (i, &pos) in positions.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }
        spans.push(cell_span(board, cursor, pos));
    }
    Paragraph::new(Line::from(spans))
}

fn cell_span<'a>(board: &Board, cursor: Option<Position>, pos: Position) -> Span<'a> {
    let (symbol, base_style) = match board.get(pos) {
        Square::Empty => ("     ", Style::default().fg(Color::DarkGray)),
        Square::Occupied(Player::X) => (
            "  X  ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Square::Occupied(Player::O) => (
            "  O  ",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
    };

    let style = if Some(pos) == cursor {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };
    Span::styled(symbol, style)
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}
