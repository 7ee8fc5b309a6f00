use crate::app::App;
use blockmap::braille::BrailleCanvas;
use blockmap::Rgb565;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn to_color(c: Rgb565) -> Color {
    let (r, g, b) = c.to_rgb888();
    Color::Rgb(r, g, b)
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.source_label),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let map_widget = MapWidget {
        canvas: BrailleCanvas::from_framebuffer(&app.framebuffer, Rgb565::BACKGROUND),
        background: to_color(Rgb565::BACKGROUND),
    };
    frame.render_widget(map_widget, inner);
}

/// Braille rendering of the map framebuffer, one color per cell
struct MapWidget {
    canvas: BrailleCanvas,
    background: Color,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in self.canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                let x = area.x + col_idx as u16;
                let cell = &mut buf[(x, y)];
                cell.set_bg(self.background);
                // Empty braille characters (U+2800) only show the paper
                if ch == '\u{2800}' {
                    cell.set_char(' ');
                    continue;
                }
                let fg = self.canvas.color(col_idx, row_idx).map(to_color).unwrap_or(Color::Reset);
                cell.set_char(ch).set_fg(fg);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let vis = &app.visibility;
    let failed = vis.failed.len();

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | Hdg ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.heading_label(), Style::default().fg(Color::Magenta)),
        Span::styled(
            format!(
                " | blocks {}/{} cached {} ",
                vis.loaded(),
                vis.resolved.len(),
                app.view.cache().len()
            ),
            Style::default().fg(if failed > 0 { Color::Red } else { Color::Green }),
        ),
        Span::styled(
            format!("| {}P {}L ", app.stats.polygons, app.stats.polylines),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "| hjkl:pan +/-:zoom []:heading r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
