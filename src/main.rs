mod app;
mod track;
mod ui;

use anyhow::{Context, Result};
use app::App;
use track::Fix;
use blockmap::config::Config;
use blockmap::data;
use blockmap::map::{BlockSource, DirSource};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Interval between replayed track fixes
const TRACK_STEP: Duration = Duration::from_millis(500);

/// Terminal viewer for tiled vector block maps
#[derive(Parser, Debug)]
#[command(name = "blockmap", version)]
struct Args {
    /// JSON config file; missing means defaults
    #[arg(long, default_value = "blockmap.json")]
    config: PathBuf,

    /// Root of the block folder tree (overrides the config)
    #[arg(long)]
    map_dir: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Meters per pixel
    #[arg(long)]
    zoom: Option<u8>,

    /// Use the built-in demo map even if a map directory exists
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Replay `lat,lon[,heading]` fixes from this file, one per tick
    #[arg(long)]
    track: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(dir) = args.map_dir {
        config.map_dir = dir;
    }
    if let Some(lat) = args.lat {
        config.default_lat = lat.clamp(-85.0, 85.0);
    }
    if let Some(lon) = args.lon {
        config.default_lon = lon;
    }
    if let Some(zoom) = args.zoom {
        config.default_zoom = zoom;
    }

    init_logging(&config)?;

    let fixes = match &args.track {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read track {}", path.display()))?;
            let fixes = track::parse_track(&text);
            log::info!("replaying {} fixes from {}", fixes.len(), path.display());
            fixes
        }
        None => Default::default(),
    };

    let (source, label): (Box<dyn BlockSource>, String) =
        if args.demo || !config.map_dir.is_dir() {
            if !args.demo {
                log::warn!(
                    "map directory {} not found, using the demo map",
                    config.map_dir.display()
                );
            }
            (Box::new(data::demo_map()), "Demo map".to_string())
        } else {
            log::info!("serving blocks from {}", config.map_dir.display());
            (
                Box::new(DirSource::new(&config.map_dir, config.extension.clone())),
                config.map_dir.display().to_string(),
            )
        };

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &config, source, label, fixes);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file so records never land on the terminal UI
fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("cannot create log file {}", config.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Handle mouse events for panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    config: &Config,
    source: Box<dyn BlockSource>,
    label: String,
    fixes: VecDeque<Fix>,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config, source, label, size.width, size.height);
    app.load_track(fixes);
    let mut last_fix = Instant::now();

    loop {
        app.redraw();
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -8),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 8),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Heading
                            KeyCode::Char('[') => app.rotate_left(),
                            KeyCode::Char(']') => app.rotate_right(),

                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.track_remaining() > 0 && last_fix.elapsed() >= TRACK_STEP {
            app.tick();
            last_fix = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
