mod bird;
mod engine;
mod error;
mod geom;
mod layout;
mod render;
mod score;
mod sound;
mod stage;
mod store;

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute, terminal,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use engine::{Engine, GameState};
use error::Result;
use render::{PixelBuf, View};
use sound::Audio;
use store::HighScoreStore;

/// Fixed simulation step.
const DT: f64 = 1.0 / 30.0;
/// Cap on catch-up steps after a stall.
const MAX_STEPS: u32 = 5;

/// Shoot the birds before the clock runs out.
#[derive(Parser, Debug)]
#[command(name = "hunts", version, about)]
struct Args {
    /// Stage to start at (1-4)
    #[arg(long, default_value_t = 1)]
    stage: usize,

    /// Seed for deterministic spawns
    #[arg(long)]
    seed: Option<u64>,

    /// Frames drawn per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=120))]
    fps: u32,

    /// Disable sound effects
    #[arg(long)]
    mute: bool,

    /// High score file (defaults to the platform data directory)
    #[arg(long)]
    save_file: Option<PathBuf>,

    /// Write logs to this file (the terminal is busy drawing the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "hunts=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

// ── Input ───────────────────────────────────────────────────────────────────

/// Keyboard-aimed crosshair, for terminals without mouse reporting.
struct Aim {
    x: f64,
    y: f64,
}

impl Aim {
    fn nudge(&mut self, dx: f64, dy: f64, width: usize, height: usize) {
        self.x = (self.x + dx).clamp(0.0, width.saturating_sub(1) as f64);
        self.y = (self.y + dy).clamp(0.0, height.saturating_sub(1) as f64);
    }
}

/// Canvas point at the middle of a terminal cell.
fn cell_to_canvas(column: u16, row: u16) -> (f64, f64) {
    (column as f64 + 0.5, row as f64 * 2.0 + 1.0)
}

enum Flow {
    Continue,
    Quit,
}

fn handle_event(
    ev: Event,
    game: &mut Engine<StdRng>,
    aim: &mut Aim,
    buf: &mut PixelBuf,
    size: &mut (usize, usize),
) -> Flow {
    let step = (3.0 * game.scale()).round().max(1.0);
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('p') => game.toggle_pause(),
            KeyCode::Char('r') if game.result_visible() => game.restart(),
            KeyCode::Char('n') if game.result_visible() => game.advance(),
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('f') => game.tap(aim.x, aim.y),
            KeyCode::Left | KeyCode::Char('a') => aim.nudge(-step, 0.0, size.0, size.1),
            KeyCode::Right | KeyCode::Char('d') => aim.nudge(step, 0.0, size.0, size.1),
            KeyCode::Up | KeyCode::Char('w') => aim.nudge(0.0, -step, size.0, size.1),
            KeyCode::Down | KeyCode::Char('s') => aim.nudge(0.0, step, size.0, size.1),
            _ => {}
        },
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (x, y) = cell_to_canvas(mouse.column, mouse.row);
                (aim.x, aim.y) = (x, y);
                game.tap(x, y);
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                (aim.x, aim.y) = cell_to_canvas(mouse.column, mouse.row);
            }
            _ => {}
        },
        Event::Resize(c, r) => {
            *size = (c as usize, r as usize * 2);
            buf.resize(size.0, size.1);
            game.resize(size.0, size.1);
            aim.nudge(0.0, 0.0, size.0, size.1);
        }
        _ => {}
    }
    Flow::Continue
}

/// Fixed-step accumulator for the simulation.
#[derive(Default)]
struct Clock {
    acc: f64,
}

impl Clock {
    /// Number of `DT` steps owed after `elapsed` seconds. At most
    /// `MAX_STEPS`; whatever is left after a stall is dropped.
    fn steps(&mut self, elapsed: f64) -> u32 {
        self.acc += elapsed;
        let mut steps = 0;
        while self.acc >= DT && steps < MAX_STEPS {
            self.acc -= DT;
            steps += 1;
        }
        if self.acc >= DT {
            self.acc = 0.0;
        }
        steps
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

fn run(out: &mut io::Stdout, args: &Args, store: &HighScoreStore, audio: Option<&Audio>) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut size = (cols as usize, rows as usize * 2);

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut buf = PixelBuf::new(size.0, size.1);
    let mut game = Engine::new(size.0, size.1, args.stage, store.load(), rng);
    let mut aim = Aim {
        x: size.0 as f64 / 2.0,
        y: size.1 as f64 / 2.0,
    };

    let frame_dur = Duration::from_secs_f64(1.0 / args.fps as f64);
    let mut frame: u64 = 0;
    let mut last = Instant::now();
    let mut clock = Clock::default();

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            if let Flow::Quit = handle_event(event::read()?, &mut game, &mut aim, &mut buf, &mut size) {
                return Ok(());
            }
        }

        // Update, in fixed steps
        let steps = clock.steps(last.elapsed().as_secs_f64());
        last = Instant::now();
        for _ in 0..steps {
            game.update(DT);
        }

        for ev in game.drain_events() {
            if let Some(audio) = audio {
                audio.play_event(&ev);
            }
        }
        if game.take_high_score_dirty() {
            if let Err(e) = store.save(game.high_score()) {
                warn!(error = %e, "could not save high score");
            }
        }

        // Render
        let view = View {
            aim: (game.state() == GameState::Running).then_some((aim.x, aim.y)),
            frame,
        };
        render::draw(&game, &view, &mut buf);
        buf.render(out)?;
        frame += 1;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    if !(1..=stage::total_stages()).contains(&args.stage) {
        warn!(stage = args.stage, "no such stage, starting at stage 1");
    }

    let store = HighScoreStore::new(args.save_file.clone())?;
    info!(path = %store.path().display(), "high score file");
    let audio = Audio::open(args.mute);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )?;

    let result = run(&mut out, &args, &store, audio.as_ref());

    execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    result
}
