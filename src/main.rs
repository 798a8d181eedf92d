use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use emberfall::config::{parse_intensity, DEFAULT_CONFIG_PATH};
use emberfall::control::{Command, Controller, DEFAULT_SOCKET_PATH};
use emberfall::display::{Display, InputEvent, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use emberfall::util::FpsCounter;
use emberfall::{AnimationSettings, FlameAnimation, FlameError, PixelBuffer, QueuedHost};
use sdl2::keyboard::Keycode;
use tracing_subscriber::EnvFilter;

/// Intensity change per Up/Down key press or more/less command
const INTENSITY_STEP: f32 = 5.0;
const DEFAULT_INTENSITY: f32 = 50.0;
/// How often the FPS figure is logged
const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

struct Options {
    width: u32,
    height: u32,
    vsync: bool,
    config: PathBuf,
    intensity: f32,
    socket: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        config: PathBuf::from(DEFAULT_CONFIG_PATH),
        intensity: DEFAULT_INTENSITY,
        socket: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => opts.vsync = false,
            "--socket" => opts.socket = true,
            "--width" | "-w" => {
                if let Some(w) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    opts.width = w;
                }
                i += 1;
            },
            "--height" | "-h" => {
                if let Some(h) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    opts.height = h;
                }
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH, e.g. 1920x1080
                if let Some((w, h)) = args.get(i + 1).and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        opts.width = w;
                        opts.height = h;
                    }
                }
                i += 1;
            },
            "--config" | "-c" => {
                if let Some(path) = args.get(i + 1) {
                    opts.config = PathBuf::from(path);
                }
                i += 1;
            },
            "--intensity" | "-i" => {
                if let Some(v) = args.get(i + 1).and_then(|v| parse_intensity(v)) {
                    opts.intensity = v;
                }
                i += 1;
            },
            "--help" => {
                println!("Usage: emberfall [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --width W, -w W           Window width (default: {})", DEFAULT_WIDTH);
                println!("  --height H, -h H          Window height (default: {})", DEFAULT_HEIGHT);
                println!("  --resolution WxH, -r WxH  Window size (e.g., 1920x1080)");
                println!("  --config PATH, -c PATH    Settings file (default: {})", DEFAULT_CONFIG_PATH);
                println!("  --intensity N, -i N       Initial intensity (default: {})", DEFAULT_INTENSITY);
                println!("  --socket                  Accept commands on {}", DEFAULT_SOCKET_PATH);
                println!("  --no-vsync                Disable VSync for uncapped framerate");
                println!("  --help                    Show this help message");
                println!();
                println!("Keys: Space start/stop, C color mode, Up/Down intensity, Esc quit");
                std::process::exit(0);
            },
            other => tracing::warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    opts
}

/// Apply one control action; returns false when the app should quit
fn apply(
    anim: &mut FlameAnimation<PixelBuffer, QueuedHost>,
    intensity: &mut f32,
    command: Command,
) -> bool {
    match command {
        Command::Start => anim.start(),
        Command::Stop => anim.stop(),
        Command::ToggleColor => anim.toggle_color_mode(),
        Command::Intensity(v) => {
            *intensity = v;
            anim.create_particles(*intensity);
        },
        Command::More => {
            *intensity += INTENSITY_STEP;
            anim.create_particles(*intensity);
        },
        Command::Less => {
            *intensity = (*intensity - INTENSITY_STEP).max(0.0);
            anim.create_particles(*intensity);
        },
        Command::Quit => return false,
    }
    true
}

fn key_command(key: Keycode, running: bool) -> Option<Command> {
    match key {
        Keycode::Escape => Some(Command::Quit),
        Keycode::Space if running => Some(Command::Stop),
        Keycode::Space => Some(Command::Start),
        Keycode::C => Some(Command::ToggleColor),
        Keycode::Up | Keycode::Equals | Keycode::KpPlus => Some(Command::More),
        Keycode::Down | Keycode::Minus | Keycode::KpMinus => Some(Command::Less),
        _ => None,
    }
}

fn main() -> Result<(), FlameError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = parse_args();
    let settings = AnimationSettings::load_or_default(&opts.config);

    let (mut display, texture_creator) =
        Display::with_options("emberfall", opts.width, opts.height, opts.vsync)?;
    let (width, height) = display.size();
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;

    let host = QueuedHost::new(width, height);
    let mut anim = FlameAnimation::new(PixelBuffer::with_size(width, height), host, settings)?;

    let remote = if opts.socket {
        Some(Controller::new()?)
    } else {
        None
    };

    let mut intensity = opts.intensity;
    anim.create_particles(intensity);
    anim.start();

    tracing::info!(
        width,
        height,
        vsync = opts.vsync,
        particles = anim.particle_count(),
        "emberfall running (Space start/stop, C color, Up/Down intensity, Esc quit)"
    );

    let mut fps = FpsCounter::new(60);
    let mut last_fps_log = Instant::now();

    'main: loop {
        let mut commands = Vec::new();
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => {
                    if let Some(cmd) = key_command(key, anim.is_running()) {
                        commands.push(cmd);
                    }
                },
                InputEvent::Resized { width, height } => {
                    if anim.host_mut().resize(width, height) {
                        anim.on_resize();
                    }
                    target = RenderTarget::with_size(&texture_creator, width, height)?;
                    tracing::info!(width, height, "window resized");
                },
            }
        }
        if let Some(remote) = &remote {
            commands.extend(remote.poll());
        }
        for cmd in commands {
            if !apply(&mut anim, &mut intensity, cmd) {
                break 'main;
            }
        }

        // One display refresh: deliver whatever frame is due
        for frame in anim.host_mut().take_due_frames() {
            anim.on_frame(frame);
        }

        display.present(&mut target, anim.surface())?;

        if !opts.vsync && !anim.is_running() {
            // Nothing animating and nothing pacing us
            thread::sleep(Duration::from_millis(16));
        }

        let avg_fps = fps.tick();
        if last_fps_log.elapsed() >= FPS_LOG_INTERVAL {
            last_fps_log = Instant::now();
            tracing::debug!(
                fps = avg_fps as u32,
                particles = anim.particle_count(),
                alive = anim.alive_count(),
                "frame stats"
            );
        }
    }

    anim.dispose();
    tracing::info!("bye");
    Ok(())
}
