//! Remote control via Unix socket
//!
//! Accepts line-oriented commands over a Unix socket so another process
//! can drive the animation the same way the keyboard does:
//!
//! ```text
//! echo "intensity 80" | socat - UNIX-CONNECT:/tmp/emberfall.sock
//! ```

use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::parse_intensity;
use crate::error::{FlameError, Result};

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/emberfall.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    ToggleColor,
    /// Set an absolute intensity
    Intensity(f32),
    /// Nudge intensity up one step
    More,
    /// Nudge intensity down one step
    Less,
    Quit,
}

/// Parse one protocol line; unknown input yields `None`
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "start" | "play" => Some(Command::Start),
        "stop" | "pause" => Some(Command::Stop),
        "toggle" | "color" | "c" => Some(Command::ToggleColor),
        "more" | "+" | "up" => Some(Command::More),
        "less" | "-" | "down" => Some(Command::Less),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => {
            // "intensity N" or just a number
            let value = line.strip_prefix("intensity ").unwrap_or(&line).trim();
            parse_intensity(value).map(Command::Intensity)
        },
    }
}

/// Listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    path: PathBuf,
    shutdown: Arc<AtomicBool>,
    listener_thread: Option<thread::JoinHandle<()>>,
}

impl Controller {
    /// Listen on the default socket path
    pub fn new() -> Result<Self> {
        Self::bind(DEFAULT_SOCKET_PATH)
    }

    /// Listen on `path`, replacing any stale socket file
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)
            .map_err(|e| FlameError::Control(format!("failed to bind {}: {}", path.display(), e)))?;

        // Non-blocking so the accept loop can notice a closed socket
        listener
            .set_nonblocking(true)
            .map_err(|e| FlameError::Control(format!("failed to set non-blocking: {}", e)))?;

        let (sender, receiver) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || {
            Self::listener_loop(listener, sender, &flag);
        });

        tracing::info!(path = %path.display(), "remote control listening");

        Ok(Self {
            receiver,
            path,
            shutdown,
            listener_thread: Some(handle),
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<Command>, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, sender);
                    });
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                },
                Err(e) => {
                    tracing::warn!(error = %e, "remote control listener stopped");
                    break;
                },
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: Sender<Command>) {
        // Accepted streams inherit non-blocking mode on some platforms
        let _ = stream.set_nonblocking(false);
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(std::result::Result::ok) {
            match parse_command(&line) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                },
                None => tracing::debug!(line = %line.trim(), "ignoring unknown command"),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.receiver.try_recv() {
            commands.push(cmd);
        }
        commands
    }

    /// Stop accepting connections and wait for the listener thread to exit
    fn stop_listener(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.listener_thread.take() {
            if handle.join().is_err() {
                tracing::warn!("remote control listener panicked");
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_listener();
        // Clean up the socket file
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Instant;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("start"), Some(Command::Start));
        assert_eq!(parse_command("  STOP \n"), Some(Command::Stop));
        assert_eq!(parse_command("toggle"), Some(Command::ToggleColor));
        assert_eq!(parse_command("+"), Some(Command::More));
        assert_eq!(parse_command("down"), Some(Command::Less));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_intensity() {
        assert_eq!(parse_command("intensity 42"), Some(Command::Intensity(42.0)));
        assert_eq!(parse_command("12.5"), Some(Command::Intensity(12.5)));
        assert_eq!(parse_command("intensity -3"), None);
        assert_eq!(parse_command("intensity nan"), None);
        assert_eq!(parse_command("louder"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_socket_delivers_commands() {
        let path = std::env::temp_dir().join(format!("emberfall-ctl-{}.sock", std::process::id()));
        let controller = Controller::bind(&path).unwrap();

        let mut client = UnixStream::connect(&path).unwrap();
        client.write_all(b"start\nintensity 30\nbogus\ntoggle\n").unwrap();
        drop(client);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut received = Vec::new();
        while received.len() < 3 && Instant::now() < deadline {
            received.extend(controller.poll());
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(
            received,
            vec![Command::Start, Command::Intensity(30.0), Command::ToggleColor]
        );

        drop(controller);
        assert!(!path.exists());
    }

    #[test]
    fn test_listener_thread_exits_on_shutdown() {
        let path = std::env::temp_dir().join(format!("emberfall-stop-{}.sock", std::process::id()));
        let mut controller = Controller::bind(&path).unwrap();

        controller.stop_listener();
        assert!(controller.listener_thread.is_none());
        // The listener's sender went away with its thread
        assert!(matches!(
            controller.receiver.try_recv(),
            Err(mpsc::TryRecvError::Disconnected)
        ));
        // The listening socket was closed along with it
        assert!(UnixStream::connect(&path).is_err());

        drop(controller);
        assert!(!path.exists());
    }
}
