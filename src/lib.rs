//! emberfall: particle flame animation
//!
//! A `FlameAnimation` owns a population of flame particles and renders them
//! onto any [`Surface`] each time its [`Host`] delivers a frame. The crate
//! ships a software [`PixelBuffer`] surface and a [`QueuedHost`]; the
//! `window` feature adds an SDL2 window for the demo binary.
//!
//! ```no_run
//! use emberfall::{FlameAnimation, PixelBuffer, QueuedHost};
//!
//! let mut anim = FlameAnimation::with_defaults(PixelBuffer::new(), QueuedHost::new(800, 600))?;
//! anim.create_particles(50.0);
//! anim.start();
//! loop {
//!     for frame in anim.host_mut().take_due_frames() {
//!         anim.on_frame(frame);
//!     }
//!     // present anim.surface() ...
//! #   break;
//! }
//! # Ok::<(), emberfall::FlameError>(())
//! ```

pub mod animation;
pub mod config;
#[cfg(unix)]
pub mod control;
pub mod display;
pub mod error;
pub mod host;
pub mod math;
pub mod palette;
pub mod particles;
pub mod surface;
pub mod util;

pub use animation::FlameAnimation;
pub use config::AnimationSettings;
pub use display::PixelBuffer;
pub use error::{FlameError, Result};
pub use host::{FrameHandle, Host, ListenerId, QueuedHost};
pub use palette::{Color, ColorScheme, RadialGradient};
pub use particles::{Particle, ParticleConfig};
pub use surface::{PaintContext, Surface};
