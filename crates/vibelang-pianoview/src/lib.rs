//! vibelang-pianoview - Piano keyboard widget core for VibeLang
//!
//! Lays out 1 to 88 piano keys on a pixel surface and turns pointer input
//! into key events. Features include:
//!
//! - Integer key layout whose rightmost key always ends at the view's edge
//! - Multi-pointer tracking with per-key reference counts
//! - Highlight modes: while held, toggled by clicks, or off
//! - Host-agnostic painting through a display list and the [`Canvas`] trait
//! - Save/restore of the view state as TOML
//! - A terminal host (`vibe-piano`) built on ratatui
//!
//! # Usage as a Library
//!
//! ```no_run
//! use vibelang_pianoview::{PianoEvent, PianoStyle, PianoView, PointerEvent, PointerSample};
//!
//! let mut piano = PianoView::new(PianoStyle::default())?;
//! piano.set_size(1080, 300);
//!
//! let (sender, receiver) = crossbeam_channel::unbounded();
//! piano.add_listener(vibelang_pianoview::ChannelListener::new(sender));
//!
//! piano.on_pointer_event(&PointerEvent::Down(PointerSample::new(0, 20.0, 280.0)));
//! for event in receiver.try_iter() {
//!     if let PianoEvent::KeyDown(key) = event {
//!         println!("Key {} down", key);
//!     }
//! }
//!
//! for rect in piano.display_list() {
//!     println!("{:?} {:?} {}", rect.shape, rect.bounds, rect.fill);
//! }
//! # Ok::<(), vibelang_pianoview::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod highlight;
pub mod key;
pub mod layout;
pub mod listener;
pub mod paint;
pub mod state;
pub mod style;
pub mod touch;
pub mod ui;
pub mod view;

// Re-export main types
pub use config::{Config, TerminalSettings};
pub use error::{Error, Result};
pub use highlight::Highlight;
pub use key::{is_black_key, is_white_key, KeyColor, MAX_NUMBER_OF_KEYS, MIN_NUMBER_OF_KEYS};
pub use layout::{KeyboardLayout, LayoutParams, Rect};
pub use listener::{ChannelListener, ListenerId, PianoListener};
pub use paint::{display_list, Canvas, Color, RoundedRect, Shape};
pub use state::SavedState;
pub use style::{PianoStyle, ShowPressMode};
pub use touch::{PianoEvent, PointerEvent, PointerId, PointerMode, PointerSample, TouchTracker};
pub use ui::{BufferCanvas, CellGrid, PianoWidget};
pub use view::PianoView;
