//! Track and playlist types plus the helpers that turn paths into tracks.
//!
//! Directories given on the command line are expanded by `scan`; everything
//! else (including picker results) goes straight through `Track::from_path`.

mod display;
mod model;
mod scan;

pub use display::display_name;
pub use model::{Playlist, Track};
pub use scan::{collect_paths, normalize_extensions};
