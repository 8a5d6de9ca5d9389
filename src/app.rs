//! Application module: the playback controller and the view state it keeps.
//!
//! `App` lives in `app::model`; the `View` it renders into lives in
//! `app::view`.

mod model;
mod view;

pub use model::*;
pub use view::*;

#[cfg(test)]
mod tests;
