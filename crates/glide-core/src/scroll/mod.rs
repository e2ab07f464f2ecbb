//! Virtual scroll position model
//!
//! # Layout
//!
//! ## Atomic layer
//! - `easing` - Pure easing curves used by tween requests
//! - `timing` - Interpolation helpers (lerp, first-order smoothing, convergence)
//!
//! ## State layer
//! - `state` - `ScrollState`: mode, target/current position and the smoothing step
//!
//! # Usage
//!
//! ```ignore
//! use glide_core::scroll::{Mode, ScrollState};
//!
//! let mut state = ScrollState::new(Mode::Smooth, 0.075, 0.5);
//! state.set_bound(4000.0);
//! state.apply_wheel(120.0);
//!
//! // Once per animation frame until it reports convergence
//! while !state.step(0.1) {}
//! ```

pub mod easing;
pub mod timing;

pub mod state;

pub use easing::Easing;
pub use state::{Direction, Mode, ScrollState};
