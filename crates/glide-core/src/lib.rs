pub mod child;
pub mod completion;
pub mod config;
pub mod error;
pub mod gaps;
pub mod geometry;
pub mod headless;
pub mod platform;
pub mod registry;
pub mod scroll;
pub mod scroller;
pub mod transition;

pub use child::{Child, ChildKey, TransitionState};
pub use completion::{Completion, Resolver};
pub use config::{GlideConfig, ScrollConfig, TransitionConfig};
pub use error::{Error, Result};
pub use platform::{AnimationEngine, ElementHandle, EventBus, ScrollEvent, Viewport};
pub use scroll::{Direction, Easing, Mode};
pub use scroller::{Scroller, WheelOutcome};
pub use transition::{Fade, TransitionKind};
