//! The animation session and the loop that drives it.

pub mod notify;
pub mod player;
#[allow(clippy::module_inception)]
pub mod session;
pub mod state;

pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use player::{DISPLAY_HZ, DisplayClock, Player, PlayerOutcome, RealtimeDisplay, SteppedDisplay};
pub use session::{AnimationSession, ExportTarget, SessionEvent, SessionTask};
pub use state::AnimationState;
