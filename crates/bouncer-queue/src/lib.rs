//! Action queueing and the platform-facing seams for the bouncer bot.

pub mod clock;
pub mod directory;
pub mod mock;
pub mod platform;
pub mod queue;

pub use clock::{Clock, MockClock, SystemClock};
pub use directory::{GuildDirectory, MemberView};
pub use mock::{MockDirectory, MockPlatform};
pub use platform::PlatformClient;
pub use queue::{ActionQueue, OutcomeHandle};
