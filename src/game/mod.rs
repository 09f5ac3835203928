pub mod broadcaster;
pub mod player;
pub mod registry;
pub mod session;
pub mod timer;

pub use player::{BloodStain, Player, PlayerView, Role};
pub use registry::Registry;
pub use session::GameSession;
