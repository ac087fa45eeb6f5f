pub mod game;
pub mod player;
pub mod types;

pub use game::{Game, TerminalOutcome};
pub use player::{Player, PlayerClass, UserProfile};
pub use types::{PlayerId, Score, Tick};
