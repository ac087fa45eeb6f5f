/// Stable numeric identity of an authenticated user.
pub type PlayerId = u64;

/// Number of completed simulation steps in a session.
pub type Tick = u64;

/// Accumulated points of a player.
pub type Score = u64;
