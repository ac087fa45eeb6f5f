use crate::types::{PlayerId, Score};
use std::fmt;

/// An authenticated user as handed over by the account layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserProfile {
    pub id: PlayerId,
    pub login: String,
}

impl UserProfile {
    pub fn new(id: PlayerId, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerClass {
    #[default]
    Engineer,
    Sniper,
    Alchemist,
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerClass::Engineer => write!(f, "Engineer"),
            PlayerClass::Sniper => write!(f, "Sniper"),
            PlayerClass::Alchemist => write!(f, "Alchemist"),
        }
    }
}

/// A participant of one session. Lives exactly as long as the session does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub class: PlayerClass,
    pub score: Score,
}

impl Player {
    pub fn from_user(user: &UserProfile, class: PlayerClass) -> Self {
        Self {
            id: user.id,
            name: user.login.clone(),
            class,
            score: 0,
        }
    }

    pub fn add_score(&mut self, amount: Score) {
        self.score = self.score.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_starts_with_empty_score() {
        let user = UserProfile::new(7, "alice");
        let player = Player::from_user(&user, PlayerClass::Sniper);
        assert_eq!(player.id, 7);
        assert_eq!(player.name, "alice");
        assert_eq!(player.score, 0);
    }

    #[test]
    fn test_add_score_saturates() {
        let mut player = Player::from_user(&UserProfile::new(1, "bob"), PlayerClass::default());
        player.score = u64::MAX - 1;
        player.add_score(10);
        assert_eq!(player.score, u64::MAX);
    }
}
