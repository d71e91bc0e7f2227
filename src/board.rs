//! Ranked, colored leaderboard rows built from API responses.
//!
//! Colors are keyed by row index, never by the total row count, so loading the
//! next page only appends new colors and every row already on screen keeps its
//! hue.

use crate::models::{FetchUserResponse, Game, GameParticipant, User};
use crate::style::{EntryStyle, Tone};
use serde::{Deserialize, Serialize};

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position across all loaded pages.
    pub rank: u64,
    pub user: User,
    pub style: EntryStyle,
}

/// Rank `users` by elo (highest first, ties keep input order) starting at
/// `first_index`.
pub fn standings(users: &[User], first_index: u64, tone: Tone) -> Vec<Standing> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by(|a, b| b.elo.cmp(&a.elo));
    sorted
        .into_iter()
        .zip(first_index..)
        .map(|(user, index)| Standing {
            rank: index + 1,
            user: user.clone(),
            style: EntryStyle::for_index(index, tone),
        })
        .collect()
}

/// Standings accumulated over successive pages of `/api/user/fetch`.
#[derive(Debug, Clone, Default)]
pub struct Board {
    tone: Tone,
    rows: Vec<Standing>,
    next_page: Option<String>,
}

impl Board {
    pub fn new(tone: Tone) -> Self {
        Self {
            tone,
            ..Default::default()
        }
    }

    /// Append a page and return the rows it added.
    pub fn push_page(&mut self, page: FetchUserResponse) -> &[Standing] {
        let start = self.rows.len();
        let added = standings(&page.users, start as u64, self.tone);
        self.rows.extend(added);
        self.next_page = Some(page.newpagekey).filter(|k| !k.is_empty());
        &self.rows[start..]
    }

    pub fn rows(&self) -> &[Standing] {
        &self.rows
    }

    /// Cursor to pass as `lastpagekey` for the next page, if there is one.
    pub fn next_page_key(&self) -> Option<&str> {
        self.next_page.as_deref()
    }
}

/// Participants of a game with their team color, ordered by placement.
pub fn participant_styles(game: &Game, tone: Tone) -> Vec<(GameParticipant, EntryStyle)> {
    let mut rows: Vec<(GameParticipant, EntryStyle)> = game
        .participants
        .values()
        .map(|p| {
            let style = match u64::try_from(p.team) {
                Ok(team) => EntryStyle::for_index(team, tone),
                Err(_) => EntryStyle::neutral(tone),
            };
            (p.clone(), style)
        })
        .collect();
    rows.sort_by(|(a, _), (b, _)| {
        a.placement
            .cmp(&b.placement)
            .then_with(|| a.username.cmp(&b.username))
    });
    rows
}
