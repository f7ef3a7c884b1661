//! Applied selections translated into graph-data query parameters.

use shared::{
    domain::{Selections, PLAYERS_GROUP, STAT_GROUP},
    protocol::{SELECTED_PLAYERS_PARAM, STAT_PARAM},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDataQuery {
    pub players: Vec<String>,
    pub stat: Option<String>,
}

impl GraphDataQuery {
    /// Every applied player becomes one repeated parameter; only the first applied stat is sent.
    pub fn from_applied(applied: &Selections) -> Self {
        Self {
            players: applied
                .values(PLAYERS_GROUP)
                .into_iter()
                .map(|value| value.0)
                .collect(),
            stat: applied
                .values(STAT_GROUP)
                .into_iter()
                .next()
                .map(|value| value.0),
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .players
            .iter()
            .map(|player| (SELECTED_PLAYERS_PARAM, player.clone()))
            .collect();
        if let Some(stat) = &self.stat {
            pairs.push((STAT_PARAM, stat.clone()));
        }
        pairs
    }
}
