//! Tournament bracket generation
//!
//! Standalone helper: brackets are computed from a participant list and
//! returned, never stored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
}

impl BracketType {
    /// Parse a bracket type; unknown names fall back to round robin
    pub fn parse(name: &str) -> Self {
        match name {
            "single_elimination" => BracketType::SingleElimination,
            "double_elimination" => BracketType::DoubleElimination,
            _ => BracketType::RoundRobin,
        }
    }
}

/// One elimination pairing; `None` is a bye or a not-yet-decided slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub winner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRobinMatch {
    pub player1: String,
    pub player2: String,
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EliminationBracket {
    pub rounds: Vec<Vec<Match>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bracket {
    SingleElimination {
        rounds: Vec<Vec<Match>>,
        participants: Vec<String>,
    },
    DoubleElimination {
        winners_bracket: EliminationBracket,
        losers_bracket: EliminationBracket,
        participants: Vec<String>,
    },
    RoundRobin {
        matches: Vec<RoundRobinMatch>,
        participants: Vec<String>,
    },
}

pub fn generate(bracket_type: BracketType, participants: &[String]) -> Bracket {
    log::debug!(
        "Generating {:?} bracket for {} participants",
        bracket_type,
        participants.len()
    );
    match bracket_type {
        BracketType::SingleElimination => Bracket::SingleElimination {
            rounds: elimination_rounds(participants),
            participants: participants.to_vec(),
        },
        BracketType::DoubleElimination => Bracket::DoubleElimination {
            winners_bracket: EliminationBracket {
                rounds: elimination_rounds(participants),
            },
            losers_bracket: EliminationBracket { rounds: Vec::new() },
            participants: participants.to_vec(),
        },
        BracketType::RoundRobin => Bracket::RoundRobin {
            matches: round_robin(participants),
            participants: participants.to_vec(),
        },
    }
}

/// Pad to the next power of two with byes and pair neighbours until one slot remains
///
/// A match whose second slot is a bye advances the first slot; every other
/// match advances an undecided slot.
fn elimination_rounds(participants: &[String]) -> Vec<Vec<Match>> {
    if participants.is_empty() {
        return Vec::new();
    }

    let bracket_size = participants.len().next_power_of_two();
    let mut current: Vec<Option<String>> = participants.iter().cloned().map(Some).collect();
    current.resize(bracket_size, None);

    let mut rounds = Vec::new();
    while current.len() > 1 {
        let mut next_round = Vec::with_capacity(current.len() / 2);
        let mut matches = Vec::with_capacity(current.len() / 2);

        for pair in current.chunks(2) {
            let player1 = pair[0].clone();
            let player2 = pair.get(1).cloned().flatten();

            next_round.push(if player2.is_none() {
                player1.clone()
            } else {
                None
            });
            matches.push(Match {
                player1,
                player2,
                winner: None,
            });
        }

        rounds.push(matches);
        current = next_round;
    }
    rounds
}

fn round_robin(participants: &[String]) -> Vec<RoundRobinMatch> {
    let mut matches = Vec::new();
    for (i, player1) in participants.iter().enumerate() {
        for player2 in &participants[i + 1..] {
            matches.push(RoundRobinMatch {
                player1: player1.clone(),
                player2: player2.clone(),
                result: None,
            });
        }
    }
    matches
}
