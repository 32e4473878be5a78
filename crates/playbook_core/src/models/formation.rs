use super::player::{Player, Team};
use crate::field::{FIELD_LENGTH_YD, FIELD_WIDTH_YD};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Players per side in a complete formation.
pub const PLAYERS_PER_SIDE: usize = 11;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormationType {
    Offensive,
    Defensive,
}

impl FormationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormationType::Offensive => "offensive",
            FormationType::Defensive => "defensive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormationMetadata {
    /// e.g. "11 personnel", "Nickel package"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_position: Option<u8>,
}

impl FormationMetadata {
    /// Shallow merge: every `Some` field of `patch` overwrites ours.
    pub fn merge(&mut self, patch: FormationMetadata) {
        if patch.personnel.is_some() {
            self.personnel = patch.personnel;
        }
        if patch.down.is_some() {
            self.down = patch.down;
        }
        if patch.distance.is_some() {
            self.distance = patch.distance;
        }
        if patch.field_position.is_some() {
            self.field_position = patch.field_position;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Formation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub formation_type: FormationType,
    pub players: Vec<Player>,
    #[serde(default)]
    pub metadata: FormationMetadata,
}

/// Mirror axis for [`Formation::flip`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Mirror across the width (y).
    Horizontal,
    /// Mirror across the length (x).
    Vertical,
}

/// Advisory validation outcome; never blocks a mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

impl Formation {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn players_by_team(&self, team: Team) -> Vec<&Player> {
        self.players.iter().filter(|p| p.team == team).collect()
    }

    pub fn active_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.is_active).collect()
    }

    /// Reflects every player across the full field: `y' = 53.33 - y`
    /// (horizontal) or `x' = 120 - x` (vertical). Flips play side.
    pub fn flip(&mut self, axis: FlipAxis) {
        for player in &mut self.players {
            match axis {
                FlipAxis::Horizontal => player.y = FIELD_WIDTH_YD - player.y,
                FlipAxis::Vertical => player.x = FIELD_LENGTH_YD - player.x,
            }
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        for team in [Team::Offense, Team::Defense] {
            let count = self.players.iter().filter(|p| p.team == team).count();
            if count != PLAYERS_PER_SIDE {
                errors.push(format!(
                    "{} has {} players, needs {}",
                    team.label(),
                    count,
                    PLAYERS_PER_SIDE
                ));
            }
        }

        // Exact coordinate equality on the bit pattern; `+ 0.0` folds -0.0 into 0.0
        let mut seen = HashSet::with_capacity(self.players.len());
        let overlapping =
            self.players.iter().any(|p| !seen.insert(((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())));
        if overlapping {
            errors.push("Players cannot occupy the same position".to_string());
        }

        for player in &self.players {
            if player.x < 0.0 || player.x > FIELD_LENGTH_YD {
                errors.push(format!("Player {} is out of field bounds (x-axis)", player.number));
            }
            if player.y < 0.0 || player.y > FIELD_WIDTH_YD {
                errors.push(format!("Player {} is out of field bounds (y-axis)", player.number));
            }
        }

        ValidationReport::from_errors(errors)
    }

    /// JSON schema of the import/export format.
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Formation)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::FootballPosition;

    fn side(team: Team, count: usize, x: f64) -> Vec<Player> {
        let position = match team {
            Team::Offense => FootballPosition::WR,
            Team::Defense => FootballPosition::CB,
        };
        (0..count)
            .map(|i| {
                Player::new(format!("{:?}-{}", team, i), i as u8 + 1, position, team, x, 2.0 + i as f64 * 4.0, false)
            })
            .collect()
    }

    fn formation(players: Vec<Player>) -> Formation {
        Formation {
            id: "test".to_string(),
            name: "Test".to_string(),
            formation_type: FormationType::Offensive,
            players,
            metadata: FormationMetadata::default(),
        }
    }

    #[test]
    fn test_full_formation_is_valid() {
        let mut players = side(Team::Offense, 11, 30.0);
        players.extend(side(Team::Defense, 11, 35.0));
        let report = formation(players).validate();
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_ten_offense_reports_one_count_error() {
        let mut players = side(Team::Offense, 10, 30.0);
        players.extend(side(Team::Defense, 11, 35.0));
        let report = formation(players).validate();

        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Offense has 10 players, needs 11".to_string()]);
        assert!(!report.errors.iter().any(|e| e.starts_with("Defense")));
    }

    #[test]
    fn test_validation_report_snapshot() {
        let mut players = side(Team::Offense, 10, 30.0);
        players.extend(side(Team::Defense, 11, 35.0));
        let report = formation(players).validate();

        insta::assert_json_snapshot!(report, @r###"
        {
          "valid": false,
          "errors": [
            "Offense has 10 players, needs 11"
          ]
        }
        "###);
    }

    #[test]
    fn test_overlap_and_bounds_errors() {
        let mut players = side(Team::Offense, 11, 30.0);
        players.extend(side(Team::Defense, 11, 35.0));
        players[1].x = players[0].x;
        players[1].y = players[0].y;
        players[2].x = 121.0;
        players[3].y = -1.0;

        let report = formation(players).validate();
        assert!(report.errors.contains(&"Players cannot occupy the same position".to_string()));
        assert!(report.errors.contains(&"Player 3 is out of field bounds (x-axis)".to_string()));
        assert!(report.errors.contains(&"Player 4 is out of field bounds (y-axis)".to_string()));
    }

    #[test]
    fn test_signed_zero_positions_overlap() {
        let mut players = side(Team::Offense, 11, 30.0);
        players.extend(side(Team::Defense, 11, 35.0));
        players[0].x = 0.0;
        players[0].y = 0.0;
        players[1].x = -0.0;
        players[1].y = -0.0;

        let report = formation(players).validate();
        assert_eq!(report.errors, vec!["Players cannot occupy the same position".to_string()]);
    }

    #[test]
    fn test_flip_is_full_field_reflection() {
        let mut f = formation(side(Team::Offense, 2, 30.0));
        f.flip(FlipAxis::Vertical);
        assert_eq!(f.players[0].x, 90.0);
        f.flip(FlipAxis::Horizontal);
        assert!((f.players[0].y - (53.33 - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_metadata_merge_keeps_unset_fields() {
        let mut meta = FormationMetadata {
            personnel: Some("11 personnel".to_string()),
            down: Some(1),
            distance: Some(10),
            field_position: None,
        };
        meta.merge(FormationMetadata { down: Some(3), ..Default::default() });
        assert_eq!(meta.down, Some(3));
        assert_eq!(meta.distance, Some(10));
        assert_eq!(meta.personnel.as_deref(), Some("11 personnel"));
    }

    #[test]
    fn test_json_schema_names_required_fields() {
        let schema = serde_json::to_value(Formation::json_schema()).unwrap();
        let required = schema["required"].as_array().unwrap();
        for key in ["id", "name", "type", "players"] {
            assert!(required.iter().any(|v| v == key), "missing {}", key);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn flip_twice_restores_positions(
                coords in prop::collection::vec((0.0f64..=FIELD_LENGTH_YD, 0.0f64..=FIELD_WIDTH_YD), 1..22),
                vertical in any::<bool>(),
            ) {
                let players: Vec<Player> = coords
                    .iter()
                    .enumerate()
                    .map(|(i, &(x, y))| {
                        Player::new(format!("p{}", i), i as u8, FootballPosition::WR, Team::Offense, x, y, false)
                    })
                    .collect();
                let mut f = formation(players);
                let axis = if vertical { FlipAxis::Vertical } else { FlipAxis::Horizontal };
                f.flip(axis);
                f.flip(axis);
                for (player, &(x, y)) in f.players.iter().zip(&coords) {
                    prop_assert!((player.x - x).abs() < 1e-9);
                    prop_assert!((player.y - y).abs() < 1e-9);
                }
            }
        }
    }
}
