use crate::field::{FIELD_LENGTH_YD, FIELD_WIDTH_YD};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Field coordinates in yards: x along the length (0..=120, end zones
/// included), y across the width (0..=53.33), origin at the top-left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
pub struct FieldPos {
    pub x: f64,
    pub y: f64,
}

impl FieldPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_in_bounds(&self) -> bool {
        (0.0..=FIELD_LENGTH_YD).contains(&self.x) && (0.0..=FIELD_WIDTH_YD).contains(&self.y)
    }

    pub fn distance_to(&self, other: &FieldPos) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear blend toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: &FieldPos, t: f64) -> FieldPos {
        FieldPos { x: self.x + (other.x - self.x) * t, y: self.y + (other.y - self.y) * t }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Offense,
    Defense,
}

impl Team {
    pub fn label(&self) -> &'static str {
        match self {
            Team::Offense => "Offense",
            Team::Defense => "Defense",
        }
    }
}

/// Position codes used on the diagram.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum FootballPosition {
    // Offense
    QB,
    RB,
    FB,
    WR,
    TE,
    LT,
    LG,
    C,
    RG,
    RT,
    // Defense
    DE,
    DT,
    NT,
    LB,
    MLB,
    OLB,
    CB,
    S,
    FS,
    SS,
}

impl FootballPosition {
    pub fn is_offensive(&self) -> bool {
        matches!(
            self,
            FootballPosition::QB
                | FootballPosition::RB
                | FootballPosition::FB
                | FootballPosition::WR
                | FootballPosition::TE
                | FootballPosition::LT
                | FootballPosition::LG
                | FootballPosition::C
                | FootballPosition::RG
                | FootballPosition::RT
        )
    }

    pub fn is_lineman(&self) -> bool {
        matches!(
            self,
            FootballPosition::LT
                | FootballPosition::LG
                | FootballPosition::C
                | FootballPosition::RG
                | FootballPosition::RT
                | FootballPosition::DE
                | FootballPosition::DT
                | FootballPosition::NT
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub number: u8,
    #[serde(rename = "position", alias = "footballPosition")]
    pub football_position: FootballPosition,
    pub team: Team,
    pub x: f64,
    pub y: f64,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        number: u8,
        football_position: FootballPosition,
        team: Team,
        x: f64,
        y: f64,
        is_active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            number,
            football_position,
            team,
            x,
            y,
            is_active,
            assignment: None,
        }
    }

    pub fn position(&self) -> FieldPos {
        FieldPos { x: self.x, y: self.y }
    }

    pub fn set_position(&mut self, pos: FieldPos) {
        self.x = pos.x;
        self.y = pos.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_json_uses_original_keys() {
        let player = Player::new("qb", 12, FootballPosition::QB, Team::Offense, 25.0, 26.5, true);
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["position"], "QB");
        assert_eq!(json["team"], "offense");
        assert_eq!(json["isActive"], true);
        assert!(json.get("assignment").is_none());
    }

    #[test]
    fn test_player_accepts_football_position_alias() {
        let json = r#"{"id":"cb1","number":24,"footballPosition":"CB","team":"defense","x":20,"y":8,"isActive":false}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.football_position, FootballPosition::CB);
        assert_eq!(player.team, Team::Defense);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(FieldPos::new(0.0, 0.0).is_in_bounds());
        assert!(FieldPos::new(120.0, 53.33).is_in_bounds());
        assert!(!FieldPos::new(120.1, 10.0).is_in_bounds());
        assert!(!FieldPos::new(10.0, -0.1).is_in_bounds());
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = FieldPos::new(10.0, 20.0);
        let b = FieldPos::new(30.0, 40.0);
        assert_eq!(a.lerp(&b, 0.5), FieldPos::new(20.0, 30.0));
        assert_eq!(a.distance_to(&FieldPos::new(13.0, 24.0)), 5.0);
    }

    #[test]
    fn test_position_sides() {
        assert!(FootballPosition::TE.is_offensive());
        assert!(!FootballPosition::NT.is_offensive());
        assert!(FootballPosition::NT.is_lineman());
        assert!(!FootballPosition::FS.is_lineman());
    }
}
