//! Built-in formation templates.
//!
//! Templates are the immutable source of truth for `load` and `reset`;
//! the store only ever hands out clones.

use crate::models::{
    FootballPosition::{self, *},
    Formation, FormationMetadata, FormationType, Player, Team,
};
use once_cell::sync::Lazy;

type Row = (&'static str, u8, FootballPosition, f64, f64, bool);

fn build(
    id: &str,
    name: &str,
    formation_type: FormationType,
    personnel: &str,
    down: u8,
    distance: u8,
    rows: &[Row],
) -> Formation {
    let team = match formation_type {
        FormationType::Offensive => Team::Offense,
        FormationType::Defensive => Team::Defense,
    };
    Formation {
        id: id.to_string(),
        name: name.to_string(),
        formation_type,
        players: rows
            .iter()
            .map(|&(pid, number, pos, x, y, active)| Player::new(pid, number, pos, team, x, y, active))
            .collect(),
        metadata: FormationMetadata {
            personnel: Some(personnel.to_string()),
            down: Some(down),
            distance: Some(distance),
            field_position: None,
        },
    }
}

/// Interior line shared by every offensive template.
const OFFENSIVE_LINE: [Row; 5] = [
    ("lt", 71, LT, 30.0, 23.0, false),
    ("lg", 65, LG, 30.0, 25.0, false),
    ("c", 55, C, 30.0, 26.5, false),
    ("rg", 67, RG, 30.0, 28.0, false),
    ("rt", 76, RT, 30.0, 30.0, false),
];

fn offense(id: &str, name: &str, personnel: &str, down: u8, distance: u8, skill: &[Row]) -> Formation {
    let mut rows = skill.to_vec();
    rows.extend_from_slice(&OFFENSIVE_LINE);
    build(id, name, FormationType::Offensive, personnel, down, distance, &rows)
}

pub static OFFENSIVE_TEMPLATES: Lazy<Vec<Formation>> = Lazy::new(|| {
    vec![
        offense(
            "i-formation",
            "I-Formation",
            "21 personnel",
            1,
            10,
            &[
                ("qb", 12, QB, 25.0, 26.5, true),
                ("rb", 21, RB, 18.0, 26.5, true),
                ("fb", 44, FB, 22.0, 26.5, true),
                ("wr1", 80, WR, 30.0, 5.0, true),
                ("wr2", 83, WR, 30.0, 48.0, true),
                ("te", 87, TE, 30.0, 20.0, false),
            ],
        ),
        offense(
            "shotgun-spread",
            "Shotgun Spread",
            "11 personnel",
            2,
            8,
            &[
                ("qb", 12, QB, 22.0, 26.5, true),
                ("rb", 21, RB, 18.0, 26.5, true),
                ("wr1", 80, WR, 30.0, 3.0, true),
                ("wr2", 83, WR, 30.0, 50.0, true),
                ("wr3", 11, WR, 30.0, 15.0, true),
                ("wr4", 19, WR, 30.0, 38.0, true),
            ],
        ),
        offense(
            "pistol",
            "Pistol Formation",
            "11 personnel",
            1,
            10,
            &[
                ("qb", 12, QB, 26.0, 26.5, true),
                ("rb", 21, RB, 21.0, 26.5, true),
                ("wr1", 80, WR, 30.0, 5.0, true),
                ("wr2", 83, WR, 30.0, 48.0, true),
                ("wr3", 11, WR, 30.0, 15.0, true),
                ("te", 87, TE, 30.0, 38.0, false),
            ],
        ),
        offense(
            "empty-backfield",
            "Empty Backfield",
            "10 personnel",
            3,
            12,
            &[
                ("qb", 12, QB, 22.0, 26.5, true),
                ("wr1", 80, WR, 30.0, 3.0, true),
                ("wr2", 83, WR, 30.0, 50.0, true),
                ("wr3", 11, WR, 30.0, 12.0, true),
                ("wr4", 19, WR, 30.0, 41.0, true),
                ("wr5", 14, WR, 28.0, 18.0, true),
            ],
        ),
    ]
});

fn defense(id: &str, name: &str, personnel: &str, down: u8, distance: u8, rows: &[Row]) -> Formation {
    build(id, name, FormationType::Defensive, personnel, down, distance, rows)
}

pub static DEFENSIVE_TEMPLATES: Lazy<Vec<Formation>> = Lazy::new(|| {
    vec![
        defense(
            "4-3-defense",
            "4-3 Defense",
            "Base defense",
            1,
            10,
            &[
                ("de1", 94, DE, 32.0, 19.0, true),
                ("dt1", 99, DT, 32.0, 24.0, true),
                ("dt2", 92, DT, 32.0, 29.0, true),
                ("de2", 96, DE, 32.0, 34.0, true),
                ("mlb", 54, MLB, 26.0, 26.5, true),
                ("olb1", 52, OLB, 26.0, 21.0, true),
                ("olb2", 56, OLB, 26.0, 32.0, true),
                ("cb1", 24, CB, 20.0, 8.0, false),
                ("cb2", 27, CB, 20.0, 45.0, false),
                ("fs", 29, FS, 15.0, 26.5, false),
                ("ss", 31, SS, 18.0, 35.0, false),
            ],
        ),
        defense(
            "3-4-defense",
            "3-4 Defense",
            "Base defense",
            1,
            10,
            &[
                ("de1", 94, DE, 32.0, 21.0, true),
                ("nt", 99, NT, 32.0, 26.5, true),
                ("de2", 96, DE, 32.0, 32.0, true),
                ("olb1", 58, OLB, 28.0, 17.0, true),
                ("mlb1", 54, MLB, 26.0, 24.0, true),
                ("mlb2", 52, MLB, 26.0, 29.0, true),
                ("olb2", 56, OLB, 28.0, 36.0, true),
                ("cb1", 24, CB, 20.0, 8.0, false),
                ("cb2", 27, CB, 20.0, 45.0, false),
                ("fs", 29, FS, 15.0, 26.5, false),
                ("ss", 31, SS, 18.0, 35.0, false),
            ],
        ),
        defense(
            "nickel-defense",
            "Nickel Defense",
            "Nickel package",
            2,
            8,
            &[
                ("de1", 94, DE, 32.0, 19.0, true),
                ("dt1", 99, DT, 32.0, 24.0, true),
                ("dt2", 92, DT, 32.0, 29.0, true),
                ("de2", 96, DE, 32.0, 34.0, true),
                ("mlb", 54, MLB, 26.0, 26.5, true),
                ("olb", 52, OLB, 26.0, 32.0, true),
                ("cb1", 24, CB, 20.0, 8.0, false),
                ("cb2", 27, CB, 20.0, 45.0, false),
                ("cb3", 22, CB, 22.0, 18.0, false),
                ("fs", 29, FS, 15.0, 26.5, false),
                ("ss", 31, SS, 18.0, 35.0, false),
            ],
        ),
        defense(
            "dime-defense",
            "Dime Defense",
            "Dime package",
            3,
            12,
            &[
                ("de1", 94, DE, 32.0, 21.0, true),
                ("dt1", 99, DT, 32.0, 26.0, true),
                ("dt2", 92, DT, 32.0, 27.5, true),
                ("de2", 96, DE, 32.0, 32.0, true),
                ("mlb", 54, MLB, 26.0, 26.5, true),
                ("cb1", 24, CB, 20.0, 6.0, false),
                ("cb2", 27, CB, 20.0, 47.0, false),
                ("cb3", 22, CB, 22.0, 16.0, false),
                ("cb4", 23, CB, 22.0, 37.0, false),
                ("fs", 29, FS, 15.0, 26.5, false),
                ("ss", 31, SS, 18.0, 35.0, false),
            ],
        ),
    ]
});

pub fn templates_of(formation_type: FormationType) -> &'static [Formation] {
    match formation_type {
        FormationType::Offensive => &OFFENSIVE_TEMPLATES,
        FormationType::Defensive => &DEFENSIVE_TEMPLATES,
    }
}

pub fn all_templates() -> impl Iterator<Item = &'static Formation> {
    OFFENSIVE_TEMPLATES.iter().chain(DEFENSIVE_TEMPLATES.iter())
}

pub fn template_by_id(id: &str) -> Option<&'static Formation> {
    all_templates().find(|f| f.id == id)
}

pub fn templates_by_personnel(personnel: &str) -> Vec<&'static Formation> {
    all_templates()
        .filter(|f| f.metadata.personnel.as_deref().is_some_and(|p| p.contains(personnel)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_template_has_eleven_unique_players() {
        for formation in all_templates() {
            assert_eq!(formation.players.len(), 11, "{}", formation.id);
            let ids: HashSet<_> = formation.players.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids.len(), 11, "duplicate ids in {}", formation.id);
            assert!(formation.players.iter().all(|p| p.position().is_in_bounds()));
        }
    }

    #[test]
    fn test_template_sides_match_type() {
        for formation in templates_of(FormationType::Offensive) {
            assert!(formation.players.iter().all(|p| p.team == Team::Offense));
        }
        for formation in templates_of(FormationType::Defensive) {
            assert!(formation.players.iter().all(|p| p.team == Team::Defense));
        }
    }

    #[test]
    fn test_lookup_helpers() {
        assert_eq!(template_by_id("pistol").map(|f| f.name.as_str()), Some("Pistol Formation"));
        assert!(template_by_id("wishbone").is_none());
        assert_eq!(templates_by_personnel("11 personnel").len(), 2);
    }
}
