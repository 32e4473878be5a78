//! Formation Store
//!
//! Holds at most one *current* formation, always a deep clone of a template
//! or a saved custom formation. Every successful mutation notifies the single
//! registered observer with the full formation.

use super::persistence::FormationRepository;
use super::templates::{all_templates, template_by_id, templates_of};
use crate::error::{PlaybookError, Result};
use crate::models::{
    FieldPos, FlipAxis, Formation, FormationMetadata, FormationType, Player, Team, ValidationReport,
};
use serde::Serialize;
use tracing::{debug, info, warn};

pub type FormationObserver = Box<dyn FnMut(&Formation)>;

/// Templates followed by custom formations, split by type.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableFormations {
    pub offensive: Vec<Formation>,
    pub defensive: Vec<Formation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormationStats {
    pub total: usize,
    pub offensive: usize,
    pub defensive: usize,
    pub custom: usize,
}

pub struct FormationStore {
    repository: Box<dyn FormationRepository>,
    current: Option<Formation>,
    observer: Option<FormationObserver>,
}

impl FormationStore {
    pub fn new(repository: Box<dyn FormationRepository>) -> Self {
        Self { repository, current: None, observer: None }
    }

    /// Replaces any previously registered observer.
    pub fn set_on_change(&mut self, observer: impl FnMut(&Formation) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn notify(&mut self) {
        if let (Some(observer), Some(formation)) = (self.observer.as_mut(), self.current.as_ref()) {
            observer(formation);
        }
    }

    pub fn current(&self) -> Option<&Formation> {
        self.current.as_ref()
    }

    fn lookup(&self, formation_id: &str) -> Option<Formation> {
        template_by_id(formation_id).cloned().or_else(|| self.repository.get(formation_id))
    }

    /// Loads a template or saved custom formation into the current slot.
    pub fn load(&mut self, formation_id: &str) -> Result<&Formation> {
        let Some(formation) = self.lookup(formation_id) else {
            debug!(formation_id, "formation not found");
            return Err(PlaybookError::formation_not_found(formation_id));
        };
        debug!(formation_id, players = formation.players.len(), "formation loaded");
        self.current = Some(formation);
        self.notify();
        self.current.as_ref().ok_or_else(|| PlaybookError::formation_not_found(formation_id))
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.current.as_ref()?.player(player_id)
    }

    pub fn players_by_team(&self, team: Team) -> Vec<&Player> {
        self.current.as_ref().map(|f| f.players_by_team(team)).unwrap_or_default()
    }

    pub fn active_players(&self) -> Vec<&Player> {
        self.current.as_ref().map(|f| f.active_players()).unwrap_or_default()
    }

    /// Applies `edit` to one player of the current formation and notifies.
    fn edit_player(&mut self, player_id: &str, edit: impl FnOnce(&mut Player)) -> bool {
        let Some(player) = self.current.as_mut().and_then(|f| f.player_mut(player_id)) else {
            return false;
        };
        edit(player);
        self.notify();
        true
    }

    /// No clamping here; callers keep positions in bounds.
    pub fn move_player(&mut self, player_id: &str, x: f64, y: f64) -> bool {
        self.edit_player(player_id, |p| p.set_position(FieldPos::new(x, y)))
    }

    pub fn set_active(&mut self, player_id: &str, active: bool) -> bool {
        self.edit_player(player_id, |p| p.is_active = active)
    }

    pub fn flip(&mut self, axis: FlipAxis) {
        if let Some(formation) = self.current.as_mut() {
            formation.flip(axis);
            self.notify();
        }
    }

    pub fn validate(&self) -> ValidationReport {
        match &self.current {
            Some(formation) => formation.validate(),
            None => ValidationReport::from_errors(vec!["No formation loaded".to_string()]),
        }
    }

    /// Reloads the original for the current id, discarding edits. Unknown
    /// ids leave the current formation as is.
    pub fn reset(&mut self) {
        let Some(id) = self.current.as_ref().map(|f| f.id.clone()) else {
            return;
        };
        if let Some(original) = self.lookup(&id) {
            self.current = Some(original);
            self.notify();
        }
    }

    pub fn metadata(&self) -> FormationMetadata {
        self.current.as_ref().map(|f| f.metadata.clone()).unwrap_or_default()
    }

    pub fn update_metadata(&mut self, patch: FormationMetadata) {
        if let Some(formation) = self.current.as_mut() {
            formation.metadata.merge(patch);
            self.notify();
        }
    }

    pub fn available(&self) -> AvailableFormations {
        let customs = self.repository.list();
        let collect = |formation_type: FormationType| -> Vec<Formation> {
            templates_of(formation_type)
                .iter()
                .cloned()
                .chain(customs.iter().filter(|f| f.formation_type == formation_type).cloned())
                .collect()
        };
        AvailableFormations {
            offensive: collect(FormationType::Offensive),
            defensive: collect(FormationType::Defensive),
        }
    }

    /// Stores a copy of the current roster as `custom-<uuid>`.
    pub fn save_current_as_custom(&mut self, name: &str) -> Option<Formation> {
        let current = self.current.as_ref()?;
        let custom = Formation {
            id: format!("custom-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            formation_type: current.formation_type,
            players: current.players.clone(),
            metadata: FormationMetadata { personnel: Some("Custom".to_string()), ..Default::default() },
        };
        match self.repository.put(custom.clone()) {
            Ok(()) => {
                info!(id = %custom.id, name, "saved custom formation");
                Some(custom)
            }
            Err(e) => {
                warn!(error = %e, "failed to save custom formation");
                None
            }
        }
    }

    pub fn delete_custom(&mut self, formation_id: &str) -> bool {
        match self.repository.remove(formation_id) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(formation_id, error = %e, "failed to delete custom formation");
                false
            }
        }
    }

    pub fn export_json(&self) -> Option<String> {
        let formation = self.current.as_ref()?;
        match formation.to_json_pretty() {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "failed to export formation");
                None
            }
        }
    }

    /// Parses, checks `id/name/type/players`, assigns `imported-<uuid>` and
    /// stores it as a custom formation. Nothing is stored on failure.
    pub fn import_json(&mut self, text: &str) -> Result<Formation> {
        let result = parse_import(text).and_then(|mut formation| {
            formation.id = format!("imported-{}", uuid::Uuid::new_v4());
            self.repository.put(formation.clone())?;
            Ok(formation)
        });
        match &result {
            Ok(formation) => info!(id = %formation.id, name = %formation.name, "imported formation"),
            Err(e) => warn!(error = %e, "failed to import formation"),
        }
        result
    }

    pub fn search(&self, query: &str) -> Vec<Formation> {
        let query = query.to_lowercase();
        all_templates()
            .cloned()
            .chain(self.repository.list())
            .filter(|f| {
                f.name.to_lowercase().contains(&query)
                    || f.metadata.personnel.as_deref().is_some_and(|p| p.to_lowercase().contains(&query))
                    || f.formation_type.as_str().contains(&query)
            })
            .collect()
    }

    pub fn stats(&self) -> FormationStats {
        let customs = self.repository.list();
        let count = |formation_type: FormationType| {
            templates_of(formation_type).len()
                + customs.iter().filter(|f| f.formation_type == formation_type).count()
        };
        let offensive = count(FormationType::Offensive);
        let defensive = count(FormationType::Defensive);
        FormationStats { total: offensive + defensive, offensive, defensive, custom: customs.len() }
    }
}

fn parse_import(text: &str) -> Result<Formation> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    for key in ["id", "name", "type", "players"] {
        let present = match value.get(key) {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(PlaybookError::Parse(format!("formation is missing '{}'", key)));
        }
    }
    Ok(serde_json::from_value(value)?)
}
