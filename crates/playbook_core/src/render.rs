//! Rendering surface collaborator.
//!
//! The core pushes to the surface and never reads back from it.

use crate::models::{FieldPos, Player};
use serde::Serialize;

pub trait RenderSurface {
    /// Paint the full roster.
    fn render(&mut self, players: &[Player]);

    /// Paint a route polyline over the field. An empty slice clears it.
    fn render_route(&mut self, points: &[FieldPos]);

    fn set_viewport(&mut self, zoom: f64, pan_x: f64, pan_y: f64);

    /// The hosting container changed size.
    fn resize(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    Render { players: Vec<Player> },
    RenderRoute { points: Vec<FieldPos> },
    SetViewport { zoom: f64, pan_x: f64, pan_y: f64 },
    Resize,
}

/// Surface that keeps every call, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Roster of the most recent `render` call.
    pub fn last_render(&self) -> Option<&[Player]> {
        self.calls.iter().rev().find_map(|call| match call {
            SurfaceCall::Render { players } => Some(players.as_slice()),
            _ => None,
        })
    }

    pub fn render_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, SurfaceCall::Render { .. })).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, players: &[Player]) {
        self.calls.push(SurfaceCall::Render { players: players.to_vec() });
    }

    fn render_route(&mut self, points: &[FieldPos]) {
        self.calls.push(SurfaceCall::RenderRoute { points: points.to_vec() });
    }

    fn set_viewport(&mut self, zoom: f64, pan_x: f64, pan_y: f64) {
        self.calls.push(SurfaceCall::SetViewport { zoom, pan_x, pan_y });
    }

    fn resize(&mut self) {
        self.calls.push(SurfaceCall::Resize);
    }
}
