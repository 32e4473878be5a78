use super::player::FieldPos;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Slant,
    Out,
    In,
    Post,
    Go,
    Comeback,
    Screen,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Route {
    pub id: String,
    pub points: Vec<FieldPos>,
    #[serde(rename = "type")]
    pub route_type: RouteType,
    /// Estimated run time in ms.
    #[serde(rename = "timing")]
    pub timing_ms: f64,
    /// Vertical distance between first and last point, in yards.
    #[serde(rename = "depth")]
    pub depth_yards: f64,
}

/// Derived route figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetadata {
    pub depth_yards: f64,
    pub timing_ms: f64,
    pub length_yards: f64,
}

impl Route {
    /// A fresh custom route starting at `start`.
    pub fn start_at(start: FieldPos) -> Self {
        Self {
            id: format!("route-{}", uuid::Uuid::new_v4()),
            points: vec![start],
            route_type: RouteType::Custom,
            timing_ms: 0.0,
            depth_yards: 0.0,
        }
    }

    pub fn length_yards(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    /// Recomputes depth and timing from the points. Needs at least two points.
    pub fn apply_metadata(&mut self, speed_yards_per_sec: f64) -> Option<RouteMetadata> {
        let meta = route_metadata(&self.points, speed_yards_per_sec)?;
        self.depth_yards = meta.depth_yards;
        self.timing_ms = meta.timing_ms;
        Some(meta)
    }
}

/// `depth = |last.y - first.y|`, `timing = length / speed * 1000`.
pub fn route_metadata(points: &[FieldPos], speed_yards_per_sec: f64) -> Option<RouteMetadata> {
    if points.len() < 2 || speed_yards_per_sec <= 0.0 {
        return None;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    let length_yards: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();

    Some(RouteMetadata {
        depth_yards: (last.y - first.y).abs(),
        timing_ms: (length_yards / speed_yards_per_sec) * 1000.0,
        length_yards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_route_metadata() {
        let points = [FieldPos::new(0.0, 0.0), FieldPos::new(0.0, 10.0), FieldPos::new(0.0, 20.0)];
        let meta = route_metadata(&points, 22.0).unwrap();
        assert_eq!(meta.depth_yards, 20.0);
        assert!((meta.timing_ms - 909.0909).abs() < 1e-3);
        assert_eq!(meta.length_yards, 20.0);
    }

    #[test]
    fn test_depth_ignores_intermediate_points() {
        let points = [FieldPos::new(30.0, 10.0), FieldPos::new(34.0, 13.0), FieldPos::new(30.0, 10.0)];
        let meta = route_metadata(&points, 22.0).unwrap();
        assert_eq!(meta.depth_yards, 0.0);
        assert_eq!(meta.length_yards, 10.0);
    }

    #[test]
    fn test_single_point_has_no_metadata() {
        assert!(route_metadata(&[FieldPos::new(1.0, 1.0)], 22.0).is_none());
        let mut route = Route::start_at(FieldPos::new(1.0, 1.0));
        assert!(route.apply_metadata(22.0).is_none());
        assert_eq!(route.timing_ms, 0.0);
        assert!(route.id.starts_with("route-"));
    }

    #[test]
    fn test_route_json_keys() {
        let mut route = Route::start_at(FieldPos::new(0.0, 0.0));
        route.points.push(FieldPos::new(3.0, 4.0));
        route.apply_metadata(22.0);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["depth"], 4.0);
        assert!(json["timing"].as_f64().unwrap() > 0.0);
    }
}
