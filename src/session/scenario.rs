//! Scripted sessions for replaying against the mock
//!
//! A scenario is a JSON list of steps. Each step positions the camera,
//! scripts the hit-test results under the crosshair, optionally refines
//! anchor poses, and issues UI commands. Replaying it feeds each step's
//! frame to the engine and records the resulting status and overlay.

use crate::api::types::{CommandOutcome, EngineCommand, EngineStatus};
use crate::core::{Pose, Viewport};
use crate::measurement::{MeasurementEngine, RenderCommand};
use crate::session::{AnchorId, HitResult, HitTarget, MockFrame, MockSession, TrackingState};
use crate::validation::{EngineError, EngineResult};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_fov_y_deg() -> f64 {
    60.0
}

/// Camera placement for one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub eye: [f64; 3],
    pub target: [f64; 3],
}

/// A hit-test result the mock frame reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedHit {
    pub position: [f64; 3],
    pub target: HitTarget,
    #[serde(default)]
    pub distance_m: f64,
}

impl ScriptedHit {
    fn to_hit(self) -> HitResult {
        let [x, y, z] = self.position;
        HitResult::new(Pose::from_position(x, y, z), self.distance_m, self.target)
    }
}

/// Tracker refinement of an existing anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorRefinement {
    pub anchor: AnchorId,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub camera: CameraPlacement,
    #[serde(default)]
    pub tracking: TrackingState,
    #[serde(default)]
    pub hits: Vec<ScriptedHit>,
    #[serde(default)]
    pub refine: Vec<AnchorRefinement>,
    #[serde(default)]
    pub commands: Vec<EngineCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub viewport: Viewport,
    #[serde(default = "default_fov_y_deg")]
    pub fov_y_deg: f64,
    pub steps: Vec<ScenarioStep>,
}

/// What the engine reported after one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: usize,
    pub outcomes: Vec<CommandOutcome>,
    /// Commands the engine refused, as `(command index, message)`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<(usize, String)>,
    pub status: EngineStatus,
    pub render: Vec<RenderCommand>,
}

impl Scenario {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(&path).map_err(|source| EngineError::ScenarioIo {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Mock frame for a step
    pub fn frame(&self, step: &ScenarioStep) -> MockFrame {
        let aspect = if self.viewport.height == 0 {
            1.0
        } else {
            self.viewport.width as f64 / self.viewport.height as f64
        };
        MockFrame::looking_at(
            Point3::from(step.camera.eye),
            Point3::from(step.camera.target),
            self.fov_y_deg,
            aspect,
        )
        .with_tracking_state(step.tracking)
        .with_hits(step.hits.iter().map(|h| h.to_hit()).collect())
    }

    /// Run every step against `engine` and `session`. A refused command
    /// is recorded in its step's report and the replay carries on.
    pub fn replay(&self, engine: &mut MeasurementEngine, session: &mut MockSession) -> Vec<StepReport> {
        let mut reports = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            for refinement in &step.refine {
                let [x, y, z] = refinement.position;
                if !session.set_anchor_pose(refinement.anchor, Pose::from_position(x, y, z)) {
                    log::warn!("step {}: cannot refine {}, not live", index, refinement.anchor);
                }
            }

            engine.update_frame(&self.frame(step), self.viewport);

            let mut outcomes = Vec::with_capacity(step.commands.len());
            let mut errors = Vec::new();
            for (position, command) in step.commands.iter().enumerate() {
                match engine.handle(*command, session) {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => {
                        log::warn!("step {}: command {} refused: {}", index, position, e);
                        errors.push((position, e.to_string()));
                    }
                }
            }

            reports.push(StepReport {
                step: index,
                outcomes,
                errors,
                status: engine.status(),
                render: engine.renderables(&*session, self.viewport),
            });
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ConfirmOutcome;
    use crate::api::UnitSystem;
    use std::io::Write;

    const SCRIPT: &str = r#"{
        "viewport": { "width": 1080, "height": 2160 },
        "steps": [
            {
                "camera": { "eye": [0.0, 0.0, 0.0], "target": [0.0, 0.0, -1.0] },
                "hits": [
                    { "position": [0.0, 0.0, -1.0], "target": { "kind": "plane", "within_polygon": true }, "distance_m": 1.0 }
                ],
                "commands": [ { "command": "confirm" } ]
            },
            {
                "camera": { "eye": [0.0, 0.0, 0.0], "target": [0.0, 0.0, -1.0] },
                "hits": [
                    { "position": [0.2, 0.0, -1.0], "target": { "kind": "other" }, "distance_m": 0.9 },
                    { "position": [0.2, 0.0, -1.0], "target": { "kind": "feature_point", "has_surface_normal": true }, "distance_m": 1.0 }
                ],
                "commands": [ { "command": "confirm" }, { "command": "toggle_units" } ]
            },
            {
                "camera": { "eye": [0.0, 0.0, 0.0], "target": [0.0, 0.0, -1.0] },
                "tracking": "lost",
                "refine": [ { "anchor": 2, "position": [0.3048, 0.0, -1.0] } ],
                "commands": [ { "command": "confirm" } ]
            }
        ]
    }"#;

    #[test]
    fn test_replay_script() {
        let scenario = Scenario::from_json(SCRIPT).unwrap();
        assert_eq!(scenario.fov_y_deg, 60.0);

        let mut engine = MeasurementEngine::default();
        let mut session = MockSession::new();
        let reports = scenario.replay(&mut engine, &mut session);
        assert_eq!(reports.len(), 3);

        assert_eq!(
            reports[0].outcomes,
            vec![CommandOutcome::Confirm(ConfirmOutcome::MeasurementStarted)]
        );
        assert!(matches!(
            reports[1].outcomes[0],
            CommandOutcome::Confirm(ConfirmOutcome::MeasurementCompleted { .. })
        ));
        assert_eq!(reports[1].status.unit_system, UnitSystem::Imperial);
        assert_eq!(reports[1].status.last_measurement.as_deref(), Some("7.9\""));

        // tracking lost: confirm ignored, history intact
        assert!(matches!(
            reports[2].outcomes[0],
            CommandOutcome::Confirm(ConfirmOutcome::Ignored { .. })
        ));
        assert!(!reports[2].status.hit_valid);
        assert_eq!(reports[2].status.measurement_count, 1);
        // the raw distance was frozen, the overlay follows the refined anchor
        assert_eq!(reports[2].status.last_measurement.as_deref(), Some("7.9\""));
        assert_eq!(reports[2].render.len(), 4);
    }

    #[test]
    fn test_refused_command_does_not_stop_replay() {
        let script = r#"{
            "viewport": { "width": 1080, "height": 2160 },
            "steps": [
                {
                    "camera": { "eye": [0.0, 0.0, 0.0], "target": [0.0, 0.0, -1.0] },
                    "hits": [ { "position": [0.0, 0.0, -1.0], "target": { "kind": "plane", "within_polygon": true } } ],
                    "commands": [ { "command": "confirm" } ]
                },
                {
                    "camera": { "eye": [0.0, 0.0, 0.0], "target": [0.0, 0.0, -1.0] },
                    "hits": [ { "position": [0.1, 0.0, -1.0], "target": { "kind": "plane", "within_polygon": true } } ],
                    "commands": [
                        { "command": "start_calibration", "known_reference_m": -0.1 },
                        { "command": "confirm" }
                    ]
                },
                {
                    "camera": { "eye": [0.0, 0.0, 0.0], "target": [0.0, 0.0, -1.0] },
                    "commands": [ { "command": "toggle_units" } ]
                }
            ]
        }"#;
        let scenario = Scenario::from_json(script).unwrap();
        let mut engine = MeasurementEngine::default();
        let mut session = MockSession::new();

        let reports = scenario.replay(&mut engine, &mut session);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].errors.is_empty());

        assert_eq!(reports[1].errors.len(), 1);
        assert_eq!(reports[1].errors[0].0, 0);
        assert!(matches!(
            reports[1].outcomes[..],
            [CommandOutcome::Confirm(ConfirmOutcome::MeasurementCompleted { .. })]
        ));
        assert_eq!(reports[2].status.unit_system, UnitSystem::Imperial);
        assert_eq!(reports[2].status.measurement_count, 1);

        let json = serde_json::to_value(&reports[0]).unwrap();
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.steps[2].tracking, TrackingState::Lost);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            Scenario::load("/nonexistent/scenario.json"),
            Err(EngineError::ScenarioIo { .. })
        ));
        assert!(matches!(
            Scenario::from_json("{ \"steps\": 3 }"),
            Err(EngineError::ScenarioFormat(_))
        ));
    }
}
