//! World-to-viewport projection
//!
//! Every overlay primitive is positioned by pushing a world point through
//! the frame's view and projection matrices, dividing by `w`, and mapping
//! normalized device coordinates onto the pixel grid. Camera pose changes
//! continuously, so projections are recomputed for every frame and never
//! cached.

use crate::core::{ScreenPoint, Viewport, CLIP_W_EPSILON};
use crate::session::TrackingFrame;
use nalgebra::{Matrix4, Point3, Vector4};

/// View and projection matrices captured from a single tracking frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Matrix4<f64>,
    pub projection: Matrix4<f64>,
}

impl CameraMatrices {
    pub fn new(view: Matrix4<f64>, projection: Matrix4<f64>) -> Self {
        Self { view, projection }
    }

    /// Read both matrices from a frame using the given clip planes
    pub fn from_frame<F: TrackingFrame + ?Sized>(frame: &F, near: f64, far: f64) -> Self {
        Self {
            view: frame.view_matrix(),
            projection: frame.projection_matrix(near, far),
        }
    }

    /// Transform a world point into homogeneous clip space
    pub fn to_clip(&self, world: &Point3<f64>) -> Vector4<f64> {
        self.projection * (self.view * world.to_homogeneous())
    }
}

/// Maps world coordinates to viewport pixels
pub struct Projector;

impl Projector {
    /// Project `world` onto the viewport.
    ///
    /// Returns `None` when the point is not visible: `w` is (near) zero,
    /// the point is behind the camera (`w < 0`), it lies beyond the clip
    /// range (`z > w`), or the arithmetic produced a non-finite value.
    /// Points inside the depth range but outside the screen edges are
    /// returned as-is; clipping is the renderer's job.
    pub fn project(
        matrices: &CameraMatrices,
        world: &Point3<f64>,
        viewport: Viewport,
    ) -> Option<ScreenPoint> {
        if viewport.is_empty() {
            return None;
        }

        let clip = matrices.to_clip(world);
        let (x, y, z, w) = (clip.x, clip.y, clip.z, clip.w);

        if !(x.is_finite() && y.is_finite() && z.is_finite() && w.is_finite()) {
            return None;
        }
        if w.abs() < CLIP_W_EPSILON || w < 0.0 || z > w {
            return None;
        }

        let ndc_x = x / w;
        let ndc_y = y / w;

        let width = viewport.width as f64;
        let height = viewport.height as f64;
        // NDC is Y-up, the surface is Y-down
        let screen_x = (ndc_x * 0.5 + 0.5) * width;
        let screen_y = (1.0 - (ndc_y * 0.5 + 0.5)) * height;

        Some(ScreenPoint::new(screen_x, screen_y))
    }

    /// Project straight from a frame, reading its matrices first
    pub fn project_frame<F: TrackingFrame + ?Sized>(
        frame: &F,
        near: f64,
        far: f64,
        world: &Point3<f64>,
        viewport: Viewport,
    ) -> Option<ScreenPoint> {
        Self::project(&CameraMatrices::from_frame(frame, near, far), world, viewport)
    }
}
