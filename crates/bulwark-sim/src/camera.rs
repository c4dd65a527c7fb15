//! Camera transform between screen pixels and map space.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use bulwark_core::constants::{TILE_SIZE, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
use bulwark_core::state::CameraView;
use bulwark_core::types::GridSize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen position of the map origin in pixels.
    pub offset: DVec2,
    pub zoom: f64,
    /// Pointer position at the previous frame of a middle-button drag.
    drag_from: Option<DVec2>,
}

impl Camera {
    /// A camera showing the map centered in `viewport` at zoom 1.
    pub fn centered(size: GridSize, viewport: DVec2) -> Self {
        let map_px = DVec2::new(size.width as f64, size.height as f64) * TILE_SIZE;
        Self {
            offset: (viewport - map_px) / 2.0,
            zoom: 1.0,
            drag_from: None,
        }
    }

    fn scale(&self) -> f64 {
        TILE_SIZE * self.zoom
    }

    pub fn screen_to_map(&self, screen: DVec2) -> DVec2 {
        (screen - self.offset) / self.scale()
    }

    pub fn map_to_screen(&self, pos: DVec2) -> DVec2 {
        pos * self.scale() + self.offset
    }

    pub fn pan(&mut self, delta: DVec2) {
        self.offset += delta;
    }

    /// Track a middle-button drag; the map follows the pointer.
    pub fn drag(&mut self, pointer: DVec2, held: bool) {
        if !held {
            self.drag_from = None;
            return;
        }
        if let Some(from) = self.drag_from {
            self.pan(pointer - from);
        }
        self.drag_from = Some(pointer);
    }

    /// Zoom by `notches` wheel steps, keeping the map point under `anchor` fixed.
    pub fn zoom_at(&mut self, notches: f64, anchor: DVec2) {
        if notches == 0.0 {
            return;
        }
        let pinned = self.screen_to_map(anchor);
        self.zoom = (self.zoom + notches * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        self.offset = anchor - pinned * self.scale();
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            offset: self.offset,
            zoom: self.zoom,
        }
    }
}
