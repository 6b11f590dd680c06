//! Interactive editing surface
//!
//! Owns everything a pointer session touches: the latest shape set, the
//! marker fix of the latest successful render, the current basis, the view
//! and the pointer state. Hosts feed it pointer events and get back at most
//! one [`ShapeEdit`] per completed drag.

pub mod drag;
pub mod handles;
pub mod snap;
pub mod view;

pub use drag::{DragSession, PointerState};
pub use handles::{Handle, all_handles, hit_test};
pub use snap::{MIN_RADIUS, SnapSetting};
pub use view::View;

use std::borrow::Cow;

use crate::calibration::{CalibrationBasis, MarkerFix};
use crate::domain::{HandleRef, Rect, ScreenPoint, ShapeEdit, ShapeSet};

/// Default handle hit radius in screen pixels
pub const DEFAULT_HIT_RADIUS: f64 = 10.0;

/// What a press turned into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    Dragging(HandleRef),
    Panning,
}

#[derive(Clone, Debug)]
pub struct EditingSurface {
    shapes: ShapeSet,
    fix: Option<MarkerFix>,
    page_size: Option<(u32, u32)>,
    widget_size: (u32, u32),
    basis: CalibrationBasis,
    view: View,
    snap: SnapSetting,
    hit_radius: f64,
    state: PointerState,
}

impl Default for EditingSurface {
    fn default() -> Self {
        Self::new(SnapSetting::from_mm(10), DEFAULT_HIT_RADIUS)
    }
}

impl EditingSurface {
    pub fn new(snap: SnapSetting, hit_radius: f64) -> Self {
        Self {
            shapes: ShapeSet::default(),
            fix: None,
            page_size: None,
            widget_size: (0, 0),
            basis: CalibrationBasis::invalid(),
            view: View::default(),
            snap,
            hit_radius,
            state: PointerState::Idle,
        }
    }

    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    pub fn basis(&self) -> &CalibrationBasis {
        &self.basis
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn snap(&self) -> SnapSetting {
        self.snap
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::DraggingHandle(_))
    }

    /// Shapes with the in-progress drag applied, for drawing
    pub fn display_shapes(&self) -> Cow<'_, ShapeSet> {
        match &self.state {
            PointerState::DraggingHandle(drag) if drag.version == self.shapes.version => {
                let mut shapes = self.shapes.clone();
                shapes.set(drag.handle.index, drag.current());
                Cow::Owned(shapes)
            }
            _ => Cow::Borrowed(&self.shapes),
        }
    }

    /// Adopt a freshly extracted shape set
    pub fn set_shapes(&mut self, shapes: ShapeSet) {
        self.shapes = shapes;
    }

    pub fn set_snap(&mut self, snap: SnapSetting) {
        self.snap = snap;
    }

    pub fn set_hit_radius(&mut self, radius: f64) {
        self.hit_radius = radius;
    }

    pub fn set_widget_size(&mut self, width: u32, height: u32) {
        self.widget_size = (width, height);
        self.reproject();
    }

    /// A render landed: `fix` is `None` when the markers were not found
    pub fn set_render(&mut self, page_size: (u32, u32), fix: Option<MarkerFix>) {
        self.page_size = Some(page_size);
        self.fix = fix;
        self.reproject();
    }

    /// No image any more; handles hide, drags in progress keep their basis
    pub fn clear_render(&mut self) {
        self.page_size = None;
        self.fix = None;
        self.basis = CalibrationBasis::invalid();
    }

    /// Where the page is drawn inside the widget
    pub fn target_rect(&self) -> Option<Rect> {
        if self.widget_size.0 == 0 || self.widget_size.1 == 0 {
            return None;
        }
        let rect = self.view.target_rect(self.widget_size, self.page_size?);
        rect.is_valid().then_some(rect)
    }

    fn reproject(&mut self) {
        self.basis = match (self.fix, self.target_rect()) {
            (Some(fix), Some(rect)) => fix.project(rect).unwrap_or_else(|err| {
                log::warn!("[Calib] {err}");
                CalibrationBasis::invalid()
            }),
            _ => CalibrationBasis::invalid(),
        };
    }

    /// Handle under the pointer, if calibration is valid
    pub fn handle_at(&self, pointer: ScreenPoint) -> Option<HandleRef> {
        hit_test(&self.shapes, &self.basis, pointer, self.hit_radius)
    }

    pub fn press(&mut self, pointer: ScreenPoint) -> PressOutcome {
        let drag = self.handle_at(pointer).and_then(|handle| {
            let record = self.shapes.get(handle.kind, handle.index)?;
            DragSession::start(handle, record, self.shapes.version, self.basis)
        });
        match drag {
            Some(drag) => {
                let handle = drag.handle;
                log::debug!("drag start {handle}");
                self.state = PointerState::DraggingHandle(drag);
                PressOutcome::Dragging(handle)
            }
            None => {
                self.state = PointerState::Panning { last: pointer };
                PressOutcome::Panning
            }
        }
    }

    /// Returns whether anything visible changed
    pub fn pointer_move(&mut self, pointer: ScreenPoint) -> bool {
        match &mut self.state {
            PointerState::Idle => false,
            PointerState::Panning { last } => {
                let delta = pointer - *last;
                *last = pointer;
                self.view.pan_by(delta.x, delta.y);
                self.reproject();
                true
            }
            PointerState::DraggingHandle(drag) => drag.update(pointer, &self.basis, self.snap),
        }
    }

    /// Ends the pointer session; a drag that moved yields its edit
    ///
    /// The release position itself is not applied: the edit carries the
    /// geometry of the last move.
    pub fn release(&mut self, pointer: ScreenPoint) -> Option<ShapeEdit> {
        log::trace!("release at {pointer:?}");
        match std::mem::take(&mut self.state) {
            PointerState::DraggingHandle(drag) => {
                let edit = drag.finish();
                if let Some(edit) = &edit {
                    log::debug!("drag end {} -> {:?}", edit.handle, edit.values);
                }
                edit
            }
            PointerState::Idle | PointerState::Panning { .. } => None,
        }
    }

    /// Drop an in-progress drag without emitting anything
    pub fn cancel_pointer(&mut self) {
        self.state = PointerState::Idle;
    }

    /// Wheel zoom in notches; returns whether the zoom changed
    pub fn wheel(&mut self, notches: f64) -> bool {
        let changed = self.view.zoom_by(notches);
        if changed {
            self.reproject();
        }
        changed
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
        self.reproject();
    }
}
