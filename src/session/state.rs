use std::sync::Arc;

use image::RgbaImage;

use super::document::{MemoryStore, TextStore};
use super::messages::{Command, CompileMsg, DocumentMsg, Msg, PointerMsg, PropertyMsg, ViewMsg};
use crate::calibration::{self, MarkerFix};
use crate::compile::{
    CompileJob, CompileScheduler, RenderError, RenderedPage, SchedulerAction, has_drawing_block,
};
use crate::config::EditorConfig;
use crate::domain::{HandleRef, ShapeEdit, TextSnapshot};
use crate::extract::extract_snapshot;
use crate::patch::apply_edit;
use crate::properties::{self, Properties, PropertyError};
use crate::surface::{EditingSurface, PressOutcome, SnapSetting};

/// The last render that was adopted
#[derive(Clone, Debug)]
pub struct Frame {
    pub version: u64,
    pub image: Arc<RgbaImage>,
    pub fix: Option<MarkerFix>,
}

/// One editor: text, shapes, surface and compile state in a single value
#[derive(Debug)]
pub struct EditorSession<S: TextStore = MemoryStore> {
    store: S,
    snapshot: TextSnapshot,
    surface: EditingSurface,
    scheduler: CompileScheduler,
    config: EditorConfig,
    frame: Option<Frame>,
    selection: Option<HandleRef>,
    last_error: Option<String>,
}

impl EditorSession<MemoryStore> {
    pub fn with_text(text: impl Into<Arc<str>>, config: EditorConfig) -> Self {
        Self::new(MemoryStore::new(text), config)
    }
}

impl<S: TextStore> EditorSession<S> {
    pub fn new(store: S, config: EditorConfig) -> Self {
        let config = config.normalized();
        let snapshot = store.snapshot();
        let mut surface = EditingSurface::new(config.snap(), config.hit_radius_px);
        surface.set_shapes(extract_snapshot(&snapshot));
        Self {
            store,
            snapshot,
            surface,
            scheduler: CompileScheduler::default(),
            config,
            frame: None,
            selection: None,
            last_error: None,
        }
    }

    pub fn snapshot(&self) -> &TextSnapshot {
        &self.snapshot
    }

    pub fn text(&self) -> &str {
        self.snapshot.text()
    }

    pub fn surface(&self) -> &EditingSurface {
        &self.surface
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn selection(&self) -> Option<HandleRef> {
        self.selection
    }

    /// Geometry and style of the selected shape
    pub fn properties(&self) -> Result<Properties, PropertyError> {
        let selection = self.selection.ok_or(PropertyError::NoSelection)?;
        properties::properties(&self.snapshot, self.surface.shapes(), selection)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_compiling(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn update(&mut self, msg: impl Into<Msg>) -> Vec<Command> {
        match msg.into() {
            Msg::Pointer(msg) => self.on_pointer(msg),
            Msg::View(msg) => self.on_view(msg),
            Msg::Document(msg) => self.on_document(msg),
            Msg::Property(msg) => self.on_property(msg),
            Msg::Compile(msg) => self.on_compile(msg),
            Msg::Settings(config) => self.on_settings(config),
        }
    }

    fn on_pointer(&mut self, msg: PointerMsg) -> Vec<Command> {
        match msg {
            PointerMsg::Press(p) => match self.surface.press(p) {
                PressOutcome::Dragging(handle) if self.selection != Some(handle) => {
                    self.selection = Some(handle);
                    vec![Command::Redraw]
                }
                _ => Vec::new(),
            },
            PointerMsg::Move(p) => {
                if self.surface.pointer_move(p) {
                    vec![Command::Redraw]
                } else {
                    Vec::new()
                }
            }
            PointerMsg::Release(p) => match self.surface.release(p) {
                Some(edit) => self.commit_edit(&edit),
                None => vec![Command::Redraw],
            },
            PointerMsg::Cancel => {
                self.surface.cancel_pointer();
                vec![Command::Redraw]
            }
        }
    }

    fn on_view(&mut self, msg: ViewMsg) -> Vec<Command> {
        let changed = match msg {
            ViewMsg::Wheel(notches) => self.surface.wheel(notches),
            ViewMsg::Resized(w, h) => {
                self.surface.set_widget_size(w, h);
                true
            }
            ViewMsg::Reset => {
                self.surface.reset_view();
                true
            }
        };
        if changed { vec![Command::Redraw] } else { Vec::new() }
    }

    fn on_document(&mut self, msg: DocumentMsg) -> Vec<Command> {
        match msg {
            DocumentMsg::Replaced(text) => {
                if text == self.snapshot.text() {
                    return Vec::new();
                }
                let snapshot = self.store.replace(text);
                self.adopt_snapshot(snapshot);
                vec![Command::CompileAfter {
                    version: self.snapshot.version(),
                    delay: self.config.auto_compile_delay(),
                }]
            }
            DocumentMsg::Undo => match self.store.undo() {
                Some(snapshot) => {
                    self.adopt_snapshot(snapshot);
                    self.request_compile(false)
                }
                None => Vec::new(),
            },
            DocumentMsg::Redo => match self.store.redo() {
                Some(snapshot) => {
                    self.adopt_snapshot(snapshot);
                    self.request_compile(false)
                }
                None => Vec::new(),
            },
        }
    }

    fn on_property(&mut self, msg: PropertyMsg) -> Vec<Command> {
        let applied = match msg {
            PropertyMsg::Select(selection) => {
                if let Some(handle) = selection
                    && self.surface.shapes().get(handle.kind, handle.index).is_none()
                {
                    return vec![Command::Log(PropertyError::MissingShape(handle).to_string())];
                }
                self.selection = selection;
                return vec![Command::Redraw];
            }
            PropertyMsg::ApplyGeometry(values) => self.selection.ok_or(PropertyError::NoSelection).and_then(|handle| {
                properties::apply_geometry(&self.snapshot, self.surface.shapes(), handle, values)
            }),
            PropertyMsg::ApplyStyle(style) => self.selection.ok_or(PropertyError::NoSelection).and_then(|handle| {
                properties::apply_style(&self.snapshot, self.surface.shapes(), handle, &style)
            }),
        };
        match applied {
            Ok(text) if text == self.snapshot.text() => Vec::new(),
            Ok(text) => {
                let snapshot = self.store.replace(text);
                self.adopt_snapshot(snapshot);
                let mut commands = vec![Command::Redraw];
                commands.extend(self.request_compile(true));
                commands
            }
            Err(err) => {
                log::warn!("Rejected property edit: {err}");
                vec![Command::Log(format!("Property edit discarded: {err}"))]
            }
        }
    }

    fn on_compile(&mut self, msg: CompileMsg) -> Vec<Command> {
        match msg {
            CompileMsg::Requested => self.request_compile(false),
            CompileMsg::Due(version) if version == self.snapshot.version() => self.request_compile(false),
            CompileMsg::Due(version) => {
                log::debug!("[Compile] debounce for v{version} superseded");
                Vec::new()
            }
            CompileMsg::Finished { version, result } => self.on_render_finished(version, result),
        }
    }

    fn on_settings(&mut self, config: EditorConfig) -> Vec<Command> {
        let config = config.normalized();
        let grid_changed = config.grid() != self.config.grid();
        self.surface.set_snap(SnapSetting::from_mm(config.snap_mm));
        self.surface.set_hit_radius(config.hit_radius_px);
        self.config = config;

        let mut commands = vec![Command::Log(format!(
            "Grid/Snap step: {}",
            if self.config.snap_mm == 0 {
                "free".to_string()
            } else {
                format!("{} mm", self.config.snap_mm)
            }
        ))];
        if grid_changed {
            commands.extend(self.request_compile(true));
        }
        commands
    }

    /// Replace the current snapshot and rescan it
    ///
    /// The selection is kept by kind and index while that index still exists.
    fn adopt_snapshot(&mut self, snapshot: TextSnapshot) {
        self.snapshot = snapshot;
        self.surface.set_shapes(extract_snapshot(&self.snapshot));
        if let Some(handle) = self.selection
            && self.surface.shapes().get(handle.kind, handle.index).is_none()
        {
            log::debug!("selection {handle} dropped");
            self.selection = None;
        }
    }

    fn commit_edit(&mut self, edit: &ShapeEdit) -> Vec<Command> {
        match apply_edit(&self.snapshot, self.surface.shapes(), edit) {
            Ok(text) => {
                let snapshot = self.store.replace(text);
                self.adopt_snapshot(snapshot);
                let mut commands = vec![Command::Redraw];
                commands.extend(self.request_compile(false));
                commands
            }
            Err(err) => {
                log::warn!("Rejected edit {}: {err}", edit.handle);
                // Spans were stale; rescan instead of retrying them
                self.surface.set_shapes(extract_snapshot(&self.snapshot));
                vec![Command::Log(format!("Edit discarded: {err}")), Command::Redraw]
            }
        }
    }

    fn request_compile(&mut self, cancel_running: bool) -> Vec<Command> {
        let job = CompileJob {
            version: self.snapshot.version(),
            source: crate::compile::prepare_for_render(self.snapshot.text(), self.config.grid()),
        };
        self.scheduler
            .request(job, cancel_running)
            .into_iter()
            .map(|action| match action {
                SchedulerAction::Start(job) => Command::StartCompile(job),
                SchedulerAction::CancelRunning => Command::CancelCompile,
            })
            .collect()
    }

    fn on_render_finished(
        &mut self,
        version: u64,
        result: Result<RenderedPage, RenderError>,
    ) -> Vec<Command> {
        let next = self.scheduler.finished(version);
        let mut commands = Vec::new();

        match result {
            Ok(page) if version == self.snapshot.version() => {
                self.adopt_page(version, page);
                self.last_error = None;
                commands.push(Command::Redraw);
            }
            Ok(_) => log::debug!("[Compile] discarding render of v{version}, text is at v{}", self.snapshot.version()),
            Err(RenderError::Cancelled) => log::debug!("[Compile] v{version} cancelled"),
            Err(err) => {
                // Previous frame and basis stay usable
                log::warn!("[Compile] v{version} failed: {err}");
                if let Some(tool_log) = err.log() {
                    log::debug!("{tool_log}");
                }
                commands.push(Command::Log(format!("Compile failed: {err}")));
                self.last_error = Some(err.to_string());
            }
        }

        if let Some(job) = next {
            commands.push(Command::StartCompile(job));
        }
        commands
    }

    fn adopt_page(&mut self, version: u64, page: RenderedPage) {
        let (width, height) = page.size();
        if width == 0 || height == 0 {
            log::warn!("[Compile] v{version} produced an empty image");
            self.surface.clear_render();
            self.frame = None;
            return;
        }
        let fix = if !has_drawing_block(self.snapshot.text()) {
            // No markers were injected, so colored pixels are user content
            log::info!("[Calib] no tikzpicture block, handles hidden");
            None
        } else {
            self.find_fix(&page.image)
        };
        self.surface.set_render(page.size(), fix);
        let basis = self.surface.basis();
        if basis.is_valid() {
            log::info!("[Calib] det={:.2} OK", basis.det());
        } else if fix.is_some() {
            log::warn!("[Calib] INVALID");
        }
        self.frame = Some(Frame {
            version,
            image: Arc::new(page.image),
            fix,
        });
    }

    fn find_fix(&self, image: &RgbaImage) -> Option<MarkerFix> {
        match calibration::find_markers(image) {
            Ok(fix) => {
                log::info!(
                    "[Calib] R=({:.1},{:.1}) G=({:.1},{:.1}) B=({:.1},{:.1}) image px",
                    fix.origin.x,
                    fix.origin.y,
                    fix.x_axis.x,
                    fix.x_axis.y,
                    fix.y_axis.x,
                    fix.y_axis.y
                );
                Some(fix)
            }
            Err(err) => {
                log::warn!("[Calib] {err}");
                None
            }
        }
    }
}
