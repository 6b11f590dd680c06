use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::calibration::MarkerFix;
use crate::compile::{LatexRenderer, Renderer};
use crate::config::EditorConfig;
use crate::domain::{HandleRef, Rect, ScreenPoint, ShapeEdit, TextSnapshot, WorldPoint};
use crate::error::Error;
use crate::extract::extract_snapshot;
use crate::patch::apply_edit;
use crate::properties::{Properties, properties};
use crate::render::draw_handles;
use crate::samples;
use crate::session::{Command, CompileMsg, EditorSession, TextStore};
use crate::surface::all_handles;
use crate::surface::drag::{dragged, edit_values};

const USAGE: &str = "\
usage: tikzdrag [-v] <command>

commands:
  handles <file.tex> [--overlay <out.png>]   compile, calibrate and list handle positions
  drag <file.tex> <kind:index[:sub]> <x>,<y> move one handle and rewrite the file
  props <file.tex> <kind:index[:sub]>         print geometry and style of one shape
  example <name>                             print a built-in example document";

/// One parsed command line
#[derive(Clone, Debug, PartialEq)]
pub enum Cli {
    Handles {
        path: PathBuf,
        overlay: Option<PathBuf>,
    },
    Drag {
        path: PathBuf,
        handle: HandleRef,
        to: WorldPoint,
    },
    Props {
        path: PathBuf,
        handle: HandleRef,
    },
    Example {
        name: String,
    },
    Help,
}

impl Cli {
    /// Parse arguments (without the program name); returns the command and
    /// whether `-v` was given
    pub fn parse<I>(args: I) -> Result<(Self, bool)>
    where
        I: IntoIterator<Item = String>,
    {
        let mut verbose = false;
        let mut words = Vec::new();
        for arg in args {
            match arg.as_str() {
                "-v" | "--verbose" => verbose = true,
                "-h" | "--help" => return Ok((Cli::Help, verbose)),
                _ => words.push(arg),
            }
        }

        let mut words = words.into_iter();
        let cli = match words.next().as_deref() {
            None | Some("help") => Cli::Help,
            Some("handles") => {
                let path = words.next().context("handles: missing <file.tex>")?;
                let overlay = match words.next().as_deref() {
                    None => None,
                    Some("--overlay") => Some(PathBuf::from(
                        words.next().context("--overlay: missing output path")?,
                    )),
                    Some(other) => bail!("handles: unexpected argument '{other}'"),
                };
                Cli::Handles {
                    path: path.into(),
                    overlay,
                }
            }
            Some("drag") => {
                let path = words.next().context("drag: missing <file.tex>")?;
                let arg = words.next().context("drag: missing <kind:index[:sub]>")?;
                let handle = HandleRef::parse(&arg).ok_or(Error::UnknownHandle(arg))?;
                let target = words.next().context("drag: missing <x>,<y>")?;
                let to = parse_point(&target)?;
                Cli::Drag {
                    path: path.into(),
                    handle,
                    to,
                }
            }
            Some("props") => {
                let path = words.next().context("props: missing <file.tex>")?;
                let arg = words.next().context("props: missing <kind:index[:sub]>")?;
                let handle = HandleRef::parse(&arg).ok_or(Error::UnknownHandle(arg))?;
                Cli::Props {
                    path: path.into(),
                    handle,
                }
            }
            Some("example") => Cli::Example {
                name: words.next().context("example: missing <name>")?,
            },
            Some(other) => bail!("unknown command '{other}'\n\n{USAGE}"),
        };
        if let Some(extra) = words.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok((cli, verbose))
    }
}

/// `x,y` in document units
fn parse_point(text: &str) -> Result<WorldPoint> {
    let (x, y) = text
        .split_once(',')
        .with_context(|| format!("expected <x>,<y>, got '{text}'"))?;
    let parse = |s: &str| -> Result<f64> {
        let value: f64 = s.trim().parse().with_context(|| format!("not a number: '{s}'"))?;
        if !value.is_finite() {
            bail!("not a finite number: '{s}'");
        }
        Ok(value)
    };
    Ok(WorldPoint::new(parse(x)?, parse(y)?))
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli {
        Cli::Help => {
            println!("{USAGE}");
            println!("\nexamples: {}", samples::example_names().collect::<Vec<_>>().join(", "));
            Ok(())
        }
        Cli::Example { name } => {
            print!("{}", samples::example(&name)?);
            Ok(())
        }
        Cli::Handles { path, overlay } => {
            let config = EditorConfig::load();
            let renderer = LatexRenderer::new((&config).into())?;
            let report = handles(&path, overlay.as_deref(), config, &renderer).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Cli::Props { path, handle } => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let props = props_text(&text, handle)?;
            println!("{}", serde_json::to_string_pretty(&props)?);
            Ok(())
        }
        Cli::Drag { path, handle, to } => {
            let config = EditorConfig::load();
            let edit = drag_file(&path, handle, to, &config).await?;
            log::info!("Wrote {} ({edit:?})", path.display());
            Ok(())
        }
    }
}

/// Handle position in document units and in raster pixels
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HandleReport {
    pub handle: String,
    pub at: WorldPoint,
    pub pixel: ScreenPoint,
}

/// Compile `path`, calibrate against the render and report every handle
pub async fn handles(
    path: &Path,
    overlay: Option<&Path>,
    config: EditorConfig,
    renderer: &dyn Renderer,
) -> Result<Vec<HandleReport>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut session = EditorSession::with_text(text, config);
    let commands = session.update(CompileMsg::Requested);
    settle(&mut session, renderer, commands).await;

    let Some(frame) = session.frame() else {
        bail!(
            "no render available: {}",
            session.last_error().unwrap_or("compile did not finish")
        );
    };
    let Some(fix) = frame.fix else {
        bail!("calibration markers not found in the render");
    };
    let basis = image_basis(&fix)?;
    let shapes = session.surface().shapes();

    let report = all_handles(shapes)
        .into_iter()
        .map(|h| HandleReport {
            handle: h.handle.to_string(),
            at: h.at,
            pixel: basis.world_to_screen(h.at),
        })
        .collect();

    if let Some(out) = overlay {
        let mut image = (*frame.image).clone();
        let drawn = draw_handles(&mut image, shapes, &basis);
        image
            .save(out)
            .with_context(|| format!("Failed to write overlay: {}", out.display()))?;
        log::info!("Overlay with {drawn} handles saved to {}", out.display());
    }
    Ok(report)
}

/// Basis in the raster's own pixel space
fn image_basis(fix: &MarkerFix) -> Result<crate::calibration::CalibrationBasis> {
    let rect = Rect::from_origin_size(0, 0, fix.image_width as i32, fix.image_height as i32);
    Ok(fix.project(rect)?)
}

/// Drag one handle of the file at `path` to `to` and write the result back
pub async fn drag_file(
    path: &Path,
    handle: HandleRef,
    to: WorldPoint,
    config: &EditorConfig,
) -> Result<ShapeEdit> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (patched, edit) = drag_text(&text, handle, to, config)?;
    tokio::fs::write(path, patched)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(edit)
}

/// Apply a drag of `handle` to `to` on `text` without a render
pub fn drag_text(
    text: &str,
    handle: HandleRef,
    to: WorldPoint,
    config: &EditorConfig,
) -> Result<(String, ShapeEdit)> {
    let snapshot = TextSnapshot::new(0, text);
    let shapes = extract_snapshot(&snapshot);
    let record = shapes
        .get(handle.kind, handle.index)
        .ok_or_else(|| Error::UnknownHandle(handle.to_string()))?;
    let moved = dragged(record, handle.sub, to, config.snap());
    let values = edit_values(&moved, handle.sub).ok_or_else(|| Error::UnknownHandle(handle.to_string()))?;
    let edit = ShapeEdit {
        handle,
        version: shapes.version,
        values,
    };
    let patched = apply_edit(&snapshot, &shapes, &edit).map_err(Error::from)?;
    Ok((patched, edit))
}

/// Geometry and style of one shape of `text`
pub fn props_text(text: &str, handle: HandleRef) -> Result<Properties> {
    let snapshot = TextSnapshot::new(0, text);
    let shapes = extract_snapshot(&snapshot);
    Ok(properties(&snapshot, &shapes, handle).map_err(Error::from)?)
}

/// Run session commands to completion against `renderer`
///
/// Without a user typing there is nothing to coalesce, so debounced compiles
/// fire immediately. Returns the log lines the session emitted.
pub async fn settle<S: TextStore>(
    session: &mut EditorSession<S>,
    renderer: &dyn Renderer,
    commands: Vec<Command>,
) -> Vec<String> {
    let mut queue: VecDeque<Command> = commands.into();
    let mut lines = Vec::new();
    while let Some(command) = queue.pop_front() {
        match command {
            Command::StartCompile(job) => {
                log::debug!("[Compile] v{} started", job.version);
                let result = renderer.submit(job.source).await;
                queue.extend(session.update(CompileMsg::Finished {
                    version: job.version,
                    result,
                }));
            }
            Command::CancelCompile => renderer.cancel(),
            Command::CompileAfter { version, .. } => {
                queue.extend(session.update(CompileMsg::Due(version)));
            }
            Command::Log(line) => {
                log::info!("{line}");
                lines.push(line);
            }
            Command::Redraw => {}
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::fake::{FakeRenderer, page_point};
    use crate::compile::wrap_tikz_document;
    use crate::domain::{ShapeKind, SubHandle};
    use crate::session::DocumentMsg;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Cli::parse(args("-v handles fig.tex --overlay out.png")).unwrap(),
            (
                Cli::Handles {
                    path: "fig.tex".into(),
                    overlay: Some("out.png".into()),
                },
                true
            )
        );
        assert_eq!(
            Cli::parse(args("drag fig.tex curve:0:c2 1.5,-2")).unwrap().0,
            Cli::Drag {
                path: "fig.tex".into(),
                handle: HandleRef::new(ShapeKind::CubicCurve, 0, Some(SubHandle::Control2)),
                to: WorldPoint::new(1.5, -2.0),
            }
        );
        assert_eq!(Cli::parse(Vec::new()).unwrap().0, Cli::Help);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Cli::parse(args("drag fig.tex ellipse:0 1,1")).is_err());
        assert!(Cli::parse(args("drag fig.tex point:0 1;1")).is_err());
        assert!(Cli::parse(args("drag fig.tex point:0 inf,1")).is_err());
        assert!(Cli::parse(args("handles")).is_err());
        assert!(Cli::parse(args("example line extra")).is_err());
        assert!(Cli::parse(args("render fig.tex")).is_err());
    }

    #[test]
    fn test_drag_text_snaps_and_patches() {
        let text = wrap_tikz_document("  \\draw (0,0) circle (1.5);\n");
        let handle = HandleRef::new(ShapeKind::Circle, 0, None);
        let (patched, edit) = drag_text(&text, handle, WorldPoint::new(2.26, 0.0), &EditorConfig::default()).unwrap();
        assert!(matches!(edit.values, crate::domain::EditValues::Radius(r) if (r - 2.3).abs() < 1e-9));
        assert!(patched.contains("(0,0) circle (2.3);"), "{patched}");
    }

    #[test]
    fn test_drag_text_unknown_index() {
        let text = wrap_tikz_document("  \\draw (0,0) circle (1.5);\n");
        let handle = HandleRef::new(ShapeKind::Circle, 3, None);
        let err = drag_text(&text, handle, WorldPoint::new(1.0, 0.0), &EditorConfig::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownHandle(_))));
    }

    #[tokio::test]
    async fn test_drag_file_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fig.tex");
        std::fs::write(&path, wrap_tikz_document("  \\draw (-1.5,-1) rectangle (2,1.2);\n")).unwrap();
        let handle = HandleRef::new(ShapeKind::Rectangle, 0, None);
        drag_file(&path, handle, WorldPoint::new(3.04, 1.96), &EditorConfig::default())
            .await
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("(-1.5,-1) rectangle (3,2);"), "{text}");
    }

    #[tokio::test]
    async fn test_handles_reports_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fig.tex");
        let out = dir.path().join("overlay.png");
        std::fs::write(&path, wrap_tikz_document("  \\draw (0,0) circle (1.5);\n")).unwrap();

        let renderer = FakeRenderer::default();
        let report = handles(&path, Some(&out), EditorConfig::default(), &renderer)
            .await
            .unwrap();

        // Circle radius handle at (1.5, 0); fake page puts the origin at (50,250), 40 px/unit
        let radius = report.iter().find(|r| r.handle == "circle:0").unwrap();
        let expected = page_point((50, 250), 40, 1.5, 0.0);
        assert!((radius.pixel.x - expected.x).abs() < 1e-6);
        assert!((radius.pixel.y - expected.y).abs() < 1e-6);
        assert!(out.exists());
        assert_eq!(renderer.submitted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handles_fails_without_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fig.tex");
        std::fs::write(&path, wrap_tikz_document("  \\draw (0,0);\n")).unwrap();
        let renderer = FakeRenderer {
            fail: true,
            ..Default::default()
        };
        let err = handles(&path, None, EditorConfig::default(), &renderer).await.unwrap_err();
        assert!(err.to_string().contains("no render available"), "{err}");
    }

    #[test]
    fn test_parse_props() {
        assert_eq!(
            Cli::parse(args("props fig.tex rectangle:0")).unwrap().0,
            Cli::Props {
                path: "fig.tex".into(),
                handle: HandleRef::new(ShapeKind::Rectangle, 0, None),
            }
        );
        assert!(Cli::parse(args("props fig.tex")).is_err());
    }

    #[test]
    fn test_props_text_reports_style() {
        let text = wrap_tikz_document("  \\draw[blue, dashed] (0,0) rectangle (2.3,1.1);\n");
        let props = props_text(&text, HandleRef::new(ShapeKind::Rectangle, 0, None)).unwrap();
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["geometry"]["kind"], "rectangle");
        assert_eq!(json["geometry"]["corner"]["x"], 2.3);
        assert_eq!(json["style"]["color"], "blue");
        assert_eq!(json["style"]["line_style"], "dashed");

        let err = props_text(&text, HandleRef::new(ShapeKind::Circle, 0, None)).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Property(_))));
    }

    #[tokio::test]
    async fn test_settle_forwards_cancel_to_renderer() {
        let renderer = FakeRenderer::default();
        let mut session = EditorSession::with_text(wrap_tikz_document("  \\draw (1,1);\n"), EditorConfig::default());
        let mut commands = session.update(CompileMsg::Requested);
        // Grid change while the first job is still in flight
        commands.extend(session.update(crate::session::Msg::Settings(EditorConfig {
            snap_mm: 5,
            ..Default::default()
        })));
        assert!(commands.contains(&Command::CancelCompile));
        settle(&mut session, &renderer, commands).await;

        assert_eq!(renderer.cancels.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(renderer.submitted.lock().unwrap().len(), 2);
        assert!(!session.is_compiling());
    }

    #[tokio::test]
    async fn test_settle_runs_debounced_compile() {
        let renderer = FakeRenderer::default();
        let mut session = EditorSession::with_text(wrap_tikz_document(""), EditorConfig::default());
        let commands = session.update(DocumentMsg::Replaced(wrap_tikz_document("  \\draw (1,1);\n")));
        settle(&mut session, &renderer, commands).await;

        let frame = session.frame().unwrap();
        assert_eq!(frame.version, session.snapshot().version());
        assert!(frame.fix.is_some());
        let submitted = renderer.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].contains("tikzdrag preview grid"));
    }
}
