//! pdflatex + pdftoppm renderer
//!
//! Each job writes `document.tex` into a private temporary directory, runs
//! the TeX engine, rasterises page one to PNG and decodes it to RGBA.
//! Cancelling sends SIGTERM to whichever tool is running.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tempfile::TempDir;
use tokio::process::Command;

use super::{RenderError, RenderedPage, Renderer};
use crate::config::EditorConfig;

const TEX_FILE: &str = "document.tex";
const PDF_FILE: &str = "document.pdf";
const PNG_STEM: &str = "document";

/// Tool settings for one renderer instance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatexOptions {
    pub compiler: String,
    pub rasterizer: String,
    pub dpi: u32,
}

impl From<&EditorConfig> for LatexOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            compiler: config.compiler.clone(),
            rasterizer: config.rasterizer.clone(),
            dpi: config.render_dpi,
        }
    }
}

#[derive(Debug, Default)]
struct RunState {
    pid: Mutex<Option<u32>>,
    cancelled: AtomicBool,
}

impl RunState {
    fn set_pid(&self, pid: Option<u32>) {
        if let Ok(mut guard) = self.pid.lock() {
            *guard = pid;
        }
    }

    fn pid(&self) -> Option<u32> {
        self.pid.lock().ok().and_then(|guard| *guard)
    }
}

pub struct LatexRenderer {
    options: LatexOptions,
    work_dir: Arc<TempDir>,
    state: Arc<RunState>,
}

impl LatexRenderer {
    pub fn new(options: LatexOptions) -> anyhow::Result<Self> {
        let work_dir = tempfile::Builder::new().prefix("tikzdrag-").tempdir()?;
        log::debug!("[Compile] work dir {}", work_dir.path().display());
        Ok(Self {
            options,
            work_dir: Arc::new(work_dir),
            state: Arc::new(RunState::default()),
        })
    }

    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Renderer for LatexRenderer {
    fn submit(&self, source: String) -> BoxFuture<'static, Result<RenderedPage, RenderError>> {
        let options = self.options.clone();
        let work_dir = Arc::clone(&self.work_dir);
        let state = Arc::clone(&self.state);
        state.cancelled.store(false, Ordering::SeqCst);
        Box::pin(async move { render(&options, work_dir.path(), &state, source).await })
    }

    fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        let Some(pid) = self.state.pid() else {
            return;
        };
        log::info!("[Compile] Sending SIGTERM to process {pid}");
        if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            log::warn!("Failed to send SIGTERM to process {pid}: {e}");
        }
    }
}

async fn render(
    options: &LatexOptions,
    dir: &Path,
    state: &RunState,
    source: String,
) -> Result<RenderedPage, RenderError> {
    let mut log = String::new();
    tokio::fs::write(dir.join(TEX_FILE), source).await?;
    // A stale PNG must never pass for this job's output
    let png = dir.join(format!("{PNG_STEM}.png"));
    if png.exists() {
        tokio::fs::remove_file(&png).await?;
    }

    log.push_str(&format!(
        "\n[Compile] {}\n",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S")
    ));
    log.push_str(&format!("[Compile] Running {}...\n", options.compiler));
    run_tool(
        &options.compiler,
        &[
            "-interaction=nonstopmode",
            "-halt-on-error",
            "-file-line-error",
            TEX_FILE,
        ],
        dir,
        state,
        &mut log,
    )
    .await?;

    let dpi = options.dpi.to_string();
    log.push_str(&format!("[Compile] Running {}...\n", options.rasterizer));
    run_tool(
        &options.rasterizer,
        &["-png", "-r", &dpi, "-singlefile", PDF_FILE, PNG_STEM],
        dir,
        state,
        &mut log,
    )
    .await?;

    let image = decode_png(png).await?;
    log.push_str(&format!(
        "[Preview] Raster updated ({}x{})\n",
        image.width(),
        image.height()
    ));
    Ok(RenderedPage { image, log })
}

async fn run_tool(
    program: &str,
    args: &[&str],
    dir: &Path,
    state: &RunState,
    log: &mut String,
) -> Result<(), RenderError> {
    if state.cancelled.load(Ordering::SeqCst) {
        return Err(RenderError::Cancelled);
    }

    let child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RenderError::Spawn {
            tool: program.to_string(),
            source,
        })?;
    state.set_pid(child.id());
    let output = child.wait_with_output().await;
    state.set_pid(None);
    let output = output?;

    log.push_str(&String::from_utf8_lossy(&output.stdout));
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    if state.cancelled.load(Ordering::SeqCst) {
        log.push_str("[Compile] Cancelled\n");
        return Err(RenderError::Cancelled);
    }
    if !output.status.success() {
        log.push_str("[Compile] Failed\n");
        return Err(RenderError::Failed {
            tool: program.to_string(),
            status: output.status.to_string(),
            log: std::mem::take(log),
        });
    }
    Ok(())
}

async fn decode_png(path: PathBuf) -> Result<image::RgbaImage, RenderError> {
    tokio::task::spawn_blocking(move || -> Result<_, RenderError> {
        Ok(image::open(&path)?.to_rgba8())
    })
    .await
    .map_err(|e| RenderError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(compiler: &str, rasterizer: &str) -> LatexOptions {
        LatexOptions {
            compiler: compiler.to_string(),
            rasterizer: rasterizer.to_string(),
            dpi: 72,
        }
    }

    #[tokio::test]
    async fn test_missing_compiler_is_a_spawn_error() {
        let renderer =
            LatexRenderer::new(options("tikzdrag-no-such-compiler", "pdftoppm")).expect("renderer");
        let result = renderer.submit("\\relax".to_string()).await;
        assert!(matches!(result, Err(RenderError::Spawn { .. })));
        assert!(renderer.work_dir().join(TEX_FILE).exists());
    }

    #[tokio::test]
    async fn test_failing_tool_reports_failure() {
        let renderer = LatexRenderer::new(options("false", "true")).expect("renderer");
        let err = renderer
            .submit(String::new())
            .await
            .expect_err("false exits non-zero");
        assert!(matches!(&err, RenderError::Failed { tool, .. } if tool == "false"));
        assert!(err.log().is_some_and(|log| log.contains("[Compile] Failed")));
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let renderer = LatexRenderer::new(options("true", "true")).expect("renderer");
        let job = renderer.submit(String::new());
        renderer.cancel();
        assert!(matches!(job.await, Err(RenderError::Cancelled)));
    }

    #[test]
    fn test_options_from_config() {
        let config = EditorConfig {
            render_dpi: 200,
            ..Default::default()
        };
        let options = LatexOptions::from(&config);
        assert_eq!(options.compiler, "pdflatex");
        assert_eq!(options.dpi, 200);
    }
}
