//! Font metric loading and the layout readiness gate.
//!
//! Metrics are loaded once, asynchronously, at startup. No layout pass may
//! start before loading finishes, otherwise measurements (line counts,
//! heights) would not match the final metrics and pagination would silently
//! differ between papers. `FontGate::ready` is the only way generation code
//! obtains a `FontBook`, so it cannot run ahead of the loader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::font_metrics::{FontBook, FontFace, FontMetricTable, MetricsOrigin};

// ────────────────────────────────────────────────────────────────────────────
// Metrics sources
// ────────────────────────────────────────────────────────────────────────────

/// Pluggable origin for font metrics. Default: built-in Helvetica tables.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn load(&self) -> Result<FontBook>;

    /// Human-readable description for log lines.
    fn describe(&self) -> String;
}

pub struct BuiltInMetrics;

#[async_trait]
impl MetricsSource for BuiltInMetrics {
    async fn load(&self) -> Result<FontBook> {
        Ok(FontBook::builtin())
    }

    fn describe(&self) -> String {
        "built-in Helvetica tables".to_string()
    }
}

/// Reads per-face overrides from a JSON file:
///
/// ```json
/// { "regular": { "widths": [95 numbers], "average_char_width": 0.52 }, "bold": { ... } }
/// ```
///
/// Faces missing from the file keep their built-in tables.
pub struct FileMetrics {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct FaceOverride {
    widths: Vec<f32>,
    average_char_width: f32,
}

#[async_trait]
impl MetricsSource for FileMetrics {
    async fn load(&self) -> Result<FontBook> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading font metrics from {}", self.path.display()))?;
        let overrides: HashMap<FontFace, FaceOverride> =
            serde_json::from_str(&raw).context("parsing font metrics JSON")?;

        let mut book = FontBook::builtin();
        for (face, face_override) in overrides {
            book = book.with_table(parse_face(face, face_override)?);
        }
        book.origin = MetricsOrigin::File(self.path.display().to_string());
        Ok(book)
    }

    fn describe(&self) -> String {
        format!("metrics file {}", self.path.display())
    }
}

fn parse_face(face: FontFace, face_override: FaceOverride) -> Result<FontMetricTable> {
    let FaceOverride {
        widths,
        average_char_width,
    } = face_override;

    let count = widths.len();
    let widths: [f32; 95] = widths
        .try_into()
        .map_err(|_| anyhow::anyhow!("{face:?}: expected 95 widths, found {count}"))?;

    if widths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        bail!("{face:?}: widths must be positive finite numbers");
    }
    if !average_char_width.is_finite() || average_char_width <= 0.0 {
        bail!("{face:?}: average_char_width must be a positive finite number");
    }

    Ok(FontMetricTable::new(face, widths, average_char_width))
}

/// Loads metrics from `source`, degrading to the built-in tables on failure.
///
/// A missing or malformed resource is a warning, never a fatal error: layout
/// must still run with the documented fallback metrics.
pub async fn load_font_book(source: &dyn MetricsSource) -> FontBook {
    match source.load().await {
        Ok(book) => {
            info!(source = %source.describe(), "Font metrics loaded");
            book
        }
        Err(e) => {
            warn!(
                source = %source.describe(),
                error = %format!("{e:#}"),
                "Font metrics failed to load, falling back to built-in Helvetica tables"
            );
            FontBook::builtin()
        }
    }
}

/// Picks the metrics source for an optional override path.
pub fn metrics_source(path: Option<&Path>) -> Box<dyn MetricsSource> {
    match path {
        Some(path) => Box::new(FileMetrics {
            path: path.to_path_buf(),
        }),
        None => Box::new(BuiltInMetrics),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Readiness gate
// ────────────────────────────────────────────────────────────────────────────

/// Read side of the gate, cloned into application state.
#[derive(Clone)]
pub struct FontGate {
    rx: watch::Receiver<Option<Arc<FontBook>>>,
}

/// Write side of the gate, owned by the loading task. Publishing consumes it.
pub struct FontPublisher {
    tx: watch::Sender<Option<Arc<FontBook>>>,
}

pub fn font_gate() -> (FontPublisher, FontGate) {
    let (tx, rx) = watch::channel(None);
    (FontPublisher { tx }, FontGate { rx })
}

impl FontPublisher {
    pub fn publish(self, book: FontBook) {
        self.tx.send_replace(Some(Arc::new(book)));
    }
}

impl FontGate {
    /// A gate that is already open. Used where metrics are known up front.
    pub fn opened(book: FontBook) -> Self {
        let (publisher, gate) = font_gate();
        publisher.publish(book);
        gate
    }

    /// Waits until metrics are published and returns them.
    ///
    /// Fails only if the loader was dropped without publishing.
    pub async fn ready(&self) -> Result<Arc<FontBook>, AppError> {
        let mut rx = self.rx.clone();
        let book = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| {
                AppError::Internal(anyhow::anyhow!(
                    "font loader stopped before publishing metrics"
                ))
            })?
            .clone();
        book.ok_or_else(|| AppError::Internal(anyhow::anyhow!("font metrics missing after gate opened")))
    }

    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
