// Exam paper layout: font metrics, drawing backends, page geometry and the
// two-column flow engine. Layout of one paper is CPU-bound and sequential;
// callers run it inside tokio::task::spawn_blocking.

pub mod backend;
pub mod chrome;
pub mod config;
pub mod engine;
pub mod font_metrics;
pub mod fonts;
pub mod pdf;
pub mod recording;

// Re-export the public API consumed by other modules (generator, handlers).
pub use backend::RenderBackend;
pub use config::{default_layout_config, LayoutConfig};
pub use engine::{layout_paper, Paper, PaperContext, PaperLayout, RenderedPaper};
pub use font_metrics::FontBook;
pub use fonts::{font_gate, load_font_book, metrics_source, FontGate};
pub use pdf::PdfBackend;
pub use recording::RecordingBackend;
