//! Chart rendering
//!
//! Renderers draw a [`ChartSpec`] into an explicit [`RenderTarget`]. Nothing
//! here looks targets up globally; whoever calls `render` decides where the
//! chart goes. Writing to a target replaces what was there before, so when
//! several forecasts share one target the last completed render wins.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::Result;
use crate::models::ChartSpec;

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

pub mod svg;
pub mod text;

pub use svg::SvgRenderer;
pub use text::TextRenderer;

/// Where a chart is drawn
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Stdout,
    File(PathBuf),
}

impl RenderTarget {
    /// Replace the target's content with `content`
    pub async fn write(&self, content: &str) -> Result<()> {
        match self {
            RenderTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(content.as_bytes())?;
                out.flush()?;
            }
            RenderTarget::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
                // Staged write then rename: readers see the old chart or the new one.
                let mut staged = path.file_name().unwrap_or_default().to_os_string();
                staged.push(format!(
                    ".{}.{}.tmp",
                    std::process::id(),
                    WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
                ));
                let staged = path.with_file_name(staged);
                tokio::fs::write(&staged, content).await?;
                if let Err(err) = tokio::fs::rename(&staged, path).await {
                    let _ = tokio::fs::remove_file(&staged).await;
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderTarget::Stdout => write!(f, "stdout"),
            RenderTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Chart drawing capability the requester depends on
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, target: &RenderTarget, chart: &ChartSpec) -> Result<()>;
}

#[async_trait]
impl ChartRenderer for Box<dyn ChartRenderer> {
    async fn render(&self, target: &RenderTarget, chart: &ChartSpec) -> Result<()> {
        (**self).render(target, chart).await
    }
}
