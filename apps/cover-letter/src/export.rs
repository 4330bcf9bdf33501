//! Export boundary: the flat record handed to the external document renderers.
//!
//! Renderers (Word, PDF, LaTeX) live outside this crate. They receive an
//! `ExportRecord` and hand back encoded bytes; nothing here assumes how they
//! lay out or style the text.

use bytes::Bytes;
use serde::Serialize;
use tracing::warn;

use crate::generation::ResultEnvelope;
use crate::models::{HiringContext, SenderProfile};

/// Read-only projection of a successful generation, shaped exactly as the
/// renderers expect: `{body, user_info, date_str, hr_info}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub body: String,
    pub user_info: SenderProfile,
    pub date_str: String,
    pub hr_info: HiringContext,
}

impl ExportRecord {
    /// `None` for failure envelopes: there is nothing to export.
    pub fn from_envelope(
        envelope: &ResultEnvelope,
        sender: &SenderProfile,
        date_str: &str,
    ) -> Option<Self> {
        if !envelope.ok {
            return None;
        }
        Some(Self {
            body: envelope.text.clone()?,
            user_info: sender.clone(),
            date_str: date_str.to_string(),
            hr_info: envelope.hiring_context.clone().unwrap_or_default(),
        })
    }

    /// Same record with a user-edited body, for re-exporting after edits.
    pub fn with_body(&self, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExportFormat {
    Word,
    Pdf,
    Latex,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Word, ExportFormat::Pdf, ExportFormat::Latex];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Latex => "tex",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Latex => "application/x-tex",
        }
    }
}

/// An external renderer for one export format.
pub trait DocumentRenderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(&self, record: &ExportRecord) -> anyhow::Result<Bytes>;
}

#[derive(Debug)]
pub struct RenderedExport {
    pub format: ExportFormat,
    pub result: Result<Bytes, String>,
}

/// Renders `record` once per selected format. A failing renderer yields an
/// error entry for its format and does not affect the others. Formats with no
/// registered renderer are skipped.
pub fn render_exports(
    record: &ExportRecord,
    renderers: &[&dyn DocumentRenderer],
    formats: &[ExportFormat],
) -> Vec<RenderedExport> {
    formats
        .iter()
        .filter_map(|format| {
            let renderer = renderers.iter().find(|r| r.format() == *format)?;
            let result = renderer.render(record).map_err(|e| {
                warn!("{:?} export failed: {e:#}", format);
                e.to_string()
            });
            Some(RenderedExport {
                format: *format,
                result,
            })
        })
        .collect()
}
