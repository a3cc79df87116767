//! Attachment buffer
//!
//! Holds at most one staged file that travels with the next outgoing
//! message. A new selection replaces the pending one; a successful send or an
//! explicit removal clears it.

use crate::config::AttachmentConfig;
use crate::error::AttachmentError;
use crate::session::render::RenderCommand;
use base64::Engine;
use std::path::Path;

/// What kind of file is staged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Any `image/*`
    Image,
    /// The accepted document type
    Document,
}

impl MediaKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }
}

/// A file the user picked, already in memory
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Original file name
    pub name: String,
    /// MIME type as reported by the picker
    pub mime_type: String,
    /// File content
    pub bytes: Vec<u8>,
}

/// The staged file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    /// `data:<mime>;base64,<content>`
    pub payload: String,
    /// Image or document
    pub media_kind: MediaKind,
    /// MIME type
    pub mime_type: String,
    /// Original file name
    pub original_name: String,
}

/// Single-slot holder for the pending attachment
#[derive(Debug)]
pub struct AttachmentBuffer {
    pending: Option<PendingAttachment>,
    limits: AttachmentConfig,
}

impl AttachmentBuffer {
    /// Creates an empty buffer with the given bounds
    pub fn new(limits: AttachmentConfig) -> Self {
        Self {
            pending: None,
            limits,
        }
    }

    /// The staged file, if any
    pub fn pending(&self) -> Option<&PendingAttachment> {
        self.pending.as_ref()
    }

    /// Classify and bound-check a file without staging it
    ///
    /// # Errors
    ///
    /// `UnsupportedType` for anything but `image/*` or the document MIME,
    /// `TooLarge` when the size exceeds the bound for its kind
    pub fn validate(&self, mime_type: &str, size: u64) -> Result<MediaKind, AttachmentError> {
        let kind = if mime_type.starts_with("image/") {
            MediaKind::Image
        } else if mime_type == self.limits.document_mime {
            MediaKind::Document
        } else {
            return Err(AttachmentError::UnsupportedType {
                mime: mime_type.to_string(),
            });
        };

        let limit = match kind {
            MediaKind::Image => self.limits.max_image_bytes,
            MediaKind::Document => self.limits.max_document_bytes,
        };
        if size > limit {
            return Err(AttachmentError::TooLarge {
                kind: kind.as_str(),
                size,
                limit,
            });
        }

        Ok(kind)
    }

    /// Stage an in-memory file, replacing any pending one
    ///
    /// On success returns the preview instruction for the presentation layer.
    /// On validation failure nothing changes.
    pub fn stage(&mut self, file: SelectedFile) -> Result<RenderCommand, AttachmentError> {
        let kind = self.validate(&file.mime_type, file.bytes.len() as u64)?;
        Ok(self.store(kind, file.name, file.mime_type, &file.bytes))
    }

    /// Stage a file from disk, replacing any pending one
    ///
    /// The size is checked from metadata before the content is read. The
    /// MIME type is taken from the file's magic bytes when they are
    /// recognized, falling back to the extension. A read failure leaves no
    /// pending attachment at all.
    pub async fn stage_path(&mut self, path: &Path) -> Result<RenderCommand, AttachmentError> {
        let guessed = sniff_mime(path);
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => return Err(self.encoding_failure(e)),
        };
        let largest = self
            .limits
            .max_image_bytes
            .max(self.limits.max_document_bytes);
        if metadata.len() > largest {
            self.validate(&guessed, metadata.len())?;
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => return Err(self.encoding_failure(e)),
        };
        let mime_type = sniff_magic(&bytes).map_or(guessed, str::to_string);
        let kind = self.validate(&mime_type, bytes.len() as u64)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.store(kind, name, mime_type, &bytes))
    }

    /// Destroy the pending attachment; idempotent
    pub fn clear(&mut self) -> RenderCommand {
        if let Some(previous) = self.pending.take() {
            tracing::debug!("Cleared pending attachment {}", previous.original_name);
        }
        RenderCommand::HidePreviews
    }

    fn encoding_failure(&mut self, e: std::io::Error) -> AttachmentError {
        tracing::warn!("Failed to read attachment: {}", e);
        self.pending = None;
        AttachmentError::Encoding(e)
    }

    fn store(
        &mut self,
        kind: MediaKind,
        name: String,
        mime_type: String,
        bytes: &[u8],
    ) -> RenderCommand {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let payload = format!("data:{};base64,{}", mime_type, encoded);
        tracing::info!(
            "Staged {} attachment {} ({} bytes)",
            kind.as_str(),
            name,
            bytes.len()
        );

        let preview = match kind {
            MediaKind::Image => RenderCommand::ShowImagePreview {
                name: name.clone(),
                mime_type: mime_type.clone(),
            },
            MediaKind::Document => RenderCommand::ShowDocumentChip { name: name.clone() },
        };

        self.pending = Some(PendingAttachment {
            payload,
            media_kind: kind,
            mime_type,
            original_name: name,
        });
        preview
    }
}

/// Guess a MIME type from the file extension
pub fn sniff_mime(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Detect a MIME type from leading magic bytes
pub fn sniff_magic(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG") {
        Some("image/png")
    } else if bytes.starts_with(b"\xff\xd8\xff") {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.starts_with(b"RIFF") && bytes.len() > 12 && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else if bytes.starts_with(b"%PDF-") {
        Some("application/pdf")
    } else {
        None
    }
}
