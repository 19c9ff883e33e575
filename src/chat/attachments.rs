// File attachment manager - tracks a batch of selected files through their
// upload lifecycle, independent of chat state.

use uuid::Uuid;

use crate::client::{ClientError, UploadResult};
use crate::models::TurnAttachment;

/// Upload lifecycle. A file is `Uploading` from the moment it is selected
/// and ends in exactly one terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Uploading,
    Uploaded { asset_id: String },
    Failed { message: String },
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadState::Uploading)
    }
}

/// One file in the current batch
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub id: String,
    pub name: String,
    pub human_size: String,
    pub state: UploadState,
}

/// Tracks the files selected for the next send.
///
/// Files upload independently; one failure never aborts or rolls back its
/// siblings. Removal and clearing are allowed at any time and have no
/// effect on agent calls already dispatched.
#[derive(Debug, Default)]
pub struct AttachmentManager {
    files: Vec<SelectedFile>,
}

impl AttachmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly selected file as `Uploading` and return its local id
    pub fn select(&mut self, name: impl Into<String>, size_bytes: u64) -> String {
        let id = Uuid::new_v4().to_string();
        self.files.push(SelectedFile {
            id: id.clone(),
            name: name.into(),
            human_size: human_size(size_bytes),
            state: UploadState::Uploading,
        });
        id
    }

    /// Fold an upload outcome into the file's state. The first asset id of a
    /// successful response becomes the reference; a reported failure, an
    /// empty id list, or a transport error all terminate in `Failed`.
    pub fn resolve_upload(&mut self, id: &str, outcome: Result<UploadResult, ClientError>) {
        match outcome {
            Ok(result) if result.success => match result.asset_ids.into_iter().next() {
                Some(asset_id) => self.mark_uploaded(id, asset_id),
                None => self.mark_failed(id, "Upload returned no asset reference"),
            },
            Ok(result) => {
                let message = result
                    .error
                    .unwrap_or_else(|| "Upload failed".to_string());
                self.mark_failed(id, message);
            }
            Err(e) => {
                log::warn!("Upload transport error for {}: {}", id, e);
                self.mark_failed(id, "Upload failed");
            }
        }
    }

    fn file_mut(&mut self, id: &str) -> Option<&mut SelectedFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    fn mark_uploaded(&mut self, id: &str, asset_id: impl Into<String>) {
        if let Some(file) = self.file_mut(id) {
            if file.state == UploadState::Uploading {
                file.state = UploadState::Uploaded {
                    asset_id: asset_id.into(),
                };
            }
        }
    }

    fn mark_failed(&mut self, id: &str, message: impl Into<String>) {
        if let Some(file) = self.file_mut(id) {
            // Terminal states are final, a late error cannot undo a success
            if file.state == UploadState::Uploading {
                file.state = UploadState::Failed {
                    message: message.into(),
                };
            }
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.files.retain(|f| f.id != id);
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// True while any file in the batch is still uploading
    pub fn has_uploads_in_flight(&self) -> bool {
        self.files.iter().any(|f| f.state == UploadState::Uploading)
    }

    /// Percentage of files that reached a terminal state, success or error.
    /// An empty batch reads as complete.
    pub fn batch_progress(&self) -> u8 {
        if self.files.is_empty() {
            return 100;
        }
        let terminal = self.files.iter().filter(|f| f.state.is_terminal()).count();
        ((terminal * 100) / self.files.len()) as u8
    }

    /// Asset references of the completed uploads, in selection order
    pub fn asset_ids(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|f| match &f.state {
                UploadState::Uploaded { asset_id } => Some(asset_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Attachment chips for the user's turn, covering completed uploads only
    pub fn display_attachments(&self) -> Vec<TurnAttachment> {
        self.files
            .iter()
            .filter(|f| matches!(f.state, UploadState::Uploaded { .. }))
            .map(|f| TurnAttachment {
                name: f.name.clone(),
                human_size: f.human_size.clone(),
            })
            .collect()
    }
}

/// Format a byte count for display (e.g. "1.2 MB")
pub(crate) fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes as u64)
    }
}
