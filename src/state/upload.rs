/// Multi-file upload queue: pick, review, submit.
///
/// The queue holds paths and metadata only; a job's bytes are read when it
/// is sent. Files upload one at a time. Each completed upload hands back the next
/// job until the queue is drained, then a summary is produced.
use tracing::{debug, warn};

use super::data::UploadedPhoto;
use super::lifetime::{Generation, Ticket};
use super::selection::{validate_local, LocalFile};
use crate::error::{UploadError, ValidationError};

#[derive(Debug, Clone)]
pub struct UploadJob {
    pub ticket: Ticket,
    pub event_id: i64,
    pub file: LocalFile,
}

/// How many files `add_files` accepted and skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddSummary {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct UploadQueue {
    files: Vec<LocalFile>,
    /// Index of the file being uploaded, `None` when idle
    in_flight: Option<usize>,
    event_id: Option<i64>,
    uploaded: Vec<UploadedPhoto>,
    failed: Vec<(String, UploadError)>,
    generation: Generation,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue image files, skipping anything that fails validation
    pub fn add_files(&mut self, files: Vec<LocalFile>) -> Result<AddSummary, ValidationError> {
        if self.is_uploading() {
            return Err(ValidationError::Busy);
        }
        let mut summary = AddSummary::default();
        for file in files {
            match validate_local(&file) {
                Ok(()) => {
                    self.files.push(file);
                    summary.added += 1;
                }
                Err(e) => {
                    debug!(file = %file.file_name, "skipping: {e}");
                    summary.skipped += 1;
                }
            }
        }
        Ok(summary)
    }

    pub fn remove(&mut self, index: usize) {
        if !self.is_uploading() && index < self.files.len() {
            self.files.remove(index);
        }
    }

    pub fn set_event(&mut self, event_id: Option<i64>) {
        if !self.is_uploading() {
            self.event_id = event_id;
        }
    }

    pub fn start(&mut self) -> Result<UploadJob, ValidationError> {
        if self.is_uploading() {
            return Err(ValidationError::Busy);
        }
        if self.files.is_empty() {
            return Err(ValidationError::NothingToUpload);
        }
        let event_id = self.event_id.ok_or(ValidationError::NoEventSelected)?;

        self.uploaded.clear();
        self.failed.clear();
        self.in_flight = Some(0);
        Ok(self.job(0, event_id))
    }

    /// Record one finished upload; returns the next job if any remain
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<UploadedPhoto, UploadError>,
    ) -> Option<UploadJob> {
        if !self.generation.is_current(ticket) {
            debug!("discarding stale upload response");
            return None;
        }
        let index = self.in_flight?;
        let event_id = self.event_id?;

        match result {
            Ok(photo) => self.uploaded.push(photo),
            Err(e) => {
                let name = self
                    .files
                    .get(index)
                    .map(|f| f.file_name.clone())
                    .unwrap_or_default();
                warn!("Upload of {name} failed: {e}");
                self.failed.push((name, e));
            }
        }

        let next = index + 1;
        if next < self.files.len() {
            self.in_flight = Some(next);
            Some(self.job(next, event_id))
        } else {
            self.in_flight = None;
            self.files.clear();
            None
        }
    }

    /// Abandon the run; responses still in flight are ignored
    pub fn cancel(&mut self) {
        self.generation.invalidate();
        self.in_flight = None;
    }

    fn job(&mut self, index: usize, event_id: i64) -> UploadJob {
        UploadJob {
            ticket: self.generation.issue(),
            event_id,
            file: self.files[index].clone(),
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// 1-based position of the file being uploaded and the queue length
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.in_flight.map(|index| (index + 1, self.files.len()))
    }

    pub fn files(&self) -> &[LocalFile] {
        &self.files
    }

    pub fn event_id(&self) -> Option<i64> {
        self.event_id
    }

    pub fn uploaded(&self) -> &[UploadedPhoto] {
        &self.uploaded
    }

    pub fn failed(&self) -> &[(String, UploadError)] {
        &self.failed
    }

    /// Outcome of the last finished run, `None` before any
    pub fn summary(&self) -> Option<String> {
        if self.is_uploading() || (self.uploaded.is_empty() && self.failed.is_empty()) {
            return None;
        }
        let faces: u32 = self.uploaded.iter().map(|p| p.face_count).sum();
        let mut text = format!(
            "Successfully uploaded {} files ({} faces found)",
            self.uploaded.len(),
            faces
        );
        if !self.failed.is_empty() {
            text.push_str(&format!(", {} failed", self.failed.len()));
        }
        Some(text)
    }
}
