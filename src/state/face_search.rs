/// Face search over a single selected image
///
/// `Empty → FilePicked → Searching → Results | Failed`, with `clear`
/// returning to `Empty` from anywhere. Submitting while `Searching` is
/// rejected, and responses for a cleared or superseded search are dropped.
use tracing::debug;

use super::data::{FaceSearchResult, PhotoMatch};
use super::lifetime::{Generation, Ticket};
use super::selection::validate_image;
use crate::api::photos::SearchOptions;
use crate::api::transport::FilePart;
use crate::error::{ApiError, ValidationError};
use crate::messages;

/// Scores at or above this are shown as a strong match
pub const STRONG_MATCH: f32 = 0.8;
/// Scores at or above this (and below `STRONG_MATCH`) are shown as a weak match
pub const WEAK_MATCH: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    FilePicked,
    Searching,
    Results,
    Failed,
}

/// Display bucket for a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityTier {
    Success,
    Warn,
    Default,
}

impl SimilarityTier {
    pub fn from_score(similarity: f32) -> Self {
        if similarity >= STRONG_MATCH {
            SimilarityTier::Success
        } else if similarity >= WEAK_MATCH {
            SimilarityTier::Warn
        } else {
            SimilarityTier::Default
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SimilarityTier::Success => "success",
            SimilarityTier::Warn => "warn",
            SimilarityTier::Default => "default",
        }
    }
}

/// round(similarity × 100)
pub fn similarity_percent(similarity: f32) -> u32 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Everything needed to run one search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub ticket: Ticket,
    pub event_id: i64,
    pub file: FilePart,
    pub options: SearchOptions,
}

#[derive(Debug)]
pub struct FaceSearch {
    event_id: Option<i64>,
    file: Option<FilePart>,
    phase: Phase,
    matches: Vec<PhotoMatch>,
    total_matches: u32,
    message: Option<&'static str>,
    generation: Generation,
}

impl FaceSearch {
    pub fn new(event_id: Option<i64>) -> Self {
        Self {
            event_id,
            file: None,
            phase: Phase::Empty,
            matches: Vec::new(),
            total_matches: 0,
            message: None,
            generation: Generation::new(),
        }
    }

    /// Point the search at another event, discarding the current selection
    pub fn set_event(&mut self, event_id: i64) {
        if self.event_id != Some(event_id) {
            self.clear();
            self.event_id = Some(event_id);
        }
    }

    pub fn select(&mut self, file: FilePart) -> Result<(), ValidationError> {
        if self.phase == Phase::Searching {
            return Err(ValidationError::Busy);
        }
        validate_image(&file)?;

        debug!(file = %file.file_name, size = file.bytes.len(), "face image selected");
        self.file = Some(file);
        self.phase = Phase::FilePicked;
        self.matches.clear();
        self.total_matches = 0;
        self.message = None;
        Ok(())
    }

    pub fn submit(&mut self, options: SearchOptions) -> Result<SearchRequest, ValidationError> {
        if self.phase == Phase::Searching {
            return Err(ValidationError::Busy);
        }
        let file = self.file.clone().ok_or(ValidationError::NoFileSelected)?;
        let event_id = self.event_id.ok_or(ValidationError::NoEventSelected)?;

        self.phase = Phase::Searching;
        self.matches.clear();
        self.total_matches = 0;
        self.message = None;

        Ok(SearchRequest {
            ticket: self.generation.issue(),
            event_id,
            file,
            options,
        })
    }

    /// Apply a search response; returns false when it arrived too late
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<FaceSearchResult, ApiError>,
    ) -> bool {
        if !self.generation.is_current(ticket) || self.phase != Phase::Searching {
            debug!("discarding stale face search response");
            return false;
        }

        match result {
            Ok(found) => {
                self.phase = Phase::Results;
                self.total_matches = found.total_matches;
                self.matches = found.matches;
                if self.matches.is_empty() {
                    self.message = Some(messages::NO_MATCHES);
                }
            }
            Err(e) => {
                debug!("face search failed: {e}");
                self.phase = Phase::Failed;
                self.message = Some(messages::search_failure(&e));
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.generation.invalidate();
        self.file = None;
        self.phase = Phase::Empty;
        self.matches.clear();
        self.total_matches = 0;
        self.message = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn event_id(&self) -> Option<i64> {
        self.event_id
    }

    pub fn file(&self) -> Option<&FilePart> {
        self.file.as_ref()
    }

    pub fn matches(&self) -> &[PhotoMatch] {
        &self.matches
    }

    pub fn total_matches(&self) -> u32 {
        self.total_matches
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::photos::PhotoService;
    use crate::api::transport::Api;
    use crate::state::selection::{file_of, MAX_IMAGE_BYTES};
    use crate::test_support::FakeTransport;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;

    fn jpeg(size: usize) -> FilePart {
        file_of("selfie.jpg", "image/jpeg", size)
    }

    #[rstest]
    #[case(1.0, SimilarityTier::Success, 100)]
    #[case(0.91, SimilarityTier::Success, 91)]
    #[case(0.8, SimilarityTier::Success, 80)]
    #[case(0.7999, SimilarityTier::Warn, 80)]
    #[case(0.6, SimilarityTier::Warn, 60)]
    #[case(0.5999, SimilarityTier::Default, 60)]
    #[case(0.125, SimilarityTier::Default, 13)]
    #[case(0.0, SimilarityTier::Default, 0)]
    fn test_tiers_and_percentages(
        #[case] score: f32,
        #[case] tier: SimilarityTier,
        #[case] percent: u32,
    ) {
        assert_eq!(SimilarityTier::from_score(score), tier);
        assert_eq!(similarity_percent(score), percent);
    }

    #[test]
    fn test_invalid_selection_keeps_state_empty() {
        let mut search = FaceSearch::new(Some(42));

        assert_eq!(
            search.select(file_of("doc.pdf", "application/pdf", 100)),
            Err(ValidationError::NotAnImage)
        );
        assert!(search
            .select(jpeg(MAX_IMAGE_BYTES as usize + 1))
            .is_err());

        assert_eq!(search.phase(), Phase::Empty);
        assert!(search.file().is_none());
    }

    #[test]
    fn test_submit_requires_file_and_event() {
        let mut search = FaceSearch::new(None);
        assert_eq!(
            search.submit(SearchOptions::default()).unwrap_err(),
            ValidationError::NoFileSelected
        );

        search.select(jpeg(10)).unwrap();
        assert_eq!(
            search.submit(SearchOptions::default()).unwrap_err(),
            ValidationError::NoEventSelected
        );
        assert_eq!(search.phase(), Phase::FilePicked);
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let mut search = FaceSearch::new(Some(42));
        search.select(jpeg(10)).unwrap();
        search.submit(SearchOptions::default()).unwrap();

        assert_eq!(
            search.submit(SearchOptions::default()).unwrap_err(),
            ValidationError::Busy
        );
        assert_eq!(search.select(jpeg(20)), Err(ValidationError::Busy));
        assert_eq!(search.phase(), Phase::Searching);
    }

    #[test]
    fn test_failure_messages() {
        let mut search = FaceSearch::new(Some(42));
        search.select(jpeg(10)).unwrap();

        let request = search.submit(SearchOptions::default()).unwrap();
        search.complete(
            request.ticket,
            Err(ApiError::Status {
                status: 400,
                body: r#"{"error":"No face detected"}"#.to_string(),
            }),
        );
        assert_eq!(search.phase(), Phase::Failed);
        assert_eq!(search.message(), Some(messages::NO_FACE_DETECTED));

        // retry from Failed with the same file
        let request = search.submit(SearchOptions::default()).unwrap();
        search.complete(request.ticket, Err(ApiError::Network("reset".to_string())));
        assert_eq!(search.message(), Some(messages::SEARCH_FAILED));
    }

    #[test]
    fn test_clear_discards_in_flight_response() {
        let mut search = FaceSearch::new(Some(42));
        search.select(jpeg(10)).unwrap();
        let request = search.submit(SearchOptions::default()).unwrap();

        search.clear();
        let applied = search.complete(request.ticket, Ok(FaceSearchResult::default()));

        assert!(!applied);
        assert_eq!(search.phase(), Phase::Empty);
        assert!(search.message().is_none());
    }

    #[test]
    fn test_empty_results_show_notice() {
        let mut search = FaceSearch::new(Some(1));
        search.select(jpeg(10)).unwrap();
        let request = search.submit(SearchOptions::default()).unwrap();

        assert!(search.complete(request.ticket, Ok(FaceSearchResult::default())));
        assert_eq!(search.phase(), Phase::Results);
        assert_eq!(search.message(), Some(messages::NO_MATCHES));
    }

    #[test]
    fn test_changing_event_resets() {
        let mut search = FaceSearch::new(Some(1));
        search.select(jpeg(10)).unwrap();
        search.set_event(1);
        assert_eq!(search.phase(), Phase::FilePicked);

        search.set_event(2);
        assert_eq!(search.phase(), Phase::Empty);
        assert_eq!(search.event_id(), Some(2));
    }

    #[tokio::test]
    async fn test_end_to_end_single_strong_match() {
        let fake = Arc::new(FakeTransport::new());
        let photos = PhotoService::new(Api::new(fake.clone()));
        fake.push_ok(json!({
            "matches": [{
                "photoId": 1,
                "photoUrl": "https://cdn.ifoto.ir/e/42/1.jpg",
                "thumbnailUrl": null,
                "similarity": 0.91,
                "faceLocation": {"x": 120, "y": 80, "width": 64, "height": 64}
            }],
            "totalMatches": 1
        }));

        let mut search = FaceSearch::new(Some(42));
        search.select(jpeg(2 * 1024 * 1024)).unwrap();
        let request = search.submit(SearchOptions::default()).unwrap();
        assert_eq!(request.event_id, 42);

        let result = photos
            .search_by_face(request.event_id, request.file, request.options)
            .await;
        assert!(search.complete(request.ticket, result));

        assert_eq!(search.phase(), Phase::Results);
        assert_eq!(search.total_matches(), 1);
        let [only] = search.matches() else {
            panic!("expected exactly one match");
        };
        assert_eq!(only.photo_id, 1);
        assert_eq!(similarity_percent(only.similarity), 91);
        assert_eq!(SimilarityTier::from_score(only.similarity).label(), "success");
        assert_eq!(search.message(), None);
    }
}
