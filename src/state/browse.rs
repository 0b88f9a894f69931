/// View state for list and detail screens.
///
/// Each view owns a `Generation`; leaving the screen (`detach`) or issuing a
/// newer load makes earlier responses stale so they never overwrite state.
use tracing::warn;

use super::data::{EventDetail, GalleryDetail, Page, Photo};
use super::lifetime::{Generation, Ticket};
use super::lightbox::Lightbox;
use super::pagination::Pagination;
use crate::error::{ApiError, ValidationError};

/// One asynchronously loaded value with loading/error flags
#[derive(Debug)]
pub struct Loadable<T> {
    value: Option<T>,
    loading: bool,
    error: Option<&'static str>,
    failure_message: &'static str,
    generation: Generation,
}

impl<T> Loadable<T> {
    pub fn new(failure_message: &'static str) -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
            failure_message,
            generation: Generation::new(),
        }
    }

    pub fn begin(&mut self) -> Ticket {
        self.loading = true;
        self.error = None;
        self.generation.issue()
    }

    /// Apply a response; returns false when it was stale
    pub fn finish(&mut self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(value) => self.value = Some(value),
            Err(e) => {
                warn!("Load failed: {e}");
                self.value = None;
                self.error = Some(self.failure_message);
            }
        }
        true
    }

    pub fn detach(&mut self) {
        self.generation.invalidate();
        self.loading = false;
    }

    /// Forget the loaded value
    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }
}

/// What a list screen wants fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub ticket: Ticket,
    pub page: u32,
    /// `Some` for a search, `None` for the plain listing
    pub query: Option<String>,
}

/// Paginated, searchable list of events or galleries
#[derive(Debug)]
pub struct ListView<T> {
    data: Loadable<Page<T>>,
    pagination: Pagination,
    query: String,
    active_query: Option<String>,
}

impl<T> ListView<T> {
    pub fn new(failure_message: &'static str) -> Self {
        Self {
            data: Loadable::new(failure_message),
            pagination: Pagination::default(),
            query: String::new(),
            active_query: None,
        }
    }

    pub fn load(&mut self) -> ListRequest {
        ListRequest {
            ticket: self.data.begin(),
            page: self.pagination.current_page,
            query: self.active_query.clone(),
        }
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    /// Search from the first page
    pub fn search(&mut self) -> Result<ListRequest, ValidationError> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        self.active_query = Some(trimmed.to_string());
        self.pagination.reset();
        Ok(self.load())
    }

    /// Back to the plain listing
    pub fn clear_search(&mut self) -> ListRequest {
        self.query.clear();
        self.active_query = None;
        self.pagination.reset();
        self.load()
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<ListRequest> {
        if page == 0 || page > self.pagination.total_pages {
            return None;
        }
        if !self.pagination.go_to(page) {
            return None;
        }
        Some(self.load())
    }

    pub fn finish(&mut self, ticket: Ticket, result: Result<Page<T>, ApiError>) -> bool {
        if !self.data.finish(ticket, result) {
            return false;
        }
        if let Some(page) = self.data.value() {
            self.pagination.apply(page);
        }
        true
    }

    pub fn detach(&mut self) {
        self.data.detach();
    }

    pub fn items(&self) -> &[T] {
        self.data.value().map(|page| page.items.as_slice()).unwrap_or(&[])
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.data.error()
    }
}

/// Anything with an ordered photo sequence
pub trait PhotoSet {
    fn photos(&self) -> &[Photo];
}

impl PhotoSet for EventDetail {
    fn photos(&self) -> &[Photo] {
        &self.photos
    }
}

impl PhotoSet for GalleryDetail {
    fn photos(&self) -> &[Photo] {
        &self.photos
    }
}

/// A detail screen: the loaded item, a local photo filter and a lightbox
/// over the filtered photos
#[derive(Debug)]
pub struct DetailView<T> {
    data: Loadable<T>,
    filter: String,
    /// Indices into `photos()` that pass the filter
    visible: Vec<usize>,
    lightbox: Lightbox,
}

impl<T: PhotoSet> DetailView<T> {
    pub fn new(failure_message: &'static str) -> Self {
        Self {
            data: Loadable::new(failure_message),
            filter: String::new(),
            visible: Vec::new(),
            lightbox: Lightbox::default(),
        }
    }

    /// Start loading another item; the previous one is dropped right away
    pub fn load(&mut self) -> Ticket {
        self.data.clear();
        self.filter.clear();
        self.refilter();
        self.data.begin()
    }

    pub fn finish(&mut self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        if !self.data.finish(ticket, result) {
            return false;
        }
        self.filter.clear();
        self.refilter();
        true
    }

    pub fn detach(&mut self) {
        self.data.detach();
        self.lightbox.close();
    }

    pub fn set_filter(&mut self, filter: String) {
        self.filter = filter;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.lightbox.close();
        let needle = self.filter.trim().to_lowercase();
        self.visible = match self.data.value() {
            None => Vec::new(),
            Some(item) => item
                .photos()
                .iter()
                .enumerate()
                .filter(|(_, photo)| needle.is_empty() || photo.matches(&needle))
                .map(|(index, _)| index)
                .collect(),
        };
    }

    pub fn visible_photos(&self) -> Vec<&Photo> {
        let photos = self.data.value().map(PhotoSet::photos).unwrap_or(&[]);
        self.visible
            .iter()
            .filter_map(|&index| photos.get(index))
            .collect()
    }

    pub fn open(&mut self, position: usize) {
        self.lightbox.open(position, self.visible.len());
    }

    pub fn next(&mut self) {
        self.lightbox.next(self.visible.len());
    }

    pub fn previous(&mut self) {
        self.lightbox.previous();
    }

    pub fn close(&mut self) {
        self.lightbox.close();
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        let index = *self.lightbox.current(&self.visible)?;
        self.data.value()?.photos().get(index)
    }

    pub fn item(&self) -> Option<&T> {
        self.data.value()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_loading()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.data.error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Event;
    use std::collections::BTreeMap;

    fn page(items: Vec<u32>, current_page: u32, total_pages: u32) -> Page<u32> {
        Page {
            total_items: items.len() as u64,
            items,
            total_pages,
            current_page,
            page_size: None,
        }
    }

    fn photo(id: i64, file_name: &str) -> Photo {
        Photo {
            id,
            url: format!("https://cdn.ifoto.ir/{id}.jpg"),
            thumbnail_url: None,
            file_name: file_name.to_string(),
            bib_number: None,
            captured_at: None,
            metadata: BTreeMap::new(),
        }
    }

    fn detail(photos: Vec<Photo>) -> EventDetail {
        EventDetail {
            event: Event {
                id: 42,
                title: "Marathon".to_string(),
                description: None,
                cover_image_url: String::new(),
                date: None,
                location: None,
                photo_count: photos.len() as u32,
                category: None,
                status: None,
            },
            photos,
        }
    }

    #[test]
    fn test_list_load_and_paging() {
        let mut view: ListView<u32> = ListView::new("failed");
        let request = view.load();
        assert_eq!(request.page, 1);
        assert!(view.is_loading());

        assert!(view.finish(request.ticket, Ok(page(vec![1, 2], 1, 3))));
        assert_eq!(view.items(), &[1, 2]);
        assert_eq!(view.pagination().pages(), vec![1, 2, 3]);

        assert!(view.go_to_page(1).is_none());
        assert!(view.go_to_page(4).is_none());
        let request = view.go_to_page(3).unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.query, None);
    }

    #[test]
    fn test_search_resets_to_first_page() {
        let mut view: ListView<u32> = ListView::new("failed");
        let request = view.load();
        view.finish(request.ticket, Ok(page(vec![], 1, 5)));
        view.go_to_page(4).unwrap();

        view.set_query("   ".to_string());
        assert_eq!(view.search().unwrap_err(), ValidationError::EmptyQuery);

        view.set_query(" tehran ".to_string());
        let request = view.search().unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.query.as_deref(), Some("tehran"));

        let request = view.clear_search();
        assert_eq!(request.query, None);
        assert_eq!(view.query(), "");
    }

    #[test]
    fn test_stale_list_response_is_dropped() {
        let mut view: ListView<u32> = ListView::new("failed");
        let old = view.load();
        let new = view.load();

        assert!(!view.finish(old.ticket, Ok(page(vec![9], 1, 1))));
        assert!(view.items().is_empty());
        assert!(view.finish(new.ticket, Err(ApiError::Network("down".to_string()))));
        assert_eq!(view.error(), Some("failed"));

        let request = view.load();
        view.detach();
        assert!(!view.finish(request.ticket, Ok(page(vec![1], 1, 1))));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_detail_filter_drives_lightbox() {
        let mut view: DetailView<EventDetail> = DetailView::new("failed");
        let ticket = view.load();
        view.finish(
            ticket,
            Ok(detail(vec![
                photo(1, "start_001.jpg"),
                photo(2, "finish_001.jpg"),
                photo(3, "finish_002.jpg"),
            ])),
        );
        assert_eq!(view.visible_photos().len(), 3);

        view.set_filter("FINISH".to_string());
        let ids: Vec<i64> = view.visible_photos().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);

        view.open(0);
        view.previous();
        assert_eq!(view.current_photo().map(|p| p.id), Some(2));
        view.next();
        view.next();
        assert_eq!(view.current_photo().map(|p| p.id), Some(3));

        view.set_filter(String::new());
        assert!(!view.lightbox().is_open());
        assert_eq!(view.visible_photos().len(), 3);
    }

    #[test]
    fn test_failed_reload_drops_previous_item() {
        let mut view: DetailView<EventDetail> = DetailView::new("failed");
        let ticket = view.load();
        view.finish(ticket, Ok(detail(vec![photo(1, "a.jpg")])));
        assert_eq!(view.item().map(|d| d.event.id), Some(42));

        let ticket = view.load();
        assert!(view.item().is_none());
        assert!(view.visible_photos().is_empty());

        let not_found = ApiError::Status {
            status: 404,
            body: "Event not found".to_string(),
        };
        assert!(view.finish(ticket, Err(not_found)));
        assert!(view.item().is_none());
        assert!(view.current_photo().is_none());
        assert_eq!(view.error(), Some("failed"));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_loadable_error_replaces_value() {
        let mut photos: Loadable<Vec<u32>> = Loadable::new("failed");
        let ticket = photos.begin();
        photos.finish(ticket, Ok(vec![1, 2]));

        let ticket = photos.begin();
        photos.finish(ticket, Err(ApiError::Network("reset".to_string())));
        assert_eq!(photos.value(), None);
        assert_eq!(photos.error(), Some("failed"));
    }
}
