use iced::keyboard::{self, key};
use iced::widget::image::Handle;
use iced::futures::stream::{self, Stream};
use iced::{Element, Subscription, Task, Theme};
use rfd::FileDialog;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::photos::SearchOptions;
use crate::api::transport::{FilePart, HttpTransport, Transport};
use crate::api::Services;
use crate::config::Config;
use crate::error::{ApiError, StartupError, StorageError, UploadError};
use crate::images::{self, Preview, RemotePhoto, IMAGE_EXTENSIONS};
use crate::messages;
use crate::state::browse::{DetailView, ListRequest, ListView, Loadable};
use crate::state::data::{
    Credentials, Event, EventDetail, FaceSearchResult, Gallery, GalleryDetail, Page,
    ServiceStatus, Session, UploadedPhoto,
};
use crate::state::face_search::{FaceSearch, Phase};
use crate::state::lifetime::Ticket;
use crate::state::lightbox::Lightbox;
use crate::state::selection::LocalFile;
use crate::state::session::SessionStore;
use crate::state::storage::{KeyValueStore, SqliteStore};
use crate::state::upload::{UploadJob, UploadQueue};
use crate::ui;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Events,
    Event(i64),
    EventPhotos(i64),
    Galleries,
    Gallery(i64),
    FaceSearch(i64),
    Upload,
    Login,
    Health,
}

/// Photo currently shown in the viewer
#[derive(Debug, Clone)]
pub struct Viewer {
    pub url: String,
    pub handle: Option<Handle>,
    pub size: Option<(u32, u32)>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub submitting: bool,
    pub error: Option<&'static str>,
}

/// Main application state
pub struct IFoto {
    pub config: Config,
    services: Services,
    transport: Arc<HttpTransport>,
    pub session: Arc<SessionStore>,
    /// Last session published by the session store
    signed_in: Option<Session>,
    pub screen: Screen,
    pub events: ListView<Event>,
    pub galleries: ListView<Gallery>,
    pub event_detail: DetailView<EventDetail>,
    pub gallery_detail: DetailView<GalleryDetail>,
    pub event_photos: Loadable<Vec<UploadedPhoto>>,
    pub event_photos_viewer: Lightbox,
    pub face_search: FaceSearch,
    pub face_preview: Option<Handle>,
    pub match_viewer: Lightbox,
    pub upload: UploadQueue,
    pub upload_event: String,
    pub login: LoginForm,
    pub backend_health: ServiceStatus,
    pub face_service_health: ServiceStatus,
    pub viewer: Option<Viewer>,
    /// Status message to display to the user
    pub status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Screen),

    EventsLoaded(Ticket, Result<Page<Event>, ApiError>),
    EventsQueryChanged(String),
    SearchEvents,
    ClearEventSearch,
    EventsPage(u32),

    GalleriesLoaded(Ticket, Result<Page<Gallery>, ApiError>),
    GalleriesQueryChanged(String),
    SearchGalleries,
    ClearGallerySearch,
    GalleriesPage(u32),

    EventLoaded(Ticket, Result<EventDetail, ApiError>),
    GalleryLoaded(Ticket, Result<GalleryDetail, ApiError>),
    PhotoFilterChanged(String),
    EventPhotosLoaded(Ticket, Result<Vec<UploadedPhoto>, ApiError>),

    OpenPhoto(usize),
    NextPhoto,
    PreviousPhoto,
    ClosePhoto,
    PhotoFetched(String, Result<RemotePhoto, String>),

    PickFaceImage,
    FaceImageRead(Result<(FilePart, Option<Preview>), String>),
    SubmitFaceSearch,
    FaceSearchFinished(Ticket, Result<FaceSearchResult, ApiError>),
    ClearFaceSearch,

    PickUploadFiles,
    PickUploadFolder,
    UploadFilesFound(Vec<LocalFile>),
    RemoveUploadFile(usize),
    UploadEventChanged(String),
    StartUpload,
    UploadFinished(Ticket, Result<UploadedPhoto, UploadError>),
    CancelUpload,

    UsernameChanged(String),
    PasswordChanged(String),
    SubmitLogin,
    LoginFinished(Result<Session, ApiError>),
    SessionChanged(Option<Session>),
    Logout,

    CheckHealth,
    BackendHealth(ServiceStatus),
    FaceServiceHealth(ServiceStatus),
}

impl IFoto {
    /// Wire storage, session and HTTP client together and load the first screen
    pub fn new(config: Config) -> Result<(Self, Task<Message>), StartupError> {
        let storage: Arc<dyn KeyValueStore> = match SqliteStore::open_in(config.data_dir.as_deref()) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Could not open session database, sessions will not persist: {e}");
                Arc::new(SqliteStore::in_memory()?)
            }
        };
        let session = Arc::new(SessionStore::load(storage));
        let transport = Arc::new(HttpTransport::new(&config.api_url, session.clone())?);
        let port: Arc<dyn Transport> = transport.clone();
        let services = Services::new(port, session.clone());

        match session.get() {
            Some(user) => info!("🎨 iFoto initialized, signed in as {}", user.username),
            None => info!("🎨 iFoto initialized against {}", config.api_url),
        }

        let signed_in = session.get();
        let mut app = IFoto {
            services,
            transport,
            session,
            signed_in,
            screen: Screen::Events,
            events: ListView::new(messages::EVENTS_LOAD_FAILED),
            galleries: ListView::new(messages::GALLERIES_LOAD_FAILED),
            event_detail: DetailView::new(messages::EVENT_LOAD_FAILED),
            gallery_detail: DetailView::new(messages::GALLERY_LOAD_FAILED),
            event_photos: Loadable::new(messages::PHOTOS_LOAD_FAILED),
            event_photos_viewer: Lightbox::default(),
            face_search: FaceSearch::new(None),
            face_preview: None,
            match_viewer: Lightbox::default(),
            upload: UploadQueue::new(),
            upload_event: String::new(),
            login: LoginForm::default(),
            backend_health: ServiceStatus::Checking,
            face_service_health: ServiceStatus::Checking,
            viewer: None,
            status: "Ready.".to_string(),
            config,
        };
        let request = app.events.load();
        let task = app.fetch_events(request);
        Ok((app, task))
    }

    /// Handle application messages and update state
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(screen) => self.navigate(screen),

            Message::EventsLoaded(ticket, result) => {
                if !self.events.finish(ticket, result) {
                    debug!("dropping stale events page");
                }
                Task::none()
            }
            Message::EventsQueryChanged(query) => {
                self.events.set_query(query);
                Task::none()
            }
            Message::SearchEvents => match self.events.search() {
                Ok(request) => self.fetch_events(request),
                Err(e) => {
                    self.status = messages::validation(&e).to_string();
                    Task::none()
                }
            },
            Message::ClearEventSearch => {
                let request = self.events.clear_search();
                self.fetch_events(request)
            }
            Message::EventsPage(page) => match self.events.go_to_page(page) {
                Some(request) => self.fetch_events(request),
                None => Task::none(),
            },

            Message::GalleriesLoaded(ticket, result) => {
                if !self.galleries.finish(ticket, result) {
                    debug!("dropping stale galleries page");
                }
                Task::none()
            }
            Message::GalleriesQueryChanged(query) => {
                self.galleries.set_query(query);
                Task::none()
            }
            Message::SearchGalleries => match self.galleries.search() {
                Ok(request) => self.fetch_galleries(request),
                Err(e) => {
                    self.status = messages::validation(&e).to_string();
                    Task::none()
                }
            },
            Message::ClearGallerySearch => {
                let request = self.galleries.clear_search();
                self.fetch_galleries(request)
            }
            Message::GalleriesPage(page) => match self.galleries.go_to_page(page) {
                Some(request) => self.fetch_galleries(request),
                None => Task::none(),
            },

            Message::EventLoaded(ticket, result) => {
                self.event_detail.finish(ticket, result);
                Task::none()
            }
            Message::GalleryLoaded(ticket, result) => {
                self.gallery_detail.finish(ticket, result);
                Task::none()
            }
            Message::PhotoFilterChanged(filter) => {
                self.event_detail.set_filter(filter);
                self.sync_viewer()
            }
            Message::EventPhotosLoaded(ticket, result) => {
                self.event_photos.finish(ticket, result);
                Task::none()
            }

            Message::OpenPhoto(index) => {
                match self.screen {
                    Screen::Event(_) => self.event_detail.open(index),
                    Screen::Gallery(_) => self.gallery_detail.open(index),
                    Screen::EventPhotos(_) => {
                        let len = self.event_photos.value().map_or(0, Vec::len);
                        self.event_photos_viewer.open(index, len);
                    }
                    Screen::FaceSearch(_) => {
                        self.match_viewer.open(index, self.face_search.matches().len())
                    }
                    _ => {}
                }
                self.sync_viewer()
            }
            Message::NextPhoto => {
                match self.screen {
                    Screen::Event(_) => self.event_detail.next(),
                    Screen::Gallery(_) => self.gallery_detail.next(),
                    Screen::EventPhotos(_) => {
                        let len = self.event_photos.value().map_or(0, Vec::len);
                        self.event_photos_viewer.next(len);
                    }
                    Screen::FaceSearch(_) => {
                        self.match_viewer.next(self.face_search.matches().len())
                    }
                    _ => {}
                }
                self.sync_viewer()
            }
            Message::PreviousPhoto => {
                match self.screen {
                    Screen::Event(_) => self.event_detail.previous(),
                    Screen::Gallery(_) => self.gallery_detail.previous(),
                    Screen::EventPhotos(_) => self.event_photos_viewer.previous(),
                    Screen::FaceSearch(_) => self.match_viewer.previous(),
                    _ => {}
                }
                self.sync_viewer()
            }
            Message::ClosePhoto => {
                self.close_viewers();
                Task::none()
            }
            Message::PhotoFetched(url, result) => {
                let Some(viewer) = self.viewer.as_mut().filter(|v| v.url == url) else {
                    debug!("dropping photo for a closed viewer: {url}");
                    return Task::none();
                };
                match result {
                    Ok(photo) => {
                        viewer.size = Some((photo.width, photo.height));
                        viewer.handle = Some(Handle::from_bytes(photo.bytes));
                    }
                    Err(e) => {
                        warn!("{e}");
                        viewer.error = Some(e);
                    }
                }
                Task::none()
            }

            Message::PickFaceImage => {
                let file = FileDialog::new()
                    .set_title("Select a photo of your face")
                    .add_filter("Images", &IMAGE_EXTENSIONS[..])
                    .pick_file();

                match file {
                    Some(path) => Task::perform(images::read_with_preview(path), Message::FaceImageRead),
                    None => Task::none(),
                }
            }
            Message::FaceImageRead(Ok((file, preview))) => {
                match self.face_search.select(file) {
                    Ok(()) => {
                        self.match_viewer.close();
                        self.viewer = None;
                        self.face_preview = preview
                            .map(|p| Handle::from_rgba(p.width, p.height, p.rgba));
                        self.status.clear();
                    }
                    Err(e) => self.status = messages::validation(&e).to_string(),
                }
                Task::none()
            }
            Message::FaceImageRead(Err(e)) => {
                warn!("{e}");
                self.status = e;
                Task::none()
            }
            Message::SubmitFaceSearch => {
                let options = SearchOptions {
                    limit: self.config.search_limit,
                    threshold: self.config.search_threshold,
                };
                match self.face_search.submit(options) {
                    Ok(request) => {
                        self.match_viewer.close();
                        self.viewer = None;
                        let photos = self.services.photos.clone();
                        let ticket = request.ticket;
                        info!(event = request.event_id, "🔍 Searching by face");
                        Task::perform(
                            async move {
                                photos
                                    .search_by_face(request.event_id, request.file, request.options)
                                    .await
                            },
                            move |result| Message::FaceSearchFinished(ticket, result),
                        )
                    }
                    Err(e) => {
                        self.status = messages::validation(&e).to_string();
                        Task::none()
                    }
                }
            }
            Message::FaceSearchFinished(ticket, result) => {
                if self.face_search.complete(ticket, result) {
                    info!("📊 Face search returned {} matches", self.face_search.total_matches());
                }
                Task::none()
            }
            Message::ClearFaceSearch => {
                self.face_search.clear();
                self.face_preview = None;
                self.match_viewer.close();
                self.viewer = None;
                Task::none()
            }

            Message::PickUploadFiles => {
                let files = FileDialog::new()
                    .set_title("Select photos to upload")
                    .add_filter("Images", &IMAGE_EXTENSIONS[..])
                    .pick_files();

                match files {
                    Some(paths) => Task::perform(images::inspect_files(paths), Message::UploadFilesFound),
                    None => Task::none(),
                }
            }
            Message::PickUploadFolder => {
                let folder = FileDialog::new()
                    .set_title("Select a folder of photos")
                    .pick_folder();

                match folder {
                    Some(folder) => {
                        self.status = format!("Scanning {}...", folder.display());
                        Task::perform(
                            async move { images::inspect_files(images::image_files_in(&folder)).await },
                            Message::UploadFilesFound,
                        )
                    }
                    None => Task::none(),
                }
            }
            Message::UploadFilesFound(files) => {
                match self.upload.add_files(files) {
                    Ok(summary) => {
                        self.status = format!(
                            "Added {} photos, skipped {}.",
                            summary.added, summary.skipped
                        );
                    }
                    Err(e) => self.status = messages::validation(&e).to_string(),
                }
                Task::none()
            }
            Message::RemoveUploadFile(index) => {
                self.upload.remove(index);
                Task::none()
            }
            Message::UploadEventChanged(value) => {
                if self.upload.is_uploading() {
                    debug!("event id is locked while uploading");
                    return Task::none();
                }
                self.upload.set_event(value.trim().parse().ok());
                self.upload_event = value;
                Task::none()
            }
            Message::StartUpload => match self.upload.start() {
                Ok(job) => {
                    info!(event = job.event_id, files = self.upload.files().len(), "⏳ Uploading");
                    self.perform_upload(job)
                }
                Err(e) => {
                    self.status = messages::validation(&e).to_string();
                    Task::none()
                }
            },
            Message::UploadFinished(ticket, result) => {
                if let Some(job) = self.upload.complete(ticket, result) {
                    return self.perform_upload(job);
                }
                if let Some(summary) = self.upload.summary() {
                    info!("✅ {summary}");
                    self.status = summary;
                }
                Task::none()
            }
            Message::CancelUpload => {
                self.upload.cancel();
                self.status = "Upload cancelled.".to_string();
                Task::none()
            }

            Message::UsernameChanged(username) => {
                self.login.username = username;
                Task::none()
            }
            Message::PasswordChanged(password) => {
                self.login.password = password;
                Task::none()
            }
            Message::SubmitLogin => {
                if self.login.submitting {
                    return Task::none();
                }
                if self.login.username.trim().is_empty() || self.login.password.is_empty() {
                    self.login.error = Some(messages::LOGIN_FAILED);
                    return Task::none();
                }
                self.login.submitting = true;
                self.login.error = None;

                let auth = self.services.auth.clone();
                let credentials = Credentials {
                    username: self.login.username.trim().to_string(),
                    password: self.login.password.clone(),
                };
                Task::perform(
                    async move { auth.login(&credentials).await },
                    Message::LoginFinished,
                )
            }
            Message::LoginFinished(result) => {
                self.login.submitting = false;
                match result {
                    Ok(session) => {
                        self.login.password.clear();
                        self.status = format!("Signed in as {}.", session.username);
                        self.navigate(Screen::Events)
                    }
                    Err(e) => {
                        warn!("Login failed: {e}");
                        self.login.error = Some(messages::LOGIN_FAILED);
                        Task::none()
                    }
                }
            }
            Message::SessionChanged(session) => {
                debug!(signed_in = session.is_some(), "session changed");
                self.signed_in = session;
                Task::none()
            }
            Message::Logout => {
                self.status = match self.services.auth.logout() {
                    Ok(()) => "Signed out.".to_string(),
                    Err(e) => log_storage_failure(e),
                };
                Task::none()
            }

            Message::CheckHealth => {
                self.backend_health = ServiceStatus::Checking;
                self.face_service_health = ServiceStatus::Checking;
                let backend = self.services.health.clone();
                let face = self.services.health.clone();
                Task::batch([
                    Task::perform(async move { backend.backend().await }, Message::BackendHealth),
                    Task::perform(async move { face.face_service().await }, Message::FaceServiceHealth),
                ])
            }
            Message::BackendHealth(status) => {
                self.backend_health = status;
                Task::none()
            }
            Message::FaceServiceHealth(status) => {
                self.face_service_health = status;
                Task::none()
            }
        }
    }

    /// Build the user interface
    pub fn view(&self) -> Element<Message> {
        ui::view(self)
    }

    /// Set the application theme
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Arrow keys page through the open viewer, Escape closes it.
    /// Session changes arrive as `SessionChanged`.
    pub fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::NextPhoto),
            keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::PreviousPhoto),
            keyboard::Key::Named(key::Named::Escape) => Some(Message::ClosePhoto),
            _ => None,
        });
        let session = Subscription::run_with_id(
            "session",
            session_changes(self.session.subscribe()),
        );
        Subscription::batch([keys, session])
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<Session> {
        self.signed_in.clone()
    }

    fn navigate(&mut self, screen: Screen) -> Task<Message> {
        self.leave(self.screen);
        self.screen = screen;
        debug!(?screen, "navigate");

        match screen {
            Screen::Events => {
                let request = self.events.load();
                self.fetch_events(request)
            }
            Screen::Galleries => {
                let request = self.galleries.load();
                self.fetch_galleries(request)
            }
            Screen::Event(id) => {
                let ticket = self.event_detail.load();
                let events = self.services.events.clone();
                Task::perform(async move { events.get(id).await }, move |result| {
                    Message::EventLoaded(ticket, result)
                })
            }
            Screen::Gallery(id) => {
                let ticket = self.gallery_detail.load();
                let galleries = self.services.galleries.clone();
                Task::perform(async move { galleries.get(id).await }, move |result| {
                    Message::GalleryLoaded(ticket, result)
                })
            }
            Screen::EventPhotos(id) => {
                self.event_photos.clear();
                let ticket = self.event_photos.begin();
                let events = self.services.events.clone();
                Task::perform(async move { events.photos(id).await }, move |result| {
                    Message::EventPhotosLoaded(ticket, result)
                })
            }
            Screen::FaceSearch(id) => {
                if self.face_search.event_id() != Some(id) {
                    self.face_preview = None;
                }
                self.face_search.set_event(id);
                Task::none()
            }
            Screen::Upload => Task::none(),
            Screen::Login => {
                self.login.error = None;
                Task::none()
            }
            Screen::Health => self.update(Message::CheckHealth),
        }
    }

    /// Stop listening for the screen being left
    fn leave(&mut self, screen: Screen) {
        self.close_viewers();
        match screen {
            Screen::Events => self.events.detach(),
            Screen::Galleries => self.galleries.detach(),
            Screen::Event(_) => self.event_detail.detach(),
            Screen::Gallery(_) => self.gallery_detail.detach(),
            Screen::EventPhotos(_) => self.event_photos.detach(),
            Screen::FaceSearch(_) => {
                if self.face_search.phase() == Phase::Searching {
                    self.face_search.clear();
                    self.face_preview = None;
                }
            }
            Screen::Upload | Screen::Login | Screen::Health => {}
        }
    }

    fn close_viewers(&mut self) {
        self.event_detail.close();
        self.gallery_detail.close();
        self.event_photos_viewer.close();
        self.match_viewer.close();
        self.viewer = None;
    }

    /// URL of the photo the open lightbox points at
    fn viewer_url(&self) -> Option<String> {
        match self.screen {
            Screen::Event(_) => self.event_detail.current_photo().map(|p| p.url.clone()),
            Screen::Gallery(_) => self.gallery_detail.current_photo().map(|p| p.url.clone()),
            Screen::EventPhotos(_) => self
                .event_photos
                .value()
                .and_then(|photos| self.event_photos_viewer.current(photos))
                .map(|p| p.storage_path.clone()),
            Screen::FaceSearch(_) => self
                .match_viewer
                .current(self.face_search.matches())
                .map(|m| m.photo_url.clone()),
            _ => None,
        }
    }

    /// Fetch the photo behind the lightbox when it changed
    fn sync_viewer(&mut self) -> Task<Message> {
        let Some(url) = self.viewer_url() else {
            self.viewer = None;
            return Task::none();
        };
        if self.viewer.as_ref().is_some_and(|v| v.url == url) {
            return Task::none();
        }

        self.viewer = Some(Viewer {
            url: url.clone(),
            handle: None,
            size: None,
            error: None,
        });
        let transport = self.transport.clone();
        Task::perform(images::load_photo(transport, url.clone()), move |result| {
            Message::PhotoFetched(url.clone(), result)
        })
    }

    fn fetch_events(&self, request: ListRequest) -> Task<Message> {
        let events = self.services.events.clone();
        let page_size = self.config.page_size;
        let ListRequest {
            ticket,
            page,
            query,
        } = request;

        Task::perform(
            async move {
                match query {
                    Some(query) => events.search(&query, page).await,
                    None => events.list(page, page_size).await,
                }
            },
            move |result| Message::EventsLoaded(ticket, result),
        )
    }

    fn fetch_galleries(&self, request: ListRequest) -> Task<Message> {
        let galleries = self.services.galleries.clone();
        let page_size = self.config.page_size;
        let ListRequest {
            ticket,
            page,
            query,
        } = request;

        Task::perform(
            async move {
                match query {
                    Some(query) => galleries.search(&query, page).await,
                    None => galleries.list(page, page_size).await,
                }
            },
            move |result| Message::GalleriesLoaded(ticket, result),
        )
    }

    fn perform_upload(&mut self, job: UploadJob) -> Task<Message> {
        if let Some((position, total)) = self.upload.progress() {
            self.status = format!("Uploading {} ({position}/{total})...", job.file.file_name);
        }
        let photos = self.services.photos.clone();
        let UploadJob {
            ticket,
            event_id,
            file,
        } = job;

        Task::perform(
            async move {
                let part = images::read_file(file.path).await.map_err(UploadError::Read)?;
                photos.upload(event_id, part).await.map_err(UploadError::from)
            },
            move |result| Message::UploadFinished(ticket, result),
        )
    }
}

/// One `SessionChanged` per value published after the receiver was created
fn session_changes(receiver: watch::Receiver<Option<Session>>) -> impl Stream<Item = Message> {
    stream::unfold(receiver, |mut receiver| async move {
        receiver.changed().await.ok()?;
        let session = receiver.borrow_and_update().clone();
        Some((Message::SessionChanged(session), receiver))
    })
}

fn log_storage_failure(e: StorageError) -> String {
    error!("Could not clear stored session: {e}");
    format!("Sign out failed: {e}")
}
