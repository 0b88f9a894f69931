/// Event and gallery lists, their detail pages and the uploaded-photos page
use chrono::NaiveDate;
use iced::widget::{button, column, row, text, text_input, Column};
use iced::{Alignment, Element};

use super::{grid, pagination_bar, placeholder, search_bar, title};
use crate::app::{IFoto, Message, Screen};
use crate::state::data::{Event, Gallery, Photo, UploadedPhoto};

const CARD_WIDTH: u16 = 220;

pub fn events(app: &IFoto) -> Element<'_, Message> {
    let list = &app.events;
    let body = placeholder(list.is_loading(), list.error()).unwrap_or_else(|| {
        grid(list.items().iter().map(event_card).collect(), "No events found.")
    });

    column![
        title("Events"),
        search_bar(
            list.query(),
            list.active_query(),
            Message::EventsQueryChanged,
            Message::SearchEvents,
            Message::ClearEventSearch,
        ),
        body,
        pagination_bar(list.pagination(), Message::EventsPage),
    ]
    .spacing(16)
    .into()
}

pub fn galleries(app: &IFoto) -> Element<'_, Message> {
    let list = &app.galleries;
    let body = placeholder(list.is_loading(), list.error()).unwrap_or_else(|| {
        grid(list.items().iter().map(gallery_card).collect(), "No galleries found.")
    });

    column![
        title("Galleries"),
        search_bar(
            list.query(),
            list.active_query(),
            Message::GalleriesQueryChanged,
            Message::SearchGalleries,
            Message::ClearGallerySearch,
        ),
        body,
        pagination_bar(list.pagination(), Message::GalleriesPage),
    ]
    .spacing(16)
    .into()
}

fn event_card(event: &Event) -> Element<'_, Message> {
    let mut info = column![text(&event.title).size(18)].spacing(4);
    if let Some(line) = date_and_place(event.date, event.location.as_deref()) {
        info = info.push(text(line).size(13));
    }
    if let Some(category) = &event.category {
        info = info.push(text(category).size(13));
    }
    info = info.push(text(format!("{} photos", event.photo_count)).size(13));

    button(info)
        .width(CARD_WIDTH)
        .padding(12)
        .on_press(Message::Navigate(Screen::Event(event.id)))
        .into()
}

fn gallery_card(gallery: &Gallery) -> Element<'_, Message> {
    let mut info = column![text(&gallery.title).size(18)].spacing(4);
    if let Some(line) = date_and_place(gallery.date, gallery.location.as_deref()) {
        info = info.push(text(line).size(13));
    }
    info = info.push(text(format!("{} photos", gallery.photo_count)).size(13));

    button(info)
        .width(CARD_WIDTH)
        .padding(12)
        .on_press(Message::Navigate(Screen::Gallery(gallery.id)))
        .into()
}

fn date_and_place(date: Option<NaiveDate>, location: Option<&str>) -> Option<String> {
    match (date, location) {
        (Some(date), Some(location)) => Some(format!("{} · {}", date.format("%Y-%m-%d"), location)),
        (Some(date), None) => Some(date.format("%Y-%m-%d").to_string()),
        (None, Some(location)) => Some(location.to_string()),
        (None, None) => None,
    }
}

pub fn event_detail(app: &IFoto) -> Element<'_, Message> {
    let view = &app.event_detail;
    let back = button("← Events").on_press(Message::Navigate(Screen::Events));

    let Some(detail) = view.item().filter(|_| !view.is_loading() && view.error().is_none()) else {
        let status = placeholder(view.is_loading(), view.error())
            .unwrap_or_else(|| text("Event not found.").into());
        return column![back, status].spacing(16).into();
    };
    let event = &detail.event;

    let mut heading = Column::new().spacing(6).push(title(&event.title));
    if let Some(line) = date_and_place(event.date, event.location.as_deref()) {
        heading = heading.push(text(line).size(14));
    }
    if let Some(description) = &event.description {
        heading = heading.push(text(description));
    }

    let actions = row![
        button("Find my photos").on_press(Message::Navigate(Screen::FaceSearch(event.id))),
        button("Uploaded photos")
            .style(button::secondary)
            .on_press(Message::Navigate(Screen::EventPhotos(event.id))),
    ]
    .spacing(8);

    let photos = view.visible_photos();
    let count = if view.filter().trim().is_empty() {
        format!("{} photos", photos.len())
    } else {
        format!("{} of {} photos", photos.len(), detail.photos.len())
    };
    let filter = row![
        text_input("Filter by file name or bib number", view.filter())
            .on_input(Message::PhotoFilterChanged)
            .padding(8)
            .width(320),
        text(count).size(14),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let tiles = photos
        .into_iter()
        .enumerate()
        .map(|(position, photo)| photo_tile(position, photo))
        .collect();

    column![
        back,
        heading,
        actions,
        filter,
        grid(tiles, "No photos match the filter."),
    ]
    .spacing(16)
    .into()
}

pub fn gallery_detail(app: &IFoto) -> Element<'_, Message> {
    let view = &app.gallery_detail;
    let back = button("← Galleries").on_press(Message::Navigate(Screen::Galleries));

    let Some(detail) = view.item().filter(|_| !view.is_loading() && view.error().is_none()) else {
        let status = placeholder(view.is_loading(), view.error())
            .unwrap_or_else(|| text("Gallery not found.").into());
        return column![back, status].spacing(16).into();
    };
    let gallery = &detail.gallery;

    let mut heading = Column::new().spacing(6).push(title(&gallery.title));
    if let Some(line) = date_and_place(gallery.date, gallery.location.as_deref()) {
        heading = heading.push(text(line).size(14));
    }
    if let Some(description) = &gallery.description {
        heading = heading.push(text(description));
    }

    let tiles = view
        .visible_photos()
        .into_iter()
        .enumerate()
        .map(|(position, photo)| photo_tile(position, photo))
        .collect();

    column![back, heading, grid(tiles, "This gallery has no photos yet.")]
        .spacing(16)
        .into()
}

fn photo_tile(position: usize, photo: &Photo) -> Element<'_, Message> {
    let mut info = column![text(&photo.file_name).size(14)].spacing(4);
    if let Some(bib) = &photo.bib_number {
        info = info.push(text(format!("Bib {bib}")).size(13));
    }
    if let Some(captured_at) = photo.captured_at {
        info = info.push(text(captured_at.format("%Y-%m-%d %H:%M").to_string()).size(12));
    }

    button(info)
        .style(button::secondary)
        .width(CARD_WIDTH)
        .padding(10)
        .on_press(Message::OpenPhoto(position))
        .into()
}

pub fn event_photos(app: &IFoto, event_id: i64) -> Element<'_, Message> {
    let photos = &app.event_photos;
    let back = button("← Event").on_press(Message::Navigate(Screen::Event(event_id)));

    let body = match placeholder(photos.is_loading(), photos.error()) {
        Some(status) => status,
        None => {
            let tiles = photos
                .value()
                .map(|list| {
                    list.iter()
                        .enumerate()
                        .map(|(position, photo)| uploaded_tile(position, photo))
                        .collect()
                })
                .unwrap_or_default();
            grid(tiles, "No photos have been uploaded to this event.")
        }
    };

    let mut page = column![back, title(format!("Uploaded photos · event #{event_id}"))].spacing(16);
    if let Some(list) = photos.value().filter(|_| !photos.is_loading() && photos.error().is_none()) {
        let faces: u32 = list.iter().map(|p| p.face_count).sum();
        page = page.push(text(format!("{} photos, {} faces indexed", list.len(), faces)).size(14));
    }
    page.push(body).into()
}

fn uploaded_tile(position: usize, photo: &UploadedPhoto) -> Element<'_, Message> {
    let mut info = column![
        text(&photo.file_name).size(14),
        text(format!("{} faces", photo.face_count)).size(13),
    ]
    .spacing(4);
    if let Some(size) = photo.file_size {
        info = info.push(text(format_size(size)).size(12));
    }
    if let Some(uploaded_at) = photo.uploaded_at {
        info = info.push(text(uploaded_at.format("%Y-%m-%d %H:%M").to_string()).size(12));
    }

    button(info)
        .style(button::secondary)
        .width(CARD_WIDTH)
        .padding(10)
        .on_press(Message::OpenPhoto(position))
        .into()
}

/// Human readable byte count
pub(crate) fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let size = bytes as f64;
    if size >= MB {
        format!("{:.1} MB", size / MB)
    } else if size >= KB {
        format!("{:.0} KB", size / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }

    #[test]
    fn test_date_and_place() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 3);
        assert_eq!(
            date_and_place(date, Some("Tehran")).as_deref(),
            Some("2024-05-03 · Tehran")
        );
        assert_eq!(date_and_place(None, Some("Tehran")).as_deref(), Some("Tehran"));
        assert_eq!(date_and_place(None, None), None);
    }
}
