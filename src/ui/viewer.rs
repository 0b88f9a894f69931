/// Full-size photo viewer shared by every lightbox
use iced::widget::{button, canvas, column, container, horizontal_space, image, row, stack, text};
use iced::{Alignment, ContentFit, Element, Length};

use super::face_overlay::{tier_color, FaceOverlay};
use super::error_text;
use crate::app::{IFoto, Message, Screen, Viewer};
use crate::state::data::FaceLocation;
use crate::state::face_search::{similarity_percent, SimilarityTier};

/// What to print under the photo and what to draw on it
struct Caption {
    text: String,
    position: Option<usize>,
    len: usize,
    face: Option<(FaceLocation, SimilarityTier)>,
}

pub fn view<'a>(app: &'a IFoto, viewer: &'a Viewer) -> Element<'a, Message> {
    let caption = caption(app);

    let photo: Element<Message> = match (&viewer.handle, viewer.size) {
        (Some(handle), Some(size)) => {
            let picture = image(handle.clone())
                .content_fit(ContentFit::ScaleDown)
                .width(Length::Fill)
                .height(Length::Fill);

            match caption.face {
                Some((face, tier)) => stack![
                    picture,
                    canvas(FaceOverlay {
                        image_size: size,
                        face,
                        tier,
                    })
                    .width(Length::Fill)
                    .height(Length::Fill),
                ]
                .into(),
                None => picture.into(),
            }
        }
        _ => match &viewer.error {
            Some(error) => error_text(error),
            None => text("Loading photo...").into(),
        },
    };

    let counter = match caption.position {
        Some(index) => format!("{} / {}", index + 1, caption.len),
        None => String::new(),
    };
    let at_start = caption.position.map_or(true, |index| index == 0);
    let at_end = caption.position.map_or(true, |index| index + 1 >= caption.len);

    let mut label = text(caption.text).size(16);
    if let Some((_, tier)) = caption.face {
        label = label.color(tier_color(tier));
    }

    let controls = row![
        button("‹ Previous").on_press_maybe((!at_start).then_some(Message::PreviousPhoto)),
        text(counter).size(14),
        button("Next ›").on_press_maybe((!at_end).then_some(Message::NextPhoto)),
        label,
        horizontal_space(),
        button("Close").style(button::secondary).on_press(Message::ClosePhoto),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    column![
        container(photo)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill),
        controls,
    ]
    .spacing(12)
    .into()
}

fn caption(app: &IFoto) -> Caption {
    match app.screen {
        Screen::Event(_) => {
            let view = &app.event_detail;
            Caption {
                text: view
                    .current_photo()
                    .map(|photo| photo.file_name.clone())
                    .unwrap_or_default(),
                position: view.lightbox().index(),
                len: view.visible_photos().len(),
                face: None,
            }
        }
        Screen::Gallery(_) => {
            let view = &app.gallery_detail;
            Caption {
                text: view
                    .current_photo()
                    .map(|photo| photo.file_name.clone())
                    .unwrap_or_default(),
                position: view.lightbox().index(),
                len: view.visible_photos().len(),
                face: None,
            }
        }
        Screen::EventPhotos(_) => {
            let photos = app.event_photos.value().map(Vec::as_slice).unwrap_or(&[]);
            Caption {
                text: app
                    .event_photos_viewer
                    .current(photos)
                    .map(|photo| format!("{} · {} faces", photo.file_name, photo.face_count))
                    .unwrap_or_default(),
                position: app.event_photos_viewer.index(),
                len: photos.len(),
                face: None,
            }
        }
        Screen::FaceSearch(_) => {
            let matches = app.face_search.matches();
            let current = app.match_viewer.current(matches);
            Caption {
                text: current
                    .map(|found| format!("{}% match", similarity_percent(found.similarity)))
                    .unwrap_or_default(),
                position: app.match_viewer.index(),
                len: matches.len(),
                face: current.and_then(|found| {
                    found
                        .face_location
                        .map(|face| (face, SimilarityTier::from_score(found.similarity)))
                }),
            }
        }
        _ => Caption {
            text: String::new(),
            position: None,
            len: 0,
            face: None,
        },
    }
}
