use iced::widget::{button, column, image, row, text};
use iced::{Alignment, Element};

use super::face_overlay::tier_color;
use super::{error_text, grid, title};
use crate::app::{IFoto, Message, Screen};
use crate::state::data::PhotoMatch;
use crate::state::face_search::{similarity_percent, Phase, SimilarityTier};

pub fn view(app: &IFoto) -> Element<'_, Message> {
    let search = &app.face_search;
    let phase = search.phase();
    let searching = phase == Phase::Searching;

    let back: Element<Message> = match search.event_id() {
        Some(id) => button("← Event")
            .on_press(Message::Navigate(Screen::Event(id)))
            .into(),
        None => button("← Events")
            .on_press(Message::Navigate(Screen::Events))
            .into(),
    };

    let actions = row![
        button("Choose photo").on_press_maybe((!searching).then_some(Message::PickFaceImage)),
        button(if searching { "Searching..." } else { "Search" }).on_press_maybe(
            matches!(phase, Phase::FilePicked | Phase::Results | Phase::Failed)
                .then_some(Message::SubmitFaceSearch)
        ),
        button("Clear")
            .style(button::secondary)
            .on_press_maybe((phase != Phase::Empty).then_some(Message::ClearFaceSearch)),
    ]
    .spacing(8);

    let mut selection = row![].spacing(16).align_y(Alignment::Center);
    if let Some(preview) = &app.face_preview {
        selection = selection.push(image(preview.clone()).width(160).height(160));
    }
    match search.file() {
        Some(file) => {
            selection = selection.push(
                column![
                    text(&file.file_name),
                    text(format!("{} KB", file.bytes.len() / 1024)).size(13),
                ]
                .spacing(4),
            )
        }
        None => {
            selection = selection.push(text("Upload a clear photo of your face to find every photo you appear in."))
        }
    }

    let mut page = column![
        back,
        title(match search.event_id() {
            Some(id) => format!("Find my photos · event #{id}"),
            None => "Find my photos".to_string(),
        }),
        actions,
        selection,
    ]
    .spacing(16);

    if let Some(message) = search.message() {
        page = page.push(if phase == Phase::Failed {
            error_text(message)
        } else {
            text(message).into()
        });
    }

    if phase == Phase::Results && !search.matches().is_empty() {
        let cards = search
            .matches()
            .iter()
            .enumerate()
            .map(|(position, found)| match_card(position, found))
            .collect();
        page = page
            .push(text(format!("{} matches", search.total_matches())).size(18))
            .push(grid(cards, ""));
    }

    page.into()
}

fn match_card(position: usize, found: &PhotoMatch) -> Element<'_, Message> {
    let tier = SimilarityTier::from_score(found.similarity);
    let info = column![
        text(format!("{}%", similarity_percent(found.similarity)))
            .size(22)
            .color(tier_color(tier)),
        text(format!("Photo #{}", found.photo_id)).size(13),
        text(if found.face_location.is_some() {
            "Face located"
        } else {
            "No face box"
        })
        .size(12),
    ]
    .spacing(4);

    button(info)
        .style(button::secondary)
        .width(180)
        .padding(10)
        .on_press(Message::OpenPhoto(position))
        .into()
}
