use iced::widget::{button, column, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use super::browse::format_size;
use super::{error_text, title};
use crate::app::{IFoto, Message};

pub fn view(app: &IFoto) -> Element<'_, Message> {
    let queue = &app.upload;
    let idle = !queue.is_uploading();

    let target = row![
        text("Event id"),
        text_input("e.g. 42", &app.upload_event)
            .on_input_maybe(idle.then_some(Message::UploadEventChanged))
            .padding(8)
            .width(160),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut actions = row![
        button("Add photos").on_press_maybe(idle.then_some(Message::PickUploadFiles)),
        button("Add folder")
            .style(button::secondary)
            .on_press_maybe(idle.then_some(Message::PickUploadFolder)),
        button("Upload").on_press_maybe(
            (idle && !queue.files().is_empty() && queue.event_id().is_some())
                .then_some(Message::StartUpload)
        ),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    if let Some((position, total)) = queue.progress() {
        actions = actions
            .push(text(format!("Uploading {position} of {total}...")))
            .push(button("Cancel").style(button::danger).on_press(Message::CancelUpload));
    }

    let files = queue
        .files()
        .iter()
        .enumerate()
        .fold(Column::new().spacing(6), |list, (index, file)| {
            list.push(
                row![
                    text(&file.file_name).width(Length::Fill),
                    text(format_size(file.size)).size(13),
                    button("Remove")
                        .style(button::text)
                        .on_press_maybe(idle.then_some(Message::RemoveUploadFile(index))),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            )
        });

    let mut page = column![
        title("Upload photos"),
        target,
        actions,
        text(format!("{} photos queued", queue.files().len())).size(14),
        scrollable(files).height(Length::Fill),
    ]
    .spacing(16);

    if idle && !queue.failed().is_empty() {
        let failures = queue
            .failed()
            .iter()
            .fold(Column::new().spacing(4), |list, (name, error)| {
                list.push(error_text(name))
                    .push(text(error.to_string()).size(12))
            });
        page = page.push(failures);
    }

    page.into()
}
