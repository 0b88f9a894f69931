/// User interface module
///
/// This module handles:
/// - The navigation header and screen dispatch
/// - List, detail and lightbox screens (browse.rs, viewer.rs)
/// - Face search, upload and account screens
/// - The face box overlay canvas (face_overlay.rs)
pub mod account;
pub mod browse;
pub mod face_overlay;
pub mod face_search;
pub mod upload;
pub mod viewer;

use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, text_input};
use iced::{Color, Element, Length, Theme};
use iced_aw::Wrap;

use crate::app::{IFoto, Message, Screen};
use crate::state::pagination::Pagination;

const ERROR_COLOR: Color = Color {
    r: 0.90,
    g: 0.35,
    b: 0.35,
    a: 1.0,
};

/// Build the whole window for the current screen
pub fn view(app: &IFoto) -> Element<'_, Message> {
    let body = match (&app.viewer, app.screen) {
        (Some(open), _) => viewer::view(app, open),
        (None, Screen::Events) => browse::events(app),
        (None, Screen::Galleries) => browse::galleries(app),
        (None, Screen::Event(_)) => browse::event_detail(app),
        (None, Screen::Gallery(_)) => browse::gallery_detail(app),
        (None, Screen::EventPhotos(id)) => browse::event_photos(app, id),
        (None, Screen::FaceSearch(_)) => face_search::view(app),
        (None, Screen::Upload) => upload::view(app),
        (None, Screen::Login) => account::login(app),
        (None, Screen::Health) => account::health(app),
    };

    let content = column![
        header(app),
        container(body).width(Length::Fill).height(Length::Fill),
        text(&app.status).size(14),
    ]
    .spacing(16)
    .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn header(app: &IFoto) -> Element<'_, Message> {
    let nav = |label: &'static str, screen: Screen| {
        button(label)
            .style(highlight(app.screen == screen))
            .padding(8)
            .on_press(Message::Navigate(screen))
    };

    let account: Element<Message> = match app.current_user() {
        Some(user) => row![
            text(user.username).size(14),
            button("Sign out")
                .style(button::text)
                .on_press(Message::Logout),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center)
        .into(),
        None => nav("Sign in", Screen::Login).into(),
    };

    row![
        text("iFoto").size(28),
        nav("Events", Screen::Events),
        nav("Galleries", Screen::Galleries),
        nav("Upload", Screen::Upload),
        nav("Health", Screen::Health),
        horizontal_space(),
        account,
    ]
    .spacing(12)
    .align_y(iced::Alignment::Center)
    .into()
}

/// Screen title
pub(crate) fn title<'a>(label: impl ToString) -> Element<'a, Message> {
    text(label.to_string()).size(32).into()
}

/// Primary style for the active choice, secondary otherwise
pub(crate) fn highlight(active: bool) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |theme, status| {
        if active {
            button::primary(theme, status)
        } else {
            button::secondary(theme, status)
        }
    }
}

pub(crate) fn error_text<'a>(message: &'a str) -> Element<'a, Message> {
    text(message).color(ERROR_COLOR).into()
}

/// Loading and error placeholder, `None` when there is content to show
pub(crate) fn placeholder<'a>(loading: bool, error: Option<&'a str>) -> Option<Element<'a, Message>> {
    if loading {
        Some(text("Loading...").into())
    } else {
        error.map(error_text)
    }
}

/// Cards laid out in a wrapping, scrollable grid
pub(crate) fn grid<'a>(cards: Vec<Element<'a, Message>>, empty: &'a str) -> Element<'a, Message> {
    if cards.is_empty() {
        return text(empty).into();
    }
    scrollable(Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0))
        .height(Length::Fill)
        .into()
}

pub(crate) fn search_bar<'a>(
    query: &'a str,
    active: Option<&'a str>,
    on_input: fn(String) -> Message,
    search: Message,
    clear: Message,
) -> Element<'a, Message> {
    let mut bar = row![
        text_input("Search...", query)
            .on_input(on_input)
            .on_submit(search.clone())
            .padding(8)
            .width(320),
        button("Search").padding(8).on_press(search),
    ]
    .spacing(8)
    .align_y(iced::Alignment::Center);

    if let Some(active) = active {
        bar = bar
            .push(text(format!("Results for \"{active}\"")).size(14))
            .push(button("Clear").style(button::text).on_press(clear));
    }
    bar.into()
}

/// Previous, numbered pages, next
pub(crate) fn pagination_bar<'a>(
    pagination: &Pagination,
    on_page: fn(u32) -> Message,
) -> Element<'a, Message> {
    let current = pagination.current_page;
    let last = pagination.total_pages;

    let mut bar = row![button("‹")
        .style(button::secondary)
        .on_press_maybe((current > 1).then(|| on_page(current - 1)))]
    .spacing(6);

    for page in pagination.pages() {
        bar = bar.push(
            button(text(page.to_string()))
                .style(highlight(page == current))
                .on_press(on_page(page)),
        );
    }

    bar.push(
        button("›")
            .style(button::secondary)
            .on_press_maybe((current < last).then(|| on_page(current + 1))),
    )
    .push(text(format!("{} items", pagination.total_items)).size(14))
    .align_y(iced::Alignment::Center)
    .into()
}
