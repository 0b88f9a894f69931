/// Sign-in form and service health
use iced::widget::{button, column, row, text, text_input};
use iced::{Alignment, Color, Element};

use super::{error_text, title};
use crate::app::{IFoto, Message};
use crate::state::data::ServiceStatus;

pub fn login(app: &IFoto) -> Element<'_, Message> {
    if let Some(user) = app.current_user() {
        return column![
            title("Account"),
            text(format!("Signed in as {} ({})", user.username, user.role)),
            text(user.email).size(14),
            button("Sign out").on_press(Message::Logout),
        ]
        .spacing(12)
        .into();
    }

    let form = &app.login;
    let submit = (!form.submitting).then_some(Message::SubmitLogin);

    let mut page = column![
        title("Sign in"),
        text_input("Username", &form.username)
            .on_input(Message::UsernameChanged)
            .padding(8)
            .width(320),
        text_input("Password", &form.password)
            .on_input(Message::PasswordChanged)
            .on_submit_maybe(submit.clone())
            .secure(true)
            .padding(8)
            .width(320),
        button(if form.submitting { "Signing in..." } else { "Sign in" }).on_press_maybe(submit),
    ]
    .spacing(12);

    if let Some(error) = form.error {
        page = page.push(error_text(error));
    }
    page.into()
}

pub fn health(app: &IFoto) -> Element<'_, Message> {
    column![
        title("Service health"),
        text(format!("Backend: {}", app.config.api_url)).size(14),
        status_row("API", &app.backend_health),
        status_row("Face recognition", &app.face_service_health),
        button("Check again").on_press(Message::CheckHealth),
    ]
    .spacing(12)
    .into()
}

fn status_row<'a>(label: &'a str, status: &'a ServiceStatus) -> Element<'a, Message> {
    let (summary, color) = match status {
        ServiceStatus::Checking => ("checking...".to_string(), Color::from_rgb(0.65, 0.65, 0.65)),
        ServiceStatus::Healthy => ("healthy".to_string(), Color::from_rgb(0.30, 0.75, 0.40)),
        ServiceStatus::Unhealthy(reason) => (
            format!("unavailable ({reason})"),
            Color::from_rgb(0.90, 0.35, 0.35),
        ),
    };

    row![text(label).width(180), text(summary).color(color)]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}
