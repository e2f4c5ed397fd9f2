// contact.rs - Contact form with a simulated transport
//
// Nothing leaves the browser: a successful submission is a fixed delay.

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, FormData, HtmlFormElement};

use super::element_by_id;

/// User-facing submission failures. `Display` is the message shown.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in all fields.")]
    Incomplete,
    #[error("Something went wrong. Please try again later.")]
    Transport,
}

/// A validated, trimmed submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn validate(name: &str, email: &str, message: &str) -> Result<Submission, FormError> {
    let (name, email, message) = (name.trim(), email.trim(), message.trim());
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(FormError::Incomplete);
    }
    Ok(Submission {
        name: name.to_owned(),
        email: email.to_owned(),
        message: message.to_owned(),
    })
}

/// What the status line shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Sending,
    Sent,
    Failed(FormError),
}

impl Status {
    pub fn text(self) -> String {
        match self {
            Self::Sending => "Sending...".to_owned(),
            Self::Sent => "Thanks! Your message has been sent.".to_owned(),
            Self::Failed(err) => err.to_string(),
        }
    }

    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Sending => None,
            Self::Sent => Some("success"),
            Self::Failed(_) => Some("error"),
        }
    }
}

pub(super) struct ContactForm {
    _submit: EventListener,
}

impl ContactForm {
    pub(super) fn mount(delay_ms: u32) -> Option<Self> {
        let form = element_by_id::<HtmlFormElement>("contact-form")?;
        let status = element_by_id::<Element>("form-status")?;

        let target = form.clone();
        let listener = EventListener::new_with_options(
            &target,
            "submit",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                let (form, status) = (form.clone(), status.clone());
                spawn_local(async move {
                    submit(&form, &status, delay_ms).await;
                });
            },
        );
        Some(Self { _submit: listener })
    }
}

async fn submit(form: &HtmlFormElement, status: &Element, delay_ms: u32) {
    show(status, Status::Sending);

    let field = |data: &FormData, name: &str| data.get(name).as_string().unwrap_or_default();
    let submission = FormData::new_with_form(form)
        .map_err(|_| FormError::Transport)
        .and_then(|data| {
            validate(
                &field(&data, "name"),
                &field(&data, "email"),
                &field(&data, "message"),
            )
        });
    let submission = match submission {
        Ok(submission) => submission,
        Err(err) => {
            show(status, Status::Failed(err));
            return;
        }
    };

    match deliver(&submission, delay_ms).await {
        Ok(()) => {
            show(status, Status::Sent);
            form.reset();
        }
        Err(err) => show(status, Status::Failed(err)),
    }
}

async fn deliver(submission: &Submission, delay_ms: u32) -> Result<(), FormError> {
    gloo::console::debug!(format!("contact form from {}", submission.email));
    TimeoutFuture::new(delay_ms).await;
    Ok(())
}

fn show(element: &Element, status: Status) {
    element.set_text_content(Some(&status.text()));
    let classes = element.class_list();
    let _ = classes.remove_2("success", "error");
    if let Some(class) = status.class() {
        let _ = classes.add_1(class);
    }
}
