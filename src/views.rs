use handlebars::Handlebars;
use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

const FLASH_PARTIAL: &str = include_str!("../templates/flash.hbs");
const LOGIN_TEMPLATE: &str = include_str!("../templates/login.hbs");
const SIGNUP_TEMPLATE: &str = include_str!("../templates/signup.hbs");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Signup,
}

impl Page {
    fn template(&self) -> &'static str {
        match self {
            Page::Login => "login",
            Page::Signup => "signup",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Signup => "Sign up",
        }
    }
}

/// One-shot message shown above a form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub message: String,
}

impl Notice {
    pub fn error(message: &str) -> Self {
        Self {
            kind: "error".to_string(),
            message: message.to_string(),
        }
    }
}

impl From<FlashMessage<'_>> for Notice {
    fn from(flash: FlashMessage<'_>) -> Self {
        Self {
            kind: flash.kind().to_string(),
            message: flash.message().to_string(),
        }
    }
}

/// Templates compiled once at startup and kept in managed state.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        registry.register_partial("flash", FLASH_PARTIAL)?;
        registry.register_template_string(Page::Login.template(), LOGIN_TEMPLATE)?;
        registry.register_template_string(Page::Signup.template(), SIGNUP_TEMPLATE)?;

        Ok(Self { registry })
    }

    pub fn render(
        &self,
        page: Page,
        username: &str,
        notice: Option<Notice>,
    ) -> Result<RawHtml<String>, AppError> {
        let context = json!({
            "title": page.title(),
            "username": username,
            "flash": notice,
        });

        let html = self.registry.render(page.template(), &context)?;

        Ok(RawHtml(html))
    }
}
