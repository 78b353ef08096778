use either::Either;
use rocket::State;
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use rocket::response::{Flash, Redirect};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument, warn};

use crate::auth::{
    PasswordHasher, SESSION_COOKIE, SessionStore, User, authenticate_user, register_user,
};
use crate::error::AppError;
use crate::validation::{Credentials, MISSING_FIELDS_MESSAGE};
use crate::views::{Notice, Page, Views};

pub const SIGNUP_SUCCESS: &str = "Account created successfully! Please login.";
pub const USERNAME_TAKEN: &str = "Username already exists!";
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const LOGGED_OUT: &str = "Logged out successfully";

type FormOutcome = Either<Flash<Redirect>, RawHtml<String>>;

#[get("/")]
pub fn index() -> Redirect {
    Redirect::to(uri!("/login"))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

#[get("/signup")]
pub fn signup_page(
    flash: Option<FlashMessage<'_>>,
    views: &State<Views>,
) -> Result<RawHtml<String>, AppError> {
    views.render(Page::Signup, "", flash.map(Notice::from))
}

#[post("/signup", data = "<form>")]
#[instrument(skip_all, fields(username = %form.username))]
pub async fn signup(
    form: Form<Credentials>,
    db: &State<Pool<Sqlite>>,
    hasher: &State<PasswordHasher>,
    views: &State<Views>,
) -> Result<FormOutcome, AppError> {
    if let Err(err) = form.check() {
        err.log_and_record("Signup form");
        let notice = Notice::error(MISSING_FIELDS_MESSAGE);
        let page = views.render(Page::Signup, &form.username, Some(notice))?;
        return Ok(Either::Right(page));
    }

    if let Err(err) = form.check_password() {
        err.log_and_record("Signup form");
        let notice = match err {
            AppError::Validation(message) => Notice::error(&message),
            other => return Err(other),
        };
        let page = views.render(Page::Signup, &form.username, Some(notice))?;
        return Ok(Either::Right(page));
    }

    match register_user(db, hasher, &form.username, &form.password).await {
        Ok(user) => {
            info!(user_id = user.id, "Signup successful");
            Ok(Either::Left(Flash::success(
                Redirect::to(uri!("/login")),
                SIGNUP_SUCCESS,
            )))
        }
        Err(err @ AppError::Conflict(_)) => {
            err.log_and_record("Signup");
            let notice = Notice::error(USERNAME_TAKEN);
            let page = views.render(Page::Signup, &form.username, Some(notice))?;
            Ok(Either::Right(page))
        }
        Err(err) => Err(err),
    }
}

#[get("/login")]
pub fn login_page(
    flash: Option<FlashMessage<'_>>,
    views: &State<Views>,
) -> Result<RawHtml<String>, AppError> {
    views.render(Page::Login, "", flash.map(Notice::from))
}

#[post("/login", data = "<form>")]
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    form: Form<Credentials>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    hasher: &State<PasswordHasher>,
    sessions: &State<SessionStore>,
    views: &State<Views>,
) -> Result<FormOutcome, AppError> {
    info!("Login attempt");

    if let Err(err) = form.check() {
        err.log_and_record("Login form");
        let notice = Notice::error(MISSING_FIELDS_MESSAGE);
        let page = views.render(Page::Login, &form.username, Some(notice))?;
        return Ok(Either::Right(page));
    }

    let user = match authenticate_user(db, hasher, &form.username, &form.password).await? {
        Some(user) => user,
        None => {
            warn!("Invalid credentials");
            let page = views.render(
                Page::Login,
                &form.username,
                Some(Notice::error(INVALID_CREDENTIALS)),
            )?;
            return Ok(Either::Right(page));
        }
    };

    // A client logging in again replaces its previous session.
    if let Some(previous) = cookies.get_private(SESSION_COOKIE) {
        sessions.revoke(previous.value()).await?;
    }

    let session = sessions.open(&user).await?;

    cookies.add_private(
        Cookie::build((SESSION_COOKIE, session.token))
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(rocket::time::Duration::seconds(sessions.ttl().num_seconds())),
    );

    info!("Authentication successful");

    Ok(Either::Left(Flash::success(
        Redirect::to(uri!("/dashboard")),
        LOGIN_SUCCESS,
    )))
}

#[get("/dashboard")]
pub fn dashboard(user: User) -> String {
    format!("Welcome {} to your dashboard!", user.username)
}

/// The cookie is always cleared. A session row that cannot be revoked is a
/// server error rather than a reported logout, since the token would still
/// authenticate if replayed.
#[get("/logout")]
pub async fn logout(
    cookies: &CookieJar<'_>,
    sessions: &State<SessionStore>,
) -> Result<Flash<Redirect>, AppError> {
    let token = cookies
        .get_private(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    cookies.remove_private(Cookie::build(SESSION_COOKIE));

    if let Some(token) = token {
        if sessions.revoke(&token).await? {
            info!("Session revoked");
        }
    }

    Ok(Flash::new(Redirect::to(uri!("/login")), "info", LOGGED_OUT))
}
