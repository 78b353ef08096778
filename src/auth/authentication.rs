use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::Redirect;
use tracing::Instrument;

use super::{SESSION_COOKIE, SessionStore, User};

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        resolve_user(request)
            .instrument(tracing::info_span!("user_auth_guard"))
            .await
    }
}

async fn resolve_user(request: &Request<'_>) -> Outcome<User, ()> {
    let token = match request.cookies().get_private(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return Outcome::Forward(Status::Unauthorized),
    };

    let store = match request.rocket().state::<SessionStore>() {
        Some(store) => store,
        None => {
            tracing::error!("Session store not found in managed state");
            return Outcome::Error((Status::InternalServerError, ()));
        }
    };

    match store.resolve(&token).await {
        Ok(Some(session)) => {
            tracing::info!(
                username = %session.username,
                session_id = session.id,
                "User authenticated via session token"
            );
            Outcome::Success(session.user())
        }
        Ok(None) => {
            tracing::warn!("Invalid or expired session token");
            Outcome::Forward(Status::Unauthorized)
        }
        Err(err) => {
            err.log_and_record("Resolving session token");
            Outcome::Error((Status::InternalServerError, ()))
        }
    }
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Redirect {
    tracing::warn!("Unauthorized access attempt");
    Redirect::to(uri!("/login"))
}
