use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use habits_types::api::SessionClaims;
use habits_types::models::User;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_user";

const SESSION_TTL_DAYS: i64 = 30;

/// Identity of the acting user, inserted into request extensions by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
}

/// Signs and verifies the session cookie.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure_cookies: bool,
}

impl SessionKeys {
    pub fn new(secret: &str, secure_cookies: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            secure_cookies,
        }
    }

    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: user.id,
            username: user.username.clone(),
            exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthenticated)?;

        Ok(SessionUser {
            id: data.claims.sub,
            username: data.claims.username,
        })
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build()
    }

    /// Resolves the acting user from the request's cookies.
    pub fn resolve(&self, jar: &CookieJar) -> Result<SessionUser, AppError> {
        let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;
        self.verify(cookie.value())
    }
}

/// Cookie that, when added to a jar's removal set, clears the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Session gate for protected routes. A missing, forged or expired cookie
/// turns into a redirect to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state.session.resolve(&jar)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn issued_token_resolves_to_user() {
        let keys = SessionKeys::new("test-secret", false);
        let user = user();
        let token = keys.issue(&user).unwrap();

        let session = keys.verify(&token).unwrap();
        assert_eq!(session.id, user.id);
        assert_eq!(session.username, "alice");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = SessionKeys::new("one", false).issue(&user()).unwrap();
        let other = SessionKeys::new("two", false);
        assert!(matches!(other.verify(&token), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn raw_user_id_is_not_a_session() {
        let keys = SessionKeys::new("test-secret", false);
        let forged = Uuid::new_v4().to_string();
        assert!(matches!(keys.verify(&forged), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn missing_cookie_is_unauthenticated() {
        let keys = SessionKeys::new("test-secret", false);
        assert!(matches!(keys.resolve(&CookieJar::new()), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn cookie_attributes() {
        let cookie = SessionKeys::new("s", true).cookie("tok".into());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
