//! Persisting the basket between requests.
//!
//! The basket lives in the `checkout_session` table keyed by a random session
//! ID stored in a cookie. Handlers call [load_basket] when a request arrives
//! and [save_basket] after changing the basket, nothing else touches it.

use std::{fmt::Display, str::FromStr};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rusqlite::{Connection, OptionalExtension};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, basket::Basket};

/// The name of the cookie holding the checkout session ID.
pub const SESSION_COOKIE: &str = "checkout_session";

/// How long a basket is kept after it was last changed.
pub const SESSION_DURATION: Duration = Duration::days(7);

/// The ID of a donor's checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Get the session ID from the cookie jar, starting a new session if the
/// cookie is missing or malformed.
///
/// The returned jar must be included in the response so that a new session
/// cookie reaches the browser. `secure` marks the cookie HTTPS only, browsers
/// drop such cookies when the app is served over plain HTTP.
pub fn get_or_start_session(jar: CookieJar, secure: bool) -> (CookieJar, SessionId) {
    if let Some(session_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<SessionId>().ok())
    {
        return (jar, session_id);
    }

    let session_id = SessionId::new();
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(SESSION_DURATION)
        .build();

    tracing::debug!("Starting checkout session {session_id}");

    (jar.add(cookie), session_id)
}

pub fn create_checkout_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS checkout_session (
            id TEXT PRIMARY KEY,
            basket TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Load the basket for `session_id`.
///
/// Sessions without a saved basket, or whose basket has expired, get an empty basket.
///
/// # Errors
/// Returns an error if the query fails or the stored basket is not valid JSON.
pub fn load_basket(session_id: SessionId, connection: &Connection) -> Result<Basket, Error> {
    let row: Option<(String, OffsetDateTime)> = connection
        .query_row(
            "SELECT basket, updated_at FROM checkout_session WHERE id = ?1",
            [session_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((basket, updated_at)) if updated_at + SESSION_DURATION > OffsetDateTime::now_utc() => {
            serde_json::from_str(&basket).map_err(Error::from)
        }
        Some(_) => {
            tracing::debug!("Checkout session {session_id} has expired");
            clear_basket(session_id, connection)?;
            Ok(Basket::default())
        }
        None => Ok(Basket::default()),
    }
}

/// Save `basket` as the basket for `session_id`, replacing any previous basket.
pub fn save_basket(
    session_id: SessionId,
    basket: &Basket,
    connection: &Connection,
) -> Result<(), Error> {
    let basket = serde_json::to_string(basket)?;

    connection.execute(
        "INSERT INTO checkout_session (id, basket, updated_at) VALUES (?1, ?2, ?3)
        ON CONFLICT(id) DO UPDATE SET basket = excluded.basket, updated_at = excluded.updated_at",
        (session_id.to_string(), basket, OffsetDateTime::now_utc()),
    )?;

    Ok(())
}

/// Forget the basket for `session_id`, e.g. after the order has been placed.
pub fn clear_basket(session_id: SessionId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM checkout_session WHERE id = ?1",
        [session_id.to_string()],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::{Cookie, CookieJar};
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        basket::{Basket, Frequency, NewBasketItem},
        donation::DonationType,
    };

    use super::{
        SESSION_COOKIE, SessionId, clear_basket, create_checkout_session_table,
        get_or_start_session, load_basket, save_basket,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_checkout_session_table(&connection).unwrap();
        connection
    }

    fn basket_with_one_item() -> Basket {
        let mut basket = Basket {
            items: vec![],
            cover_fees: true,
        };
        basket
            .add_item(NewBasketItem {
                appeal_title: "Orphan Appeal".to_owned(),
                product_name: Some("Sponsor an orphan".to_owned()),
                donation_type: DonationType::Sadaqah,
                amount_pence: 3000,
                frequency: Frequency::Monthly,
            })
            .unwrap();
        basket
    }

    #[test]
    fn unknown_session_has_empty_basket() {
        let connection = get_test_connection();

        let basket = load_basket(SessionId::new(), &connection).unwrap();

        assert_eq!(basket, Basket::default());
    }

    #[test]
    fn saved_basket_is_loaded() {
        let connection = get_test_connection();
        let session_id = SessionId::new();
        let want = basket_with_one_item();

        save_basket(session_id, &want, &connection).unwrap();
        let got = load_basket(session_id, &connection).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn saving_again_replaces_basket() {
        let connection = get_test_connection();
        let session_id = SessionId::new();
        save_basket(session_id, &basket_with_one_item(), &connection).unwrap();

        save_basket(session_id, &Basket::default(), &connection).unwrap();

        assert_eq!(
            load_basket(session_id, &connection).unwrap(),
            Basket::default()
        );
    }

    #[test]
    fn cleared_basket_is_empty() {
        let connection = get_test_connection();
        let session_id = SessionId::new();
        save_basket(session_id, &basket_with_one_item(), &connection).unwrap();

        clear_basket(session_id, &connection).unwrap();

        assert!(load_basket(session_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn expired_basket_is_discarded() {
        let connection = get_test_connection();
        let session_id = SessionId::new();
        let basket = serde_json::to_string(&basket_with_one_item()).unwrap();
        connection
            .execute(
                "INSERT INTO checkout_session (id, basket, updated_at) VALUES (?1, ?2, ?3)",
                (
                    session_id.to_string(),
                    basket,
                    OffsetDateTime::now_utc() - Duration::days(8),
                ),
            )
            .unwrap();

        assert!(load_basket(session_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn starts_session_when_cookie_missing() {
        let (jar, session_id) = get_or_start_session(CookieJar::new(), false);

        let cookie = jar.get(SESSION_COOKIE).expect("session cookie not set");
        assert_eq!(cookie.value(), session_id.to_string());
    }

    #[test]
    fn reuses_existing_session_cookie() {
        let existing = SessionId::new();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, existing.to_string()));

        let (_, session_id) = get_or_start_session(jar, false);

        assert_eq!(session_id, existing);
    }

    #[test]
    fn replaces_malformed_session_cookie() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not-a-uuid"));

        let (jar, session_id) = get_or_start_session(jar, false);

        assert_eq!(
            jar.get(SESSION_COOKIE).unwrap().value(),
            session_id.to_string()
        );
    }

    #[test]
    fn session_cookie_secure_flag_follows_setting() {
        let (jar, _) = get_or_start_session(CookieJar::new(), false);
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().secure(), Some(false));

        let (jar, _) = get_or_start_session(CookieJar::new(), true);
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().secure(), Some(true));
    }
}
