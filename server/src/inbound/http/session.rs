//! Session helpers keeping handlers free of framework-specific logic.
//!
//! The login/logout redirect flow lives with the external identity
//! provider; by the time a request arrives here the provider has stored the
//! established identity in the cookie session. Handlers convert that into
//! an explicit [`Actor`] and pass it down; the domain never reads an
//! ambient current user.

use std::collections::HashSet;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist an established identity in the session cookie.
    ///
    /// Called by the identity-provider callback (and test harnesses);
    /// ordinary handlers only read.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the established identity.
    pub fn clear_user(&self) {
        self.0.remove(USER_ID_KEY);
    }

    /// Fetch the current identity from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match raw {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid identity in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Build the caller's [`Actor`], if a session identity exists.
    ///
    /// The admin capability comes from the configured admin identity list.
    pub fn actor(&self, admins: &HashSet<String>) -> Result<Option<Actor>, Error> {
        Ok(self.user_id()?.map(|id| {
            let admin = admins.contains(id.as_str());
            Actor::new(id, admin)
        }))
    }

    /// Require an authenticated actor or fail with `401 Unauthorized`.
    pub fn require_actor(&self, admins: &HashSet<String>) -> Result<Actor, Error> {
        self.actor(admins)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
