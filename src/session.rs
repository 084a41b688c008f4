//! Explicit session context, populated at sign-in and cleared at sign-out.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    pub fn start(&mut self, token: impl Into<String>, user: SessionUser) {
        self.token = Some(token.into());
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }
}

/// Shared handle passed to whatever needs the session.
pub type SessionHandle = Arc<RwLock<Session>>;

pub fn new_handle() -> SessionHandle {
    Arc::new(RwLock::new(Session::default()))
}

/// Bearer token of the current session, if any. A poisoned lock reads as
/// signed out.
pub fn bearer_token(handle: &SessionHandle) -> Option<String> {
    handle
        .read()
        .ok()
        .and_then(|session| session.token().map(str::to_string))
}
