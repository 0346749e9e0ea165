//! Shared application state.

use std::sync::Arc;

use rollcall_auth::AuthService;
use rollcall_core::repository::UserRepository;
use rollcall_sync::SyncEngine;

pub struct AppState<R: UserRepository> {
    pub auth: Arc<AuthService<R>>,
    pub sync: Arc<SyncEngine<R>>,
}

impl<R: UserRepository> AppState<R> {
    pub fn new(auth: AuthService<R>, sync: SyncEngine<R>) -> Self {
        Self {
            auth: Arc::new(auth),
            sync: Arc::new(sync),
        }
    }
}

// Manual impl: deriving would require `R: Clone`.
impl<R: UserRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            sync: Arc::clone(&self.sync),
        }
    }
}
