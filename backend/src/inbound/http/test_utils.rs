//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, web};

use crate::domain::UserId;
use crate::domain::ports::FixtureTokenAuthority;
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;
use crate::test_support::{InMemoryBackend, PlainTextHasher, fixed_clock};

/// In-memory backend plus handler state authenticated by the fixture token.
pub struct TestContext {
    pub backend: InMemoryBackend,
    tokens: FixtureTokenAuthority,
    state: web::Data<HttpState>,
}

impl TestContext {
    pub fn new() -> Self {
        let backend = InMemoryBackend::default();
        let tokens = FixtureTokenAuthority::default();
        let state = backend.http_state(
            Arc::new(PlainTextHasher),
            Arc::new(tokens.clone()),
            fixed_clock(),
        );
        Self {
            backend,
            tokens,
            state: web::Data::new(state),
        }
    }

    pub fn data(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// The user the fixture token resolves to.
    pub fn owner(&self) -> UserId {
        *self.tokens.user_id()
    }

    pub fn bearer(&self) -> (actix_web::http::header::HeaderName, String) {
        (
            AUTHORIZATION,
            format!("Bearer {}", FixtureTokenAuthority::TOKEN),
        )
    }

    /// The full `/api/v1` router over this context's state.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new().app_data(self.data()).configure(configure)
    }
}
