//! Session desk: a small password-gated dashboard backend for tracking CLI
//! sessions, with ZIP export/import, a scheduled quota reset and plain-text
//! statistics.

pub mod analyzer;
pub mod archive;
pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

pub mod models {
    pub mod session;
}

pub mod repositories {
    pub mod memory;
    pub mod postgres;
    pub mod session;
}

pub mod services {
    pub mod auth;
    pub mod lifecycle;
    pub mod sessions;
    pub mod transfer;
}

pub mod handlers {
    pub mod analysis;
    pub mod auth;
    pub mod cron;
    pub mod sessions;
    pub mod transfer;
}

pub mod middleware_layer {
    pub mod auth;
}
