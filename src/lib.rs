//! Identity service and client session manager for the Flight Plan
//! student-advising app.
//!
//! The server side registers accounts, checks credentials, issues and
//! verifies bearer tokens and serves profiles. [`client`] is the matching
//! session manager used by front ends.

pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod routes;
pub mod client;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod account;
    pub mod auth;
    pub mod session;
}

pub mod repositories {
    pub mod account;
    pub mod memory;
}

pub mod services {
    pub mod auth;
    pub mod profile;
}

pub mod handlers {
    pub mod auth;
    pub mod health;
    pub mod profile;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod rate_limit;
}

pub mod validation {
    pub mod auth;
}
