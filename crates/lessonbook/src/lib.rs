//! Slot booking and lesson-balance service for a language school.
//!
//! Students spend prepaid lessons on teaching slots and may cancel them;
//! staff manage the schedule and record outcomes. Every change to a slot and
//! the matching change to a student's balance are separate writes, so the
//! booking workflow pairs each one with a compensating write.
//!
//! # Layout
//! - [`booking`]: domain types, the ledger and registry traits, the workflow
//! - [`db`]: SQLite store
//! - [`auth`]: session tokens and the identity store
//! - [`notify`]: fire-and-forget booking notifications (Telegram)
//! - [`server`]: the axum HTTP surface

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

pub mod auth;
pub mod booking;
pub mod config;
pub mod db;
pub mod notify;
pub mod server;
pub mod types;

use auth::{IdentityStore, SessionToken};
use booking::{MemoryStore, Profile, Role};
use config::{Config, StoreKind};
use db::BookingDb;
use types::{AppState, SharedStore};

/// Opens the configured store and wires the application state.
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let store: SharedStore = match config.store {
        StoreKind::Sqlite => Arc::new(
            BookingDb::open(&config.database)
                .with_context(|| format!("opening {}", config.database.display()))?,
        ),
        StoreKind::Memory => {
            info!("Using in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(email) = &config.bootstrap_admin {
        let token = bootstrap_admin(&store, email)?;
        info!("Issued bootstrap admin session {}", token.hash());
        // Shown once on the console, never written to the log
        eprintln!("Bootstrap admin session token for {}: {}", email, token.as_str());
    }

    let dispatcher = config.dispatcher()?;
    Ok(AppState::new(store, dispatcher, config))
}

/// Makes sure an admin profile exists for `email` and issues a session token for it.
fn bootstrap_admin(store: &SharedStore, email: &str) -> anyhow::Result<SessionToken> {
    let email = email.trim().to_lowercase();
    let admin = match store.profile_by_email(&email)? {
        Some(profile) if profile.role == Role::Admin => profile,
        Some(profile) => anyhow::bail!(
            "bootstrap admin {} already exists with role {}",
            email,
            profile.role.as_str()
        ),
        None => {
            let profile = Profile::new(email.clone(), None, Role::Admin);
            store.create_profile(&profile)?;
            info!("Created bootstrap admin {}", email);
            profile
        }
    };

    Ok(store.issue_session(&admin.id)?)
}

/// Serves the API until Ctrl+C or SIGTERM.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("Initializing state...");
    let addr = config.addr;
    let state = Arc::new(build_state(config)?);
    let app = server::create_router(state);

    info!("Binding to {addr}");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server running on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(vars: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_build_state_bootstraps_admin_once() {
        let config = memory_config(&[
            ("LESSONBOOK_STORE", "memory"),
            ("LESSONBOOK_BOOTSTRAP_ADMIN", "Owner@Example.com"),
        ]);
        let state = build_state(config).unwrap();
        let admin = state
            .store
            .profile_by_email("owner@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        // Running it again reuses the profile
        let token = bootstrap_admin(&state.store, "owner@example.com").unwrap();
        let session = state
            .store
            .profile_for_session(&token.hash())
            .unwrap()
            .unwrap();
        assert_eq!(session.id, admin.id);
    }

    #[test]
    fn test_bootstrap_token_is_redacted_in_logs() {
        let state = build_state(memory_config(&[("LESSONBOOK_STORE", "memory")])).unwrap();
        let token = bootstrap_admin(&state.store, "owner@example.com").unwrap();
        let logged = format!("{} {:?}", token.hash(), token);
        assert!(!logged.contains(token.as_str()));
        assert!(!logged.contains(token.hash().as_str()));
    }

    #[test]
    fn test_bootstrap_refuses_non_admin() {
        let state = build_state(memory_config(&[("LESSONBOOK_STORE", "memory")])).unwrap();
        let student = Profile::new("anna@example.com", None, Role::Student);
        state.store.create_profile(&student).unwrap();
        assert!(bootstrap_admin(&state.store, "anna@example.com").is_err());
    }
}
