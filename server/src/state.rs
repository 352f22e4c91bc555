use crate::config::Config;
use crate::db::{Db, StoreError, WriteTicket};
use crate::error::AppError;
use crate::view::PageSettings;
use std::sync::Arc;
use std::time::Duration;

pub struct AppState {
    pub db: Db,
    pub bot_api_key: Option<String>,
    pub store_timeout: Duration,
    pub page: PageSettings,
}

impl AppState {
    pub fn new(db: Db, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            db,
            bot_api_key: config.bot_api_key.clone(),
            store_timeout: config.store_timeout,
            page: PageSettings {
                refresh_secs: config.view_refresh_secs,
                discord_invite: config.discord_invite.clone(),
            },
        })
    }

    /// Runs blocking store work off the event loop and gives up after
    /// `store_timeout`. Writes made through the ticket are rolled back when the
    /// caller gives up first, so a timed-out request never lands.
    pub async fn run<F, T>(self: &Arc<Self>, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&AppState, &WriteTicket) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        let ticket = Arc::new(WriteTicket::default());
        let mut task = tokio::task::spawn_blocking({
            let ticket = Arc::clone(&ticket);
            move || f(&state, &ticket)
        });
        let waited = tokio::time::timeout(self.store_timeout, &mut task).await;
        let joined = match waited {
            Ok(joined) => joined,
            Err(_) if ticket.abandon() => return Err(StoreError::Timeout(self.store_timeout).into()),
            // The write is already committing; report what it did.
            Err(_) => task.await,
        };
        joined.map_err(|e| AppError::from(StoreError::Task(e.to_string())))?
    }
}
