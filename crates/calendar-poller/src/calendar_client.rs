use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_calendar3::hyper_rustls::HttpsConnector;
use google_calendar3::CalendarHub;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use shared_types::CalendarEvent;
use std::path::Path;
use tokio::sync::OnceCell;

use crate::config::PollerConfig;
use crate::error::PollerResult;
use crate::poller::EventSource;

/// Client for reading events from Google Calendar
pub struct CalendarClient {
    hub: CalendarHub<HttpsConnector<HttpConnector>>,
    calendar_id: OnceCell<String>,
    calendar_name: String,
}

impl CalendarClient {
    pub async fn new(config: &PollerConfig) -> Result<Self> {
        let secret =
            google_calendar3::yup_oauth2::read_application_secret(&config.credentials_path)
                .await
                .context("Failed to read OAuth credentials")?;

        let auth = google_calendar3::yup_oauth2::InstalledFlowAuthenticator::builder(
            secret,
            google_calendar3::yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(Path::new(&config.token_cache_path))
        .build()
        .await
        .context("Failed to build authenticator")?;

        let connector = google_calendar3::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .context("Failed to load native TLS roots")?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = CalendarHub::new(client, auth);

        Ok(Self {
            hub,
            calendar_id: OnceCell::new(),
            calendar_name: config.calendar_name.clone(),
        })
    }

    /// Find the calendar ID by name, once
    pub async fn find_calendar(&self) -> Result<&str> {
        let id = self
            .calendar_id
            .get_or_try_init(|| self.lookup_calendar())
            .await?;
        Ok(id)
    }

    async fn lookup_calendar(&self) -> Result<String> {
        let (_, calendar_list) = self
            .hub
            .calendar_list()
            .list()
            .doit()
            .await
            .context("Failed to list calendars")?;

        let found = calendar_list.items.unwrap_or_default().into_iter().find_map(|calendar| {
            match calendar.summary {
                Some(ref summary) if summary == &self.calendar_name => calendar.id,
                _ => None,
            }
        });

        match found {
            Some(id) => {
                tracing::info!("Found calendar '{}' with ID: {}", self.calendar_name, id);
                Ok(id)
            }
            None => anyhow::bail!("Calendar '{}' not found", self.calendar_name),
        }
    }
}

#[async_trait]
impl EventSource for CalendarClient {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> PollerResult<Vec<CalendarEvent>> {
        let calendar_id = self.find_calendar().await?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut call = self
                .hub
                .events()
                .list(calendar_id)
                .time_min(time_min)
                .time_max(time_max)
                .single_events(true);
            if let Some(ref token) = page_token {
                call = call.page_token(token);
            }

            let (_, page) = call.doit().await.context("Failed to list calendar events")?;

            // Items without an id cannot be deduplicated
            events.extend(page.items.unwrap_or_default().into_iter().filter_map(|item| {
                Some(CalendarEvent {
                    id: item.id?,
                    description: item.description.unwrap_or_default(),
                })
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Fetched {} events from '{}'", events.len(), self.calendar_name);
        Ok(events)
    }
}
