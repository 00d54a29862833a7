//! Application wiring: core state + connection handle + background tasks

use std::sync::Arc;

use snapdock_core::{
    AppState, ClientMessage, Config, ConnectionEvent, ConnectionHandle, ConnectionManager,
    ConnectionState, PairingClient, PairingCode, PhotoClient, PhotoEntry,
    pairing::PairingError,
    photos::PhotoApiError,
    state::StatusLevel,
};
use tokio::sync::mpsc;
use tracing::warn;

/// Application result for main loop
pub enum AppResult {
    Continue,
    Quit,
}

/// Results of spawned HTTP tasks, drained on the UI loop
enum BackgroundEvent {
    Pairing(Result<PairingCode, PairingError>),
    Photos(Result<Vec<PhotoEntry>, PhotoApiError>),
    FolderSet(Result<(), PhotoApiError>),
}

/// Main application struct
pub struct App {
    /// Configuration
    pub config: Config,

    /// UI state
    pub state: AppState,

    handle: ConnectionHandle,
    events: mpsc::UnboundedReceiver<ConnectionEvent>,

    background: mpsc::UnboundedReceiver<BackgroundEvent>,
    background_tx: mpsc::UnboundedSender<BackgroundEvent>,

    pairing_client: Arc<PairingClient>,
    photo_client: Arc<PhotoClient>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let base = config.server.http_base();
        let (handle, events) =
            ConnectionManager::spawn(config.server.ws_url(), config.client.reconnect_policy());
        let (background_tx, background) = mpsc::unbounded_channel();

        let mut app = Self {
            config,
            state: AppState::default(),
            handle,
            events,
            background,
            background_tx,
            pairing_client: Arc::new(PairingClient::new(&base)),
            photo_client: Arc::new(PhotoClient::new(&base)),
        };

        app.request_pairing_code();
        app
    }

    /// Kick off a (fresh) pairing-code fetch. One shot; a failure parks
    /// the pairing view in its failed state until the user retries.
    pub fn request_pairing_code(&mut self) {
        if self.state.token.is_some() {
            return;
        }
        self.state.begin_pairing();

        let client = self.pairing_client.clone();
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(BackgroundEvent::Pairing(client.fetch_code().await));
        });
    }

    /// Reload the photo listing
    pub fn refresh_photos(&mut self) {
        let client = self.photo_client.clone();
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(BackgroundEvent::Photos(client.list_photos().await));
        });
    }

    /// Forward the chosen upload folder to the server
    pub fn set_upload_folder(&mut self, folder: String) {
        let client = self.photo_client.clone();
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(BackgroundEvent::FolderSet(
                client.set_upload_folder(&folder).await,
            ));
        });
    }

    /// Ask the server to copy the selected photos.
    ///
    /// Fire-and-forget: if the channel is down the message is dropped by
    /// the connection manager, so the status line stays honest about it.
    pub fn copy_selected(&mut self) {
        let hashes = self.state.selected_hashes();
        if hashes.is_empty() {
            self.state.set_status("Nothing selected", StatusLevel::Info);
            return;
        }

        if self.state.connection != ConnectionState::Connected {
            self.state
                .set_status("Not connected, copy not sent", StatusLevel::Warning);
        } else {
            self.state.set_status(
                format!("Requested copy of {} photo(s)", hashes.len()),
                StatusLevel::Success,
            );
        }
        self.handle.send(ClientMessage::copy_files(hashes));
    }

    /// Drain pending connection and background events
    pub fn tick(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                ConnectionEvent::Status(true) => {
                    self.state.set_connection(ConnectionState::Connected);
                }
                ConnectionEvent::Status(false) => {
                    self.state.set_connection(ConnectionState::Disconnected);
                }
                ConnectionEvent::Token(token) => self.on_token(token),
            }
        }

        while let Ok(event) = self.background.try_recv() {
            match event {
                BackgroundEvent::Pairing(Ok(code)) => {
                    let link = code.link(self.config.server.port);
                    self.state.show_pairing_link(link);
                }
                BackgroundEvent::Pairing(Err(err)) => {
                    warn!(%err, "pairing code fetch failed");
                    self.state.pairing_failed();
                }
                BackgroundEvent::Photos(Ok(photos)) => {
                    self.state.set_photos(photos);
                }
                BackgroundEvent::Photos(Err(err)) => {
                    warn!(%err, "photo listing failed");
                    self.state
                        .set_status("Could not load photos", StatusLevel::Error);
                }
                BackgroundEvent::FolderSet(Ok(())) => {
                    self.state
                        .set_status("Upload folder updated", StatusLevel::Success);
                }
                BackgroundEvent::FolderSet(Err(err)) => {
                    warn!(%err, "folder config failed");
                    self.state
                        .set_status("Could not set upload folder", StatusLevel::Error);
                }
            }
        }
    }

    fn on_token(&mut self, token: String) {
        let first = self.state.token.is_none();
        self.state.set_token(token);
        if first {
            self.state.set_status("Paired", StatusLevel::Success);
            self.refresh_photos();
        }
    }

    /// Close the live channel and cancel any pending reconnect
    pub fn shutdown(&self) {
        self.handle.shutdown();
    }
}
