//! Application state for snapdock clients
//!
//! A handful of flat lists and sets, mutated only on the single UI event
//! loop. The state owns the session token for the lifetime of the run;
//! nothing here is persisted.

use crate::connection::ConnectionState;
use crate::photos::PhotoEntry;

/// Pairing lifecycle.
///
/// The `Displaying -> Paired` transition is driven externally by the
/// connection manager's token push, not by the pairing client itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PairingPhase {
    #[default]
    Idle,
    /// Code fetch in flight; the UI shows its "generating" placeholder
    Requesting,
    /// Link ready to be scanned
    Displaying { link: String },
    /// Fetch failed; stays here until the user asks for a new code
    Failed,
    Paired,
}

/// Which top-level view the client shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Pairing,
    Gallery,
}

/// UI input mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing an upload folder path
    Folder,
}

/// Status message severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Session token; set once pairing completes, never persisted here
    pub token: Option<String>,
    pub pairing: PairingPhase,

    /// Mirror of the connection manager's state, drives the indicator
    pub connection: ConnectionState,

    // Gallery
    pub photos: Vec<PhotoEntry>,
    pub cursor: usize,
    pub selected: Vec<usize>,

    // UI state
    pub input_mode: InputMode,
    pub folder_input: String,
    pub status_message: Option<(String, StatusLevel)>,
}

impl AppState {
    /// Derived view: pairing panel until a token exists, gallery after.
    pub fn view(&self) -> View {
        if self.token.is_some() {
            View::Gallery
        } else {
            View::Pairing
        }
    }

    // Pairing lifecycle

    pub fn begin_pairing(&mut self) {
        self.pairing = PairingPhase::Requesting;
    }

    pub fn show_pairing_link(&mut self, link: String) {
        // a late response after pairing completed must not regress the view
        if self.pairing != PairingPhase::Paired {
            self.pairing = PairingPhase::Displaying { link };
        }
    }

    pub fn pairing_failed(&mut self) {
        if self.pairing != PairingPhase::Paired {
            self.pairing = PairingPhase::Failed;
        }
    }

    /// Store the pushed session token and complete pairing.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
        self.pairing = PairingPhase::Paired;
    }

    pub fn set_connection(&mut self, state: ConnectionState) {
        self.connection = state;
    }

    // Gallery

    /// Replace the photo listing; selection and cursor restart from scratch.
    pub fn set_photos(&mut self, photos: Vec<PhotoEntry>) {
        self.photos = photos;
        self.cursor = 0;
        self.selected.clear();
    }

    pub fn cursor_down(&mut self) {
        if !self.photos.is_empty() && self.cursor < self.photos.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn cursor_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_bottom(&mut self) {
        if !self.photos.is_empty() {
            self.cursor = self.photos.len() - 1;
        }
    }

    /// Toggle selection on the photo under the cursor
    pub fn toggle_selection(&mut self) {
        if self.photos.is_empty() {
            return;
        }
        if self.selected.contains(&self.cursor) {
            self.selected.retain(|&i| i != self.cursor);
        } else {
            self.selected.push(self.cursor);
        }
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.photos.len()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Item identifiers of the selected photos, in listing order
    pub fn selected_hashes(&self) -> Vec<String> {
        let mut indices = self.selected.clone();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|i| self.photos.get(i).map(|p| p.id.clone()))
            .collect()
    }

    // Status bar

    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some((message.into(), level));
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.folder_input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::UploadStatus;

    fn sample_photos() -> Vec<PhotoEntry> {
        (0..5)
            .map(|i| PhotoEntry {
                id: format!("hash{}", i),
                url: format!("http://10.0.0.2:8080/thumbs/{}.jpg", i),
                name: format!("IMG_{:04}.jpg", i),
                size: 1_000_000,
                status: UploadStatus::Success,
            })
            .collect()
    }

    #[test]
    fn test_view_switches_on_token() {
        let mut state = AppState::default();
        assert_eq!(state.view(), View::Pairing);

        state.set_token("abc123".to_string());
        assert_eq!(state.view(), View::Gallery);
        assert_eq!(state.pairing, PairingPhase::Paired);
        assert_eq!(state.token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_pairing_lifecycle() {
        let mut state = AppState::default();
        assert_eq!(state.pairing, PairingPhase::Idle);

        state.begin_pairing();
        assert_eq!(state.pairing, PairingPhase::Requesting);

        state.show_pairing_link("http://192.168.1.10:8080?code=42F9".to_string());
        assert!(matches!(state.pairing, PairingPhase::Displaying { .. }));

        state.set_token("tok".to_string());
        assert_eq!(state.pairing, PairingPhase::Paired);

        // a straggling fetch result must not regress past Paired
        state.show_pairing_link("http://192.168.1.10:8080?code=ZZZZ".to_string());
        assert_eq!(state.pairing, PairingPhase::Paired);
        state.pairing_failed();
        assert_eq!(state.pairing, PairingPhase::Paired);
    }

    #[test]
    fn test_pairing_failure_path() {
        let mut state = AppState::default();
        state.begin_pairing();
        state.pairing_failed();
        assert_eq!(state.pairing, PairingPhase::Failed);

        // user-initiated retry
        state.begin_pairing();
        assert_eq!(state.pairing, PairingPhase::Requesting);
    }

    #[test]
    fn test_selection() {
        let mut state = AppState::default();
        state.set_photos(sample_photos());

        state.toggle_selection();
        assert!(state.is_selected(0));

        state.cursor_down();
        state.cursor_down();
        state.toggle_selection();
        assert_eq!(state.selected.len(), 2);

        state.toggle_selection();
        assert_eq!(state.selected.len(), 1);

        state.select_all();
        assert_eq!(state.selected.len(), 5);

        state.clear_selection();
        assert!(state.selected.is_empty());
    }

    #[test]
    fn test_selected_hashes_in_listing_order() {
        let mut state = AppState::default();
        state.set_photos(sample_photos());

        state.cursor = 3;
        state.toggle_selection();
        state.cursor = 1;
        state.toggle_selection();

        assert_eq!(state.selected_hashes(), vec!["hash1", "hash3"]);
    }

    #[test]
    fn test_refresh_clears_selection() {
        let mut state = AppState::default();
        state.set_photos(sample_photos());
        state.select_all();
        state.cursor = 4;

        state.set_photos(sample_photos()[..2].to_vec());
        assert!(state.selected.is_empty());
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut state = AppState::default();
        state.cursor_down();
        assert_eq!(state.cursor, 0);

        state.set_photos(sample_photos());
        state.cursor_bottom();
        assert_eq!(state.cursor, 4);
        state.cursor_down();
        assert_eq!(state.cursor, 4);
        state.cursor_top();
        assert_eq!(state.cursor, 0);
        state.cursor_up();
        assert_eq!(state.cursor, 0);
    }
}
