use crate::data::model::UploadSession;

/// Rows shown per page of the raw-data table.
pub const ROWS_PER_PAGE: usize = 10;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// All files from the most recent open (empty until the user opens one).
    /// Only the first session is rendered; the list is replaced wholesale on
    /// each open, never merged with a previous one.
    pub sessions: Vec<UploadSession>,

    /// Current page of the raw-data table.
    pub page: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
            page: 0,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Replace the session list with the result of a new open.
    pub fn set_sessions(&mut self, sessions: Vec<UploadSession>) {
        self.sessions = sessions;
        self.page = 0;
        self.status_message = None;
        self.loading = false;
    }

    /// The session being rendered (first of the most recent open).
    pub fn current(&self) -> Option<&UploadSession> {
        self.sessions.first()
    }

    /// Number of raw-table pages for the rendered session, at least 1.
    pub fn page_count(&self) -> usize {
        let rows = self.current().map_or(0, |s| s.dataset.row_count());
        rows.div_ceil(ROWS_PER_PAGE).max(1)
    }
}
