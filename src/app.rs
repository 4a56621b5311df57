use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::classifier::{ClassifierClient, ClassifierError, PredictResponse};
use crate::predictor::{Dispatch, PredictorView};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub view: PredictorView,
    /// Cursor position in characters, not bytes
    pub cursor: usize,

    // Spinner frame while pending
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub input_area: Option<Rect>,
    pub button_area: Option<Rect>,

    pub classifier: ClassifierClient,
}

impl App {
    pub fn new(classifier: ClassifierClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            view: PredictorView::new(),
            cursor: 0,
            animation_frame: 0,
            input_area: None,
            button_area: None,
            classifier,
        }
    }

    /// The trigger is disabled while a request is outstanding.
    pub fn can_submit(&self) -> bool {
        !self.view.is_pending()
    }

    /// Run the view's submit and, when it commits, hand the request to a
    /// background task that reports back through `tx`.
    pub fn submit(&mut self, tx: &UnboundedSender<AppEvent>) {
        if let Some(dispatch) = self.begin_submit() {
            self.dispatch(dispatch, tx.clone());
        }
    }

    pub fn begin_submit(&mut self) -> Option<Dispatch> {
        if !self.can_submit() {
            debug!("submit ignored, request already pending");
            return None;
        }
        let dispatch = self.view.submit()?;
        self.animation_frame = 0;
        info!(request_id = dispatch.request_id, chars = dispatch.description.chars().count(), "dispatching prediction");
        debug!(request_id = dispatch.request_id, description = %dispatch.description);
        Some(dispatch)
    }

    fn dispatch(&self, dispatch: Dispatch, tx: UnboundedSender<AppEvent>) {
        let classifier = self.classifier.clone();
        tokio::spawn(async move {
            let outcome = classifier.predict(&dispatch.description).await;
            let _ = tx.send(AppEvent::Prediction {
                request_id: dispatch.request_id,
                outcome,
            });
        });
    }

    pub fn finish_request(&mut self, request_id: u64, outcome: Result<PredictResponse, ClassifierError>) {
        match &outcome {
            Ok(response) => info!(request_id, category = ?response.category, message = ?response.message, "prediction settled"),
            Err(e) => warn!(request_id, error = %e, "prediction failed"),
        }
        if request_id != self.view.last_request_id() {
            debug!(request_id, latest = self.view.last_request_id(), "late resolution");
        }
        self.view.resolve(outcome);
    }

    pub fn tick_animation(&mut self) {
        if self.view.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn clear_input(&mut self) {
        self.view.set_input(String::new());
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(self.view.input(), self.cursor);
        self.view.input_mut().insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Pasted text lands at the cursor. The input is a single line, so each
    /// line break (`\r\n`, `\r` or `\n`) becomes one space.
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
        let byte_pos = char_to_byte_index(self.view.input(), self.cursor);
        self.view.input_mut().insert_str(byte_pos, &text);
        self.cursor += text.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(self.view.input(), self.cursor);
            self.view.input_mut().remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input_len() {
            let byte_pos = char_to_byte_index(self.view.input(), self.cursor);
            self.view.input_mut().remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input_len();
    }

    fn input_len(&self) -> usize {
        self.view.input().chars().count()
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::{closed_port, local_client, stub_server};
    use crate::predictor::{Phase, CONNECTION_ERROR};
    use tokio::sync::mpsc;

    fn app() -> App {
        App::new(ClassifierClient::new("http://localhost:8000"))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 0), 0);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    #[test]
    fn test_editing_at_cursor() {
        let mut app = app();
        type_text(&mut app, "tst");
        app.cursor_left();
        app.cursor_left();
        app.insert_char('e');
        assert_eq!(app.view.input(), "test");
        assert_eq!(app.cursor, 2);

        app.cursor_end();
        app.backspace();
        assert_eq!(app.view.input(), "tes");

        app.cursor_home();
        app.delete();
        assert_eq!(app.view.input(), "es");
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_editing_multibyte() {
        let mut app = app();
        type_text(&mut app, "café🍫");
        app.backspace();
        app.cursor_left();
        app.backspace();
        assert_eq!(app.view.input(), "caé");
        app.cursor_right();
        app.cursor_right();
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_insert_str_flattens_line_breaks() {
        let mut app = app();
        type_text(&mut app, "itchy lotion");
        for _ in 0.."lotion".len() {
            app.cursor_left();
        }
        app.insert_str("skin\r\nafter\n");

        assert_eq!(app.view.input(), "itchy skin after lotion");
        assert_eq!(app.cursor, "itchy skin after ".chars().count());
    }

    #[test]
    fn test_insert_str_multibyte_cursor() {
        let mut app = app();
        type_text(&mut app, "é");
        app.insert_str("日本\r");
        app.insert_char('!');
        assert_eq!(app.view.input(), "é日本 !");
        assert_eq!(app.cursor, 5);
    }

    #[test]
    fn test_clear_input() {
        let mut app = app();
        type_text(&mut app, "abc");
        app.clear_input();
        assert_eq!(app.view.input(), "");
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_trigger_disabled_while_pending() {
        let mut app = app();
        type_text(&mut app, "headache");

        let first = app.begin_submit().unwrap();
        assert_eq!(first.request_id, 1);
        assert!(!app.can_submit());
        assert!(app.begin_submit().is_none());
        assert_eq!(app.view.last_request_id(), 1);
    }

    #[test]
    fn test_blank_submit_dispatches_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");
        assert!(app.begin_submit().is_none());
        assert_eq!(app.view.phase(), Phase::Idle);
    }

    #[test]
    fn test_tick_only_animates_while_pending() {
        let mut app = app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        type_text(&mut app, "x");
        app.begin_submit();
        app.tick_animation();
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }

    #[test]
    fn test_late_resolution_still_lands() {
        let mut app = app();
        type_text(&mut app, "first");
        let first = app.begin_submit().unwrap();
        app.finish_request(first.request_id, Ok(PredictResponse::default()));

        app.cursor_end();
        type_text(&mut app, " again");
        let second = app.begin_submit().unwrap();
        assert_eq!(second.request_id, 2);

        // Resolution for an id other than the latest is applied, not dropped
        let stale = PredictResponse {
            category: Some("Cosmetics".to_string()),
            ..PredictResponse::default()
        };
        app.finish_request(first.request_id, Ok(stale));

        assert!(!app.view.is_pending());
        assert_eq!(app.view.result(), Some("Cosmetics"));
        assert!(app.can_submit());
    }

    #[tokio::test]
    async fn test_submit_round_trips_through_channel() {
        let (base_url, _) = stub_server(r#"{"category":"Food Allergy"}"#).await;
        let mut app = App::new(local_client(&base_url));
        let (tx, mut rx) = mpsc::unbounded_channel();
        type_text(&mut app, "headache after eating chocolate");

        app.submit(&tx);
        assert!(app.view.is_pending());
        assert_eq!(app.view.result(), None);

        match rx.recv().await.unwrap() {
            AppEvent::Prediction { request_id, outcome } => app.finish_request(request_id, outcome),
            other => panic!("unexpected event {other:?}"),
        }

        assert!(!app.view.is_pending());
        assert_eq!(app.view.result(), Some("Food Allergy"));
        assert!(app.can_submit());
    }

    #[tokio::test]
    async fn test_submit_network_failure() {
        let mut app = App::new(local_client(&closed_port().await));
        let (tx, mut rx) = mpsc::unbounded_channel();
        type_text(&mut app, "test");

        app.submit(&tx);

        match rx.recv().await.unwrap() {
            AppEvent::Prediction { request_id, outcome } => app.finish_request(request_id, outcome),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(app.view.result(), Some(CONNECTION_ERROR));
        assert!(!app.view.is_pending());
    }
}
