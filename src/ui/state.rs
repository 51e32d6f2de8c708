//! Application state for the terminal workspace
//!
//! Thin wrapper around `Session`: adds the unlock-form buffer, result-pane
//! scroll and the quit flag. All enhancement/credential logic lives in the
//! session.

use ratatui::layout::Rect;

use crate::session::{Session, SessionState};
use crate::ui::input::Action;
use crate::ui::view::enhanced_line_count;

/// Top-level app phases as seen by the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Unlock modal is shown
    Locked,
    /// Workspace usable
    Running,
    /// Exit requested
    Quitting,
}

/// Main application state
#[derive(Debug)]
pub struct App {
    pub session: Session,
    /// Unlock-form input (masked when rendered)
    pub key_input: String,
    /// Vertical scroll of the enhanced pane
    pub enhanced_scroll: u16,
    /// Model label for the header
    pub model: String,
    /// Enhanced pane text area at the last draw
    enhanced_viewport: Rect,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, model: impl Into<String>) -> Self {
        Self {
            session,
            key_input: String::new(),
            enhanced_scroll: 0,
            model: model.into(),
            enhanced_viewport: Rect::default(),
            should_quit: false,
        }
    }

    /// Get current application state
    pub fn state(&self) -> AppState {
        if self.should_quit {
            AppState::Quitting
        } else if self.session.state() == SessionState::Locked {
            AppState::Locked
        } else {
            AppState::Running
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn enhanced_viewport(&self) -> Rect {
        self.enhanced_viewport
    }

    /// Record the enhanced pane size and pull the scroll back inside it
    pub fn set_enhanced_viewport(&mut self, area: Rect) {
        self.enhanced_viewport = area;
        self.enhanced_scroll = self.enhanced_scroll.min(self.max_enhanced_scroll());
    }

    /// Furthest scroll that still leaves the last wrapped line on screen
    /// with the pane filled
    pub fn max_enhanced_scroll(&self) -> u16 {
        let Rect { width, height, .. } = self.enhanced_viewport;
        if width == 0 || height == 0 {
            return 0;
        }
        let lines = enhanced_line_count(self.session.enhanced(), width);
        u16::try_from(lines.saturating_sub(usize::from(height))).unwrap_or(u16::MAX)
    }

    /// Apply one input action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.quit(),
            Action::InsertChar(c) => self.insert_char(c),
            Action::Newline => self.insert_char('\n'),
            Action::Backspace => self.backspace(),
            Action::SubmitKey => self.submit_key(),
            Action::Enhance => {
                self.session.start_enhance();
            }
            Action::Copy => {
                self.session.copy_enhanced();
            }
            Action::ResetKey => {
                self.session.reset_credential();
                self.key_input.clear();
                self.enhanced_scroll = 0;
            }
            Action::ScrollUp => {
                self.enhanced_scroll = self.enhanced_scroll.saturating_sub(1);
            }
            Action::ScrollDown => {
                self.enhanced_scroll = self
                    .enhanced_scroll
                    .saturating_add(1)
                    .min(self.max_enhanced_scroll());
            }
            Action::DismissNotification => self.session.dismiss_notification(),
        }
    }

    /// Insert pasted text into whichever field has focus
    pub fn paste(&mut self, text: &str) {
        if self.session.is_locked() {
            // Keys are single-line
            self.key_input
                .extend(text.chars().filter(|c| !c.is_control()));
        } else {
            self.session.draft_mut().push_str(text);
        }
    }

    /// Drain background events; call once per tick
    pub fn tick(&mut self) {
        let before = self.session.enhanced().len();
        if self.session.process_events() > 0 && self.session.enhanced().len() != before {
            self.enhanced_scroll = 0;
        }
    }

    fn insert_char(&mut self, c: char) {
        if self.session.is_locked() {
            if c != '\n' {
                self.key_input.push(c);
            }
        } else {
            self.session.draft_mut().push(c);
        }
    }

    fn backspace(&mut self) {
        if self.session.is_locked() {
            self.key_input.pop();
        } else {
            self.session.draft_mut().pop();
        }
    }

    fn submit_key(&mut self) {
        if self.session.submit_credential(&self.key_input) {
            self.key_input.clear();
        }
    }
}
