use std::fmt;

use thiserror::Error;

/// Named screens a client can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Session creation form, the default landing screen.
    Create,
    /// Session overview with the share link and the draw form.
    Session,
    /// Countdown shown while a draw is settling.
    Drawing,
    /// The participant's final seat number.
    Result,
    /// Organizer page managing a session's forced assignments.
    Admin,
    /// Forced-assignment setup shown right after session creation.
    PreConfig,
    /// Forced assignments shared by every session.
    Global,
}

impl Screen {
    /// Stable lowercase name used in URLs and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Create => "create",
            Screen::Session => "session",
            Screen::Drawing => "drawing",
            Screen::Result => "result",
            Screen::Admin => "admin",
            Screen::PreConfig => "preconfig",
            Screen::Global => "global",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry screen resolved from a join URL, with the session it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub screen: Screen,
    pub session_id: Option<String>,
}

/// Resolve the entry screen from the URL query parameters.
///
/// Precedence follows the frontends: `global` beats `preconfig`, which beats
/// `admin`, which beats a plain join link; with no parameter at all the
/// client lands on the creation screen.
pub fn resolve_entry(
    global: bool,
    preconfig: Option<&str>,
    admin: Option<&str>,
    session: Option<&str>,
) -> Entry {
    if global {
        return Entry {
            screen: Screen::Global,
            session_id: None,
        };
    }

    if let Some(id) = preconfig {
        return Entry {
            screen: Screen::PreConfig,
            session_id: Some(id.to_owned()),
        };
    }

    if let Some(id) = admin {
        return Entry {
            screen: Screen::Admin,
            session_id: Some(id.to_owned()),
        };
    }

    if let Some(id) = session {
        return Entry {
            screen: Screen::Session,
            session_id: Some(id.to_owned()),
        };
    }

    Entry {
        screen: Screen::Create,
        session_id: None,
    }
}

/// Explicit user actions that move a client between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    /// The organizer created a session.
    SessionCreated,
    /// A participant joined an existing session.
    SessionJoined,
    /// A draw was submitted and the countdown started.
    DrawStarted,
    /// The draw settled and the seat is known.
    DrawFinished,
    /// Return to the session overview.
    BackToSession,
    /// The organizer opened the per-session admin page.
    OpenAdmin,
    /// The organizer left the admin page.
    CloseAdmin,
    /// The organizer finished the post-creation setup.
    PreConfigDone,
}

/// Error returned when a user action does not apply to the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {action:?} while on the {from} screen")]
pub struct InvalidScreenChange {
    /// Screen the client was on.
    pub from: Screen,
    /// Action that cannot be applied there.
    pub action: ScreenAction,
}

/// Compute the next screen for a user action, rejecting nonsensical jumps.
pub fn transition(from: Screen, action: ScreenAction) -> Result<Screen, InvalidScreenChange> {
    let next = match (from, action) {
        (Screen::Create, ScreenAction::SessionCreated) => Screen::Session,
        (Screen::Create, ScreenAction::SessionJoined) => Screen::Session,
        (Screen::Session, ScreenAction::DrawStarted) => Screen::Drawing,
        (Screen::Drawing, ScreenAction::DrawFinished) => Screen::Result,
        (Screen::Result, ScreenAction::BackToSession) => Screen::Session,
        (Screen::Session, ScreenAction::OpenAdmin) => Screen::Admin,
        (Screen::Admin, ScreenAction::CloseAdmin) => Screen::Session,
        (Screen::PreConfig, ScreenAction::PreConfigDone) => Screen::Session,
        (from, action) => return Err(InvalidScreenChange { from, action }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_defaults_to_create() {
        let entry = resolve_entry(false, None, None, None);
        assert_eq!(entry.screen, Screen::Create);
        assert_eq!(entry.session_id, None);
    }

    #[test]
    fn join_link_lands_on_session() {
        let entry = resolve_entry(false, None, None, Some("AB12CD"));
        assert_eq!(entry.screen, Screen::Session);
        assert_eq!(entry.session_id.as_deref(), Some("AB12CD"));
    }

    #[test]
    fn parameter_precedence_matches_the_frontends() {
        // global wins over everything else
        let entry = resolve_entry(true, Some("P"), Some("A"), Some("S"));
        assert_eq!(entry.screen, Screen::Global);
        assert_eq!(entry.session_id, None);

        // preconfig wins over admin and join
        let entry = resolve_entry(false, Some("P"), Some("A"), Some("S"));
        assert_eq!(entry.screen, Screen::PreConfig);
        assert_eq!(entry.session_id.as_deref(), Some("P"));

        // admin wins over join
        let entry = resolve_entry(false, None, Some("A"), Some("S"));
        assert_eq!(entry.screen, Screen::Admin);
        assert_eq!(entry.session_id.as_deref(), Some("A"));
    }

    #[test]
    fn full_happy_path_through_a_draw() {
        let mut screen = Screen::Create;
        for action in [
            ScreenAction::SessionCreated,
            ScreenAction::DrawStarted,
            ScreenAction::DrawFinished,
            ScreenAction::BackToSession,
        ] {
            screen = transition(screen, action).unwrap();
        }
        assert_eq!(screen, Screen::Session);
    }

    #[test]
    fn admin_round_trip() {
        let screen = transition(Screen::Session, ScreenAction::OpenAdmin).unwrap();
        assert_eq!(screen, Screen::Admin);
        let screen = transition(screen, ScreenAction::CloseAdmin).unwrap();
        assert_eq!(screen, Screen::Session);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let err = transition(Screen::Create, ScreenAction::DrawFinished).unwrap_err();
        assert_eq!(err.from, Screen::Create);
        assert_eq!(err.action, ScreenAction::DrawFinished);
    }
}
