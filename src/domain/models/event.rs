#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ReloadReason {
    Logout,
    SessionExpired,
    SessionRejected,
}

/// Events emitted by the client layers for the application to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// All in-memory state should be rebuilt from storage.
    ReloadRequested(ReloadReason),
}
