pub mod api;
pub mod domain;

/// Default notification title, shared by the daemon and the client fallback.
pub const APP_NAME: &str = "Minuteur";
/// Default completion-notification body.
pub const COMPLETION_BODY: &str = "Votre minuteur est terminé !";
