//! Build identity constants surfaced through the export view.

/// Application name shown in the UI when `general.name` is left unset.
pub const APP_NAME: &str = "cfgtree";

/// License identifier reported to the rendering layer.
pub const LICENSE: &str = "mit";

/// Build reference reported as the `version` export field.
pub const BUILD_REF: &str = env!("CARGO_PKG_VERSION");
