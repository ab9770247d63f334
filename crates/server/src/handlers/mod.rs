/// Content browsing, search and access routes.
pub(crate) mod content;

/// Creator dashboard routes.
pub(crate) mod creator;

/// Licensed file download routes.
pub(crate) mod files;

/// License purchase and listing routes.
pub(crate) mod license;

/// Platform statistics routes.
pub(crate) mod stats;

/// Content upload and registration routes.
pub(crate) mod upload;

/// Blockchain wallet session routes.
pub(crate) mod wallet;
