//! Router Module Index
//!
//! Organizes the shell's routes by the gate each group sits behind. The admin
//! module declares its allow-lists in the handler signatures (`Gated<Surface>`),
//! so a handler cannot be reached without its check.

/// Routes accessible to anyone, logged in or not: health, navigation and the
/// session lifecycle itself.
pub mod public;

/// Routes behind the `CurrentUser` middleware. Requires an active session.
pub mod authenticated;

/// Routes restricted to explicit role allow-lists (admin and super-admin dashboards).
pub mod admin;
