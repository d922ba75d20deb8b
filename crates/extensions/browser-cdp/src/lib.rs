//! Chrome control for hourfill.
//!
//! Drives a real Chrome/Chromium over the Chrome DevTools Protocol (CDP).
//! Pure Rust implementation with zero Node.js dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │  hourfill       │ ◄──────────────► │   Chrome/Edge    │
//! │  (this crate)   │       CDP        │ (launched by us) │
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! [`BrowserManager`] launches Chrome with `--remote-debugging-port` and a
//! persistent profile (so portal sessions and "remember this device" cookies
//! survive between runs), or attaches to one already listening on the port.
//! [`PageSession`] exposes the page operations the portal adapter needs:
//! navigation, script evaluation, mouse clicks and keyboard input.

pub mod cdp;
pub mod manager;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
