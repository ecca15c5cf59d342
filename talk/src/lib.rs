//! Send messages to Nextcloud Talk chats.
//!
//! The core is two pieces: [`render`] turns a message template plus a JSON
//! object into final message text, and [`Client`] posts that text into a Talk
//! chat over the OCS API. The [`cli`] module wires both behind the `talk`
//! binary.

pub mod cli;
pub mod client;
pub mod render;

pub use client::{Client, ClientBuilder, SendError};
pub use render::{RenderError, render};
