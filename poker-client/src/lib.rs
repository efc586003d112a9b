//! Terminal client for a networked five-card draw poker table.
//!
//! The server deals, evaluates and scores; this crate only talks to it and
//! drives the player's side of each round. Each module focuses on one
//! concern:
//!
//! - [`cli`] parses the host, port and optional player name.
//! - [`message`] provides the JSON line protocol and its typed envelopes.
//! - [`card`] models cards, suits and the hand ranks the server reports.
//! - [`ansi`] colours text with 24-bit escapes and frames result banners.
//! - [`prompt`] parses the player's answers and renders the discard view.
//! - [`console`] is the shared terminal output plus line input.
//! - [`client`] connects and runs the draw, discard, redraw, submit loop.
//!
//! Live views such as the hand being discarded from are kept in
//! [`flow_cell::FlowCell`]s and redrawn by watchers whenever they change.

pub mod ansi;
pub mod card;
pub mod cli;
pub mod client;
pub mod console;
pub mod message;
pub mod prompt;
