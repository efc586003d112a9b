//! Parsing of the short answers typed at the client's prompts.

use crate::{
    ansi::{Colorize, Rgb},
    card::Card,
};

pub const HAND_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continue {
    Yes,
    No,
}

impl Continue {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" => Some(Continue::Yes),
            "N" | "NO" => Some(Continue::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PokerPlay {
    Continue,
    Stop,
}

impl PokerPlay {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "S" | "STOP" => Some(PokerPlay::Stop),
            "C" | "CONTINUE" => Some(PokerPlay::Continue),
            _ => None,
        }
    }
}

/// One line typed while choosing discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardChoice {
    Play(PokerPlay),
    /// Zero-based position of the card to throw away.
    Slot(usize),
}

impl DiscardChoice {
    /// Accepts a play keyword or a one-based card position `1..=5`.
    pub fn parse(input: &str) -> Option<Self> {
        if let Some(play) = PokerPlay::parse(input) {
            return Some(DiscardChoice::Play(play));
        }
        match input.trim().parse::<usize>() {
            Ok(position) if (1..=HAND_SIZE).contains(&position) => {
                Some(DiscardChoice::Slot(position - 1))
            }
            _ => None,
        }
    }
}

/// The hand while discarding: discarded slots show as `[]`.
pub fn render_selection(selection: &[Option<Card>]) -> String {
    let slots: Vec<String> = selection
        .iter()
        .map(|slot| match slot {
            Some(card) => card.to_string().color(Rgb::CYAN),
            None => "[]".to_string(),
        })
        .collect();
    slots.join(", ")
}

pub fn discard_prompt() -> String {
    format!(
        "Choose what {} to {} via {}. {} (Or type \"({})top\" to stop {})",
        "cards".color(Rgb::ORANGE),
        "discard".color(Rgb::RED),
        "index".color(Rgb::YELLOW),
        "(Enter 1-5)".color(Rgb::CYAN),
        "S".color(Rgb::RED),
        "discarding".color(Rgb::RED),
    )
}

pub fn continue_prompt() -> String {
    format!(
        "Would you like to keep playing? ({})es/({})o?",
        "Y".color(Rgb::GREEN),
        "N".color(Rgb::RED),
    )
}

pub fn name_prompt(suggested: &str) -> String {
    format!(
        "The name given to you is: {suggested}. You can change it now if you wish to. \
         Enter your name: (Leave empty if you want to keep your chosen name)"
    )
}
