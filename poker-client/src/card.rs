use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ansi::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suit {
    Spades,
    Clubs,
    Diamonds,
    Hearts,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Clubs, Suit::Diamonds, Suit::Hearts];

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "Spades",
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
            Suit::Hearts => "Hearts",
        }
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Hearts => '♥',
        }
    }

    pub fn color(self) -> CardColor {
        match self {
            Suit::Spades | Suit::Clubs => CardColor::Black,
            Suit::Diamonds | Suit::Hearts => CardColor::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardColor {
    Black,
    Red,
}

/// A playing card as the server sends it: `value` runs from 1 (ace) to 13
/// (king).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub value: u8,
    pub suit: Suit,
}

impl Card {
    pub fn new(value: u8, suit: Suit) -> Self {
        Self { value, suit }
    }

    /// Face cards count as ten.
    pub fn value_ten(self) -> u8 {
        self.value.min(10)
    }

    pub fn color(self) -> CardColor {
        self.suit.color()
    }

    pub fn face(self) -> String {
        match self.value {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face(), self.suit.symbol())
    }
}

/// Hand ranks, best first, as reported by the server's evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PokerHand {
    RoyalFlush,
    StraightFlush,
    FourKind,
    FullHouse,
    Flush,
    Straight,
    ThreeKind,
    TwoPair,
    Pair,
    HighCard,
}

impl PokerHand {
    pub fn name(self) -> &'static str {
        match self {
            PokerHand::RoyalFlush => "Royal Flush",
            PokerHand::StraightFlush => "Straight Flush",
            PokerHand::FourKind => "Four of a Kind",
            PokerHand::FullHouse => "Full House",
            PokerHand::Flush => "Flush",
            PokerHand::Straight => "Straight",
            PokerHand::ThreeKind => "Three of a Kind",
            PokerHand::TwoPair => "Two Pair",
            PokerHand::Pair => "Pair",
            PokerHand::HighCard => "High Card",
        }
    }

    /// Payout multiplier the server uses when nobody overrides it.
    pub fn default_winnings(self) -> u32 {
        match self {
            PokerHand::RoyalFlush => 250,
            PokerHand::StraightFlush => 50,
            PokerHand::FourKind => 25,
            PokerHand::FullHouse => 9,
            PokerHand::Flush => 6,
            PokerHand::Straight => 4,
            PokerHand::ThreeKind => 3,
            PokerHand::TwoPair => 2,
            PokerHand::Pair => 1,
            PokerHand::HighCard => 0,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            PokerHand::RoyalFlush => Rgb::GOLD,
            PokerHand::StraightFlush => Rgb::SILVER,
            PokerHand::FourKind => Rgb::BRONZE,
            PokerHand::FullHouse => Rgb::ORANGE,
            PokerHand::Flush => Rgb::RED,
            PokerHand::Straight => Rgb::PINK,
            PokerHand::ThreeKind => Rgb::MAGENTA,
            PokerHand::TwoPair => Rgb::GREEN,
            PokerHand::Pair => Rgb::YELLOW,
            PokerHand::HighCard => Rgb::WHITE,
        }
    }
}

impl fmt::Display for PokerHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `[A♠, 10♥, K♣]`
pub fn hand_symbols(hand: &[Card]) -> String {
    let symbols: Vec<String> = hand.iter().map(Card::to_string).collect();
    format!("[{}]", symbols.join(", "))
}
