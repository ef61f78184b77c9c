use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The four card colors. Wild cards have no color until one is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    pub const fn to_char(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Green => 'G',
            Color::Yellow => 'Y',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
        }
    }

    /// Position in [`Color::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColorParseError {
    #[error("invalid color: '{0}'")]
    Invalid(String),
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.len() == 1 {
            if let Some(c) = t.chars().next() {
                return Color::try_from(c);
            }
        }
        match t.to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "blue" => Ok(Color::Blue),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            _ => Err(ColorParseError::Invalid(s.to_string())),
        }
    }
}

impl TryFrom<char> for Color {
    type Error = ColorParseError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'R' => Ok(Color::Red),
            'B' => Ok(Color::Blue),
            'G' => Ok(Color::Green),
            'Y' => Ok(Color::Yellow),
            _ => Err(ColorParseError::Invalid(c.to_string())),
        }
    }
}

/// Coarse card classification, derived from the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Number,
    Action,
    Wild,
}

/// What is printed on a card.
///
/// `Number` holds 0..=9; constructors and the parser never build anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Value {
    Number(u8),
    Skip,
    SkipAll,
    Reverse,
    Draw2,
    Draw4,
    DiscardColor,
    Wild,
    WildDraw4,
    ReverseDraw4,
    Draw6,
    Draw10,
    ColorRoulette,
}

impl Value {
    /// Every non-number value, in deck-building order.
    pub const SPECIALS: [Value; 12] = [
        Value::Skip,
        Value::SkipAll,
        Value::Reverse,
        Value::Draw2,
        Value::Draw4,
        Value::DiscardColor,
        Value::Wild,
        Value::WildDraw4,
        Value::ReverseDraw4,
        Value::Draw6,
        Value::Draw10,
        Value::ColorRoulette,
    ];

    pub const fn kind(self) -> Kind {
        match self {
            Value::Number(_) => Kind::Number,
            Value::Skip
            | Value::SkipAll
            | Value::Reverse
            | Value::Draw2
            | Value::Draw4
            | Value::DiscardColor => Kind::Action,
            Value::Wild
            | Value::WildDraw4
            | Value::ReverseDraw4
            | Value::Draw6
            | Value::Draw10
            | Value::ColorRoulette => Kind::Wild,
        }
    }

    pub const fn is_wild(self) -> bool {
        matches!(self.kind(), Kind::Wild)
    }

    /// The label used in card notation and statistics keys.
    pub fn label(self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Skip => "Skip".into(),
            Value::SkipAll => "SkipAll".into(),
            Value::Reverse => "Reverse".into(),
            Value::Draw2 => "Draw2".into(),
            Value::Draw4 => "Draw4".into(),
            Value::DiscardColor => "DiscardColor".into(),
            Value::Wild => "Wild".into(),
            Value::WildDraw4 => "WildDraw4".into(),
            Value::ReverseDraw4 => "ReverseDraw4".into(),
            Value::Draw6 => "Draw6".into(),
            Value::Draw10 => "Draw10".into(),
            Value::ColorRoulette => "ColorRoulette".into(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueParseError {
    #[error("invalid card value: '{0}'")]
    Invalid(String),
}

impl FromStr for Value {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Ok(n) = t.parse::<u8>() {
            if n <= 9 {
                return Ok(Value::Number(n));
            }
            return Err(ValueParseError::Invalid(s.to_string()));
        }
        let v = match t.to_ascii_lowercase().as_str() {
            "skip" => Value::Skip,
            "skipall" => Value::SkipAll,
            "reverse" => Value::Reverse,
            "draw2" | "+2" => Value::Draw2,
            "draw4" | "+4" => Value::Draw4,
            "discardcolor" => Value::DiscardColor,
            "wild" => Value::Wild,
            "wilddraw4" => Value::WildDraw4,
            "reversedraw4" => Value::ReverseDraw4,
            "draw6" | "+6" => Value::Draw6,
            "draw10" | "+10" => Value::Draw10,
            "colorroulette" => Value::ColorRoulette,
            _ => return Err(ValueParseError::Invalid(s.to_string())),
        };
        Ok(v)
    }
}

/// A playing card: value plus color.
///
/// Colored cards are built with [`Card::new`]; wild cards with [`Card::wild`]
/// start without a color and receive one through [`Card::with_color`] when played.
///
/// ```
/// use uno_rs::cards::{Card, Color, Value};
///
/// let card = Card::new(Value::Number(5), Color::Red);
/// assert_eq!(card.to_string(), "Red 5");
/// assert_eq!(Card::wild(Value::Draw6).to_string(), "Draw6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Card {
    value: Value,
    color: Option<Color>,
}

impl Card {
    /// A colored (number or action) card.
    pub const fn new(value: Value, color: Color) -> Self {
        Self { value, color: Some(color) }
    }

    /// An uncolored wild card.
    pub const fn wild(value: Value) -> Self {
        Self { value, color: None }
    }

    pub const fn value(self) -> Value {
        self.value
    }

    pub const fn color(self) -> Option<Color> {
        self.color
    }

    pub const fn kind(self) -> Kind {
        self.value.kind()
    }

    pub const fn is_wild(self) -> bool {
        self.value.is_wild()
    }

    /// The same card with `color` assigned. Only wild cards take a chosen color.
    pub const fn with_color(self, color: Color) -> Self {
        if self.is_wild() {
            Self { value: self.value, color: Some(color) }
        } else {
            self
        }
    }

    /// Drops a chosen color from a wild card; colored cards are unchanged.
    pub const fn cleared(self) -> Self {
        if self.is_wild() {
            Self { value: self.value, color: None }
        } else {
            self
        }
    }

    /// Key used for play-count statistics: wild cards by value, others by color and value.
    pub fn stats_key(self) -> String {
        if self.is_wild() {
            self.value.label()
        } else {
            self.cleared().to_string()
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_wild(), self.color) {
            (true, Some(c)) => write!(f, "{} ({})", self.value, c),
            (true, None) => write!(f, "{}", self.value),
            (false, Some(c)) => write!(f, "{} {}", c, self.value),
            (false, None) => write!(f, "{}", self.value),
        }
    }
}

/// Whether `card` may be played on `top`.
///
/// Wild cards are always playable. Otherwise the card must share the top card's
/// color or value; an uncolored wild on top places no color constraint.
///
/// ```
/// use uno_rs::cards::{is_playable, Card, Color, Value};
///
/// let top = Card::new(Value::Number(5), Color::Red);
/// assert!(is_playable(Card::new(Value::Number(9), Color::Red), top));
/// assert!(is_playable(Card::new(Value::Number(5), Color::Blue), top));
/// assert!(!is_playable(Card::new(Value::Skip, Color::Blue), top));
/// ```
pub fn is_playable(card: Card, top: Card) -> bool {
    if card.is_wild() {
        return true;
    }
    match top.color {
        None => true,
        Some(active) => card.color == Some(active) || card.value == top.value,
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid card: '{0}'")]
    Invalid(String),
    #[error("wild card cannot be written with a leading color: '{0}'")]
    ColoredWild(String),
    #[error("colored card needs a color prefix: '{0}'")]
    MissingColor(String),
    #[error(transparent)]
    Color(#[from] ColorParseError),
    #[error(transparent)]
    Value(#[from] ValueParseError),
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Compact notation: `R5`, `BDraw4`, `GSkip`, `Draw6`, and `Draw6:R` for a
    /// wild with a chosen color.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(CardParseError::Invalid(s.to_string()));
        }

        // Bare wild value, optionally with ":<color>"
        let (head, chosen) = match t.split_once(':') {
            Some((h, c)) => (h, Some(Color::from_str(c)?)),
            None => (t, None),
        };
        if let Ok(value) = Value::from_str(head) {
            if !value.is_wild() {
                return Err(CardParseError::MissingColor(s.to_string()));
            }
            let card = Card::wild(value);
            return Ok(match chosen {
                Some(c) => card.with_color(c),
                None => card,
            });
        }
        if chosen.is_some() {
            return Err(CardParseError::Invalid(s.to_string()));
        }

        let mut chars = t.chars();
        let color_ch = chars.next().ok_or_else(|| CardParseError::Invalid(s.to_string()))?;
        let color = Color::try_from(color_ch)?;
        let value = Value::from_str(chars.as_str())?;
        if value.is_wild() {
            return Err(CardParseError::ColoredWild(s.to_string()));
        }
        Ok(Card::new(value, color))
    }
}

/// Parse multiple cards separated by whitespace or commas.
///
/// ```
/// use uno_rs::cards::{parse_cards, Card, Color, Value};
///
/// let cards = parse_cards("R5, BDraw4 ColorRoulette").unwrap();
/// assert_eq!(cards[0], Card::new(Value::Number(5), Color::Red));
/// assert_eq!(cards[1], Card::new(Value::Draw4, Color::Blue));
/// assert_eq!(cards[2], Card::wild(Value::ColorRoulette));
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Card::from_str)
        .collect()
}
