//! Simple console interactive player.

use crate::cards::{Card, Color};
use crate::game::PlayerId;
use crossterm::style::{Color as TermColor, Stylize};
use rand::RngCore;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::str::FromStr;

use super::{AgentKind, Decision, DecisionPhase, DecisionProvider, Observation};

/// Reads decisions from `input` and prints the table to `output`.
///
/// End of input is treated as drawing, so a closed stdin cannot stall a game.
pub struct ConsoleAgent<R = BufReader<Stdin>, W = Stdout> {
    input: R,
    output: W,
    color: bool,
}

impl ConsoleAgent {
    /// A console player on stdin/stdout.
    pub fn stdio(color: bool) -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout(), color)
    }
}

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Draw,
    Play(usize),
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "d" | "draw" | "p" | "pass" => Ok(Command::Draw),
            // shown to the player 1-based
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Play(n - 1)),
                _ => Err(()),
            },
        }
    }
}

struct YesNo(bool);

impl FromStr for YesNo {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(YesNo(true)),
            "n" | "no" => Ok(YesNo(false)),
            _ => Err(()),
        }
    }
}

impl<R: BufRead, W: Write> ConsoleAgent<R, W> {
    pub fn new(input: R, output: W, color: bool) -> Self {
        Self { input, output, color }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask until the answer parses. `None` on end of input or an I/O error.
    fn prompt<T: FromStr>(&mut self, question: &str) -> Option<T> {
        loop {
            let asked = write!(self.output, "{question}").and_then(|_| self.output.flush());
            if let Err(err) = asked {
                tracing::warn!(%err, "console output failed");
                return None;
            }
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "console input failed");
                    return None;
                }
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Ok(answer) = trimmed.parse() {
                return Some(answer);
            }
            self.say("Invalid input, try again");
        }
    }

    fn say(&mut self, line: &str) {
        if let Err(err) = writeln!(self.output, "{line}") {
            tracing::warn!(%err, "console output failed");
        }
    }

    fn format_card(&self, card: Card) -> String {
        let text = card.to_string();
        if !self.color {
            return text;
        }
        match card.color() {
            Some(c) if card.is_wild() => text.with(term_color(c)).bold().to_string(),
            Some(c) => text.with(term_color(c)).to_string(),
            None => text.magenta().bold().to_string(),
        }
    }

    fn show_table(&mut self, obs: &Observation) {
        let top = obs.top.map_or_else(|| "(none)".to_string(), |c| self.format_card(c));
        let opponents = obs
            .opponents
            .iter()
            .map(|o| format!("{}: {} cards", o.id, o.hand_size))
            .collect::<Vec<_>>()
            .join(", ");
        self.say("");
        self.say(&format!("Turn {} ({}), deck {}", obs.turn + 1, obs.direction, obs.deck_len));
        self.say(&format!("Top card: {top}"));
        if obs.pending.is_active() {
            self.say(&format!("Pending draw: {}", obs.pending));
        }
        self.say(&format!("Opponents: {opponents}"));
        self.say(&format!("{}, your hand:", obs.player));
        let legal = obs.legal_indices();
        for (i, &card) in obs.hand.iter().enumerate() {
            let mark = if legal.contains(&i) { '*' } else { ' ' };
            let line = format!("{mark} {:>2}. {}", i + 1, self.format_card(card));
            self.say(&line);
        }
    }
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Red => TermColor::Red,
        Color::Blue => TermColor::Blue,
        Color::Green => TermColor::Green,
        Color::Yellow => TermColor::Yellow,
    }
}

impl<R: BufRead, W: Write> DecisionProvider for ConsoleAgent<R, W> {
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }

    fn decide(&mut self, obs: &Observation, _rng: &mut dyn RngCore) -> Decision {
        self.show_table(obs);
        let question = match obs.phase {
            DecisionPhase::Play => "Card number to play, or 'd' to draw: ",
            DecisionPhase::Stack => "Card number to stack, or 'd' to take the cards: ",
        };
        loop {
            match self.prompt::<Command>(question) {
                None | Some(Command::Draw) => return Decision::Draw,
                Some(Command::Play(index)) if obs.is_legal(index) => {
                    return Decision::play(index);
                }
                Some(Command::Play(_)) => self.say("That card cannot be played now"),
            }
        }
    }

    fn choose_color(&mut self, obs: &Observation, _rng: &mut dyn RngCore) -> Color {
        self.prompt::<Color>("Choose a color (R/B/G/Y): ").unwrap_or(obs.default_color)
    }

    fn play_drawn(&mut self, _obs: &Observation, card: Card, _rng: &mut dyn RngCore) -> bool {
        let question = format!("You drew {}. Play it? (y/n): ", self.format_card(card));
        self.prompt::<YesNo>(&question).map_or(false, |a| a.0)
    }

    fn accept_exchange(
        &mut self,
        _obs: &Observation,
        target: PlayerId,
        target_hand: usize,
    ) -> bool {
        let question = format!("Swap hands with {target} ({target_hand} cards)? (y/n): ");
        self.prompt::<YesNo>(&question).map_or(false, |a| a.0)
    }

    fn on_game_end(&mut self, me: PlayerId, winner: Option<PlayerId>) {
        match winner {
            Some(w) if w == me => self.say("You win!"),
            Some(w) => self.say(&format!("{w} wins.")),
            None => self.say("The game was stopped before anyone won."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::OpponentView;
    use crate::cards::parse_cards;
    use crate::game::{Direction, PendingDraw};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::io::Cursor;

    fn obs() -> Observation {
        Observation {
            player: PlayerId::new(1),
            phase: DecisionPhase::Play,
            hand: parse_cards("B7 R9 Draw6").unwrap(),
            top: parse_cards("R5").unwrap().pop(),
            pending: PendingDraw::NONE,
            opponents: vec![OpponentView { id: PlayerId::new(2), hand_size: 5 }],
            direction: Direction::Clockwise,
            turn: 0,
            deck_len: 100,
            default_color: Color::Red,
        }
    }

    fn agent(input: &str) -> ConsoleAgent<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleAgent::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), false)
    }

    #[test]
    fn reprompts_until_a_legal_card() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut a = agent("x\n1\n2\n");
        assert_eq!(a.decide(&obs(), &mut rng), Decision::play(1));
        let out = String::from_utf8(a.into_output()).unwrap();
        assert!(out.contains("Invalid input"));
        assert!(out.contains("cannot be played"));
        assert!(out.contains("*  2. Red 9"));
    }

    #[test]
    fn draw_and_end_of_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(agent("d\n").decide(&obs(), &mut rng), Decision::Draw);
        assert_eq!(agent("").decide(&obs(), &mut rng), Decision::Draw);
    }

    #[test]
    fn color_and_yes_no_prompts() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(agent("purple\ng\n").choose_color(&obs(), &mut rng), Color::Green);
        assert_eq!(agent("").choose_color(&obs(), &mut rng), Color::Red);
        let card = Card::new(crate::cards::Value::Number(5), Color::Red);
        assert!(agent("y\n").play_drawn(&obs(), card, &mut rng));
        assert!(!agent("no\n").accept_exchange(&obs(), PlayerId::new(2), 1));
    }
}
