//! Text renderer for terminal viewing.

use std::fmt::Write;

use crate::game::{Event, GameState, PathDeck};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Render the game at `turn` of `total` moves.
///
/// Output format:
/// ```text
/// Move 2/4                              [P0: 0] [P1: 3]
/// :: Mo Do ::
///    0  1
/// Player 0 Money=10 V1=0 V2=0 Points=0 A=0 B=0 C=0 D=0 E=0
/// Player 1 Money=0 V1=0 V2=0 Points=3 A=0 B=0 C=0 D=0 E=0
/// ```
///
/// With `color` set the header is bold and the status lines dimmed.
#[must_use]
pub fn render_ascii(state: &GameState, turn: usize, total: usize, color: bool) -> String {
    let mut output = String::new();
    let (bold, dim, reset) = if color { (BOLD, DIM, RESET) } else { ("", "", "") };

    let header = format!("Move {turn}/{total}");
    let scores: String = state
        .scores()
        .iter()
        .enumerate()
        .map(|(id, score)| format!(" [P{id}: {score}]"))
        .collect();
    let padding = 38usize.saturating_sub(header.len());
    let _ = writeln!(output, "{bold}{header}{reset}{}{scores}", " ".repeat(padding));

    output.push_str(&state.board().render());

    for record in state.records() {
        let _ = writeln!(output, "{dim}{record}{reset}");
    }
    output
}

/// Describe one move in words, e.g. `Player 1 -> site 2 (Do): +3 points, -7 money`.
#[must_use]
pub fn describe_event(path: &PathDeck, event: &Event) -> String {
    let tag = path.get(event.site).map_or("??", |site| site.kind.tag());
    let mut effects = Vec::new();
    if event.effect.points > 0 {
        effects.push(format!("+{} points", event.effect.points));
    }
    if event.effect.money_delta != 0 {
        effects.push(format!("{:+} money", event.effect.money_delta));
    }
    if let Some(item) = event.effect.item {
        effects.push(format!("item {item}"));
    }

    let mut line = format!("Player {} -> site {} ({tag})", event.player, event.site);
    if !effects.is_empty() {
        line.push_str(": ");
        line.push_str(&effects.join(", "));
    }
    line
}
