//! Everything the engine says, in one place.

use codehunt_protocol::{Button, Notice};
use codehunt_store::Player;

pub const GAME_NOT_STARTED_YET: &str = "Game has not started yet.";
pub const GAME_ON: &str = "Game on! Use /code to enter code or /list to see opponents.";
pub const GAME_NOT_RUNNING: &str = "Game hasn't started.";
pub const GAME_OVER: &str = "Game over.";
pub const SEND_A_CODE: &str = "Send a code to try.";
pub const OWN_CODE: &str = "That's your own code!";
pub const NO_MATCH: &str = "No match.";
pub const ALREADY_DISCOVERED: &str = "Already discovered.";
pub const NO_OPPONENTS: &str = "No available opponents yet.";
pub const AVAILABLE_OPPONENTS: &str = "Available opponents:";
pub const CONFIRM_KICK: &str = "Confirm kick?";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong.";
pub const ALREADY_OUT: &str = "Opponent already out.";
pub const KICK_CANCELLED: &str = "Kick cancelled.";
pub const ALREADY_STARTED: &str = "Game already started.";
pub const STARTED: &str = "Game started!";
pub const NOT_RUNNING: &str = "Game not running.";
pub const ENDED: &str = "Game ended.";
pub const RESET: &str = "Game reset.";
pub const NO_PLAYERS: &str = "No players yet.";
pub const START_BROADCAST: &str = "The game has started! Send /start to open the game.";
pub const END_BROADCAST: &str = "The game is over.";

/// Shown on every entry once the actor has been kicked.
pub fn kicked_on_entry(kicker: Option<&Player>) -> Notice {
    let name = kicker.map_or_else(|| "someone".to_owned(), Player::display_name);
    Notice::text(format!("Game over. You were kicked by {name}."))
}

pub fn discovered(other: &Player) -> Notice {
    Notice::text(format!("You discovered {}.", other.display_name()))
}

pub fn opponents(players: &[Player]) -> Notice {
    let options = players
        .iter()
        .map(|p| Button::kick(p.display_name(), p.id))
        .collect();
    Notice::with_options(AVAILABLE_OPPONENTS, options)
}

pub fn confirm_kick() -> Notice {
    Notice::with_options(
        CONFIRM_KICK,
        vec![Button::confirm_kick(), Button::cancel_kick()],
    )
}

pub fn you_kicked(target: &Player) -> Notice {
    Notice::text(format!("You kicked {}.", target.display_name()))
}

pub fn kicked_by(actor: &Player) -> Notice {
    Notice::text(format!(
        "You were kicked by {}. Your game is over.",
        actor.display_name()
    ))
}

pub fn out_of_game(target: &Player) -> Notice {
    Notice::text(format!("{} is out of the game.", target.display_name()))
}

pub fn player_joined(player: &Player) -> Notice {
    Notice::text(format!("Player {} joined.", player.display_name()))
}

/// Admin roster: one line per player.
pub fn roster(players: &[&Player]) -> Notice {
    if players.is_empty() {
        return Notice::text(NO_PLAYERS);
    }
    let lines: Vec<String> = players
        .iter()
        .map(|p| {
            let state = if p.alive { "in game" } else { "out" };
            format!("{} {} {state}", p.display_name(), p.code)
        })
        .collect();
    Notice::text(lines.join("\n"))
}
