use mastermind::{
    BoardRenderer, CODE_LENGTH, Code, Colour, Difficulty, Game, Guesser, Hints, Maker,
    RandomMaker, StrategyGuesser, TermRenderer,
};
use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::process;

const SEPARATOR: &str = "        ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerKind {
    Human,
    Auto,
}

#[derive(Debug)]
struct Config {
    guesser: PlayerKind,
    maker: PlayerKind,
    difficulty: String,
    turns: usize,
    rounds: u32,
    seed: Option<u64>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = parse_args(env::args().skip(1).collect())?;
    let difficulty = Difficulty::parse(&config.difficulty)?;

    let guesser: Box<dyn Guesser> = match (config.guesser, config.seed) {
        (PlayerKind::Human, _) => Box::new(HumanGuesser),
        (PlayerKind::Auto, Some(seed)) => Box::new(StrategyGuesser::with_seed(seed)),
        (PlayerKind::Auto, None) => Box::new(StrategyGuesser::new()),
    };
    // Offset derived seeds so the maker and guesser never share a stream.
    let maker: Box<dyn Maker> = match (config.maker, config.seed) {
        (PlayerKind::Human, _) => Box::new(HumanMaker),
        (PlayerKind::Auto, Some(seed)) => Box::new(RandomMaker::with_seed(seed.wrapping_add(1))),
        (PlayerKind::Auto, None) => Box::new(RandomMaker::new()),
    };
    let renderer: Box<dyn BoardRenderer> = Box::new(TermRenderer);

    let mut game = match config.seed {
        Some(seed) => Game::with_seed(
            guesser,
            maker,
            renderer,
            difficulty,
            config.turns,
            config.rounds,
            seed.wrapping_add(2),
        )?,
        None => Game::new(
            guesser,
            maker,
            renderer,
            difficulty,
            config.turns,
            config.rounds,
        )?,
    };

    println!("Welcome to Mastermind!");
    println!(
        "The Maker hides a code of {CODE_LENGTH} colours; the Guesser has {} turns to find it.",
        config.turns
    );
    println!(
        "A red peg marks a colour in the right spot, a white peg a colour in the wrong spot."
    );
    println!();

    let points = game.play();
    println!("Maker scored {points} points.");
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Config, Box<dyn Error>> {
    let mut idx = 0;
    let mut config = Config {
        guesser: PlayerKind::Human,
        maker: PlayerKind::Auto,
        difficulty: String::from("medium"),
        turns: 12,
        rounds: 2,
        seed: None,
    };

    while idx < args.len() {
        let arg = &args[idx];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--guesser" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --guesser (human or auto)"))?;
                config.guesser = parse_player_kind(value)?;
            }
            "--maker" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --maker (human or auto)"))?;
                config.maker = parse_player_kind(value)?;
            }
            "--difficulty" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --difficulty"))?;
                config.difficulty = value.clone();
            }
            "--turns" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --turns"))?;
                config.turns = value
                    .parse()
                    .map_err(|_| format!("invalid value for --turns: {value}"))?;
                if config.turns == 0 {
                    return Err(String::from("--turns must be at least 1").into());
                }
            }
            "--rounds" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --rounds"))?;
                config.rounds = value
                    .parse()
                    .map_err(|_| format!("invalid value for --rounds: {value}"))?;
            }
            "--seed" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --seed"))?;
                config.seed = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid value for --seed: {value}"))?,
                );
            }
            _ => {
                return Err(format!("unknown argument: {arg}").into());
            }
        }
        idx += 1;
    }

    Ok(config)
}

fn parse_player_kind(value: &str) -> Result<PlayerKind, Box<dyn Error>> {
    match value.to_ascii_lowercase().as_str() {
        "human" => Ok(PlayerKind::Human),
        "auto" => Ok(PlayerKind::Auto),
        _ => Err(format!("unknown player kind: {value}").into()),
    }
}

fn print_usage() {
    println!("Play Mastermind in the terminal.");
    println!(
        "Usage: mastermind [--guesser KIND] [--maker KIND] [--difficulty NAME] \
         [--turns N] [--rounds N] [--seed N]"
    );
    println!("Player kinds: 'human' or 'auto'. Defaults: human guesser, auto maker.");
    println!("Only the 'medium' difficulty (six colours) is supported.");
    println!("The number of rounds must be even. With --seed every run replays identically.");
}

/// Prompts until the user supplies one of the accepted tokens
/// (case-insensitively), naming the acceptable values on each miss.
fn input_option(message: &str, options: &[String]) -> String {
    let mut warned = false;
    loop {
        if warned {
            println!("Invalid input. Please input one of the following:");
            println!("{}", options.join(", "));
            println!();
        }

        print!("{message}");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                println!("No input detected, exiting.");
                process::exit(0);
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("Error: {err}");
                process::exit(1);
            }
        }

        let token = line.trim().to_ascii_lowercase();
        if options.iter().any(|option| *option == token) {
            return token;
        }
        warned = true;
    }
}

fn yes_no_input(message: &str) -> bool {
    let options = ["yes", "y", "no", "n"].map(String::from);
    let answer = input_option(&format!("{message} [Y/n]: "), &options);
    answer == "yes" || answer == "y"
}

fn colour_tokens(palette: &[Colour]) -> Vec<String> {
    palette.iter().map(|colour| colour.name().into()).collect()
}

fn format_palette(palette: &[Colour]) -> String {
    palette
        .iter()
        .map(|colour| format!("\x1b[1m{}{}\x1b[0m", colour.fg_code(), colour.name()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn prompt_colour(palette: &[Colour], message: &str) -> Colour {
    println!("Available colours:");
    println!("{}", format_palette(palette));
    let token = input_option(message, &colour_tokens(palette));
    Colour::from_token(&token).expect("token validated against the palette")
}

/// Interactive Guesser: every slot is a validated prompt against the palette.
struct HumanGuesser;

impl Guesser for HumanGuesser {
    fn supply_colour(&mut self, palette: &[Colour], slot: usize) -> Colour {
        prompt_colour(palette, &format!("Please enter your guess for slot {slot}: "))
    }

    fn confirm_guess(&mut self) -> bool {
        yes_no_input("Are you ready to end your turn?")
    }

    fn receive_hints(&mut self, _hints: &Hints) {
        // Feedback is displayed on the rendered board, so no action here.
    }
}

/// Interactive Maker: four validated prompts build the hidden answer.
struct HumanMaker;

impl Maker for HumanMaker {
    fn supply_answer(&mut self, palette: &[Colour]) -> Code {
        let mut code = [palette[0]; CODE_LENGTH];
        for slot in 0..CODE_LENGTH {
            code[slot] = prompt_colour(
                palette,
                &format!("Please set a colour for slot {}: ", slot + 1),
            );
        }
        code
    }
}
