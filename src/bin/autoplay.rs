use mastermind::{Difficulty, Game, NullRenderer, RandomMaker, StrategyGuesser};
use std::error::Error;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let seed = match std::env::args().nth(1) {
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| format!("usage: mastermind-autoplay [seed], got: {raw}"))?,
        ),
        None => None,
    };

    let mut game = match seed {
        Some(seed) => Game::with_seed(
            Box::new(StrategyGuesser::with_seed(seed)),
            Box::new(RandomMaker::with_seed(seed.wrapping_add(1))),
            Box::new(NullRenderer),
            Difficulty::Medium,
            12,
            2,
            seed.wrapping_add(2),
        )?,
        None => Game::new(
            Box::new(StrategyGuesser::new()),
            Box::new(RandomMaker::new()),
            Box::new(NullRenderer),
            Difficulty::Medium,
            12,
            2,
        )?,
    };

    let points = game.play();
    println!("Maker scored {points} points.");
    Ok(())
}
