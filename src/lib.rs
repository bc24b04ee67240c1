use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;

/// The fixed length of the hidden code and of every guess.
pub const CODE_LENGTH: usize = 4;
const PALETTE_SIZE: usize = 6;

/// Points the Maker earns when the Guesser exhausts every turn without a win.
pub const EXHAUSTION_BONUS: u32 = 13;

/// The classic six-colour palette used by the `medium` difficulty.
pub const CLASSIC_COLOURS: [Colour; PALETTE_SIZE] = [
    Colour::Red,
    Colour::Magenta,
    Colour::Yellow,
    Colour::Green,
    Colour::Cyan,
    Colour::Blue,
];

static COLOUR_TOKENS: Lazy<HashMap<&'static str, Colour>> = Lazy::new(|| {
    CLASSIC_COLOURS
        .iter()
        .map(|&colour| (colour.name(), colour))
        .collect()
});

/// An ordered 4-colour code, used for both hidden answers and guesses.
pub type Code = [Colour; CODE_LENGTH];

/// One graded turn: a marker per slot, `None` where the slot earned nothing.
/// After scrambling the slot order carries no positional information.
pub type Hints = [Option<Hint>; CODE_LENGTH];

/// A peg colour. No identity beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Red,
    Magenta,
    Yellow,
    Green,
    Cyan,
    Blue,
}

impl Colour {
    /// Returns the lowercase token used for this colour in prompts and input.
    pub fn name(self) -> &'static str {
        match self {
            Colour::Red => "red",
            Colour::Magenta => "magenta",
            Colour::Yellow => "yellow",
            Colour::Green => "green",
            Colour::Cyan => "cyan",
            Colour::Blue => "blue",
        }
    }

    /// Looks a colour up by its token, case-insensitively.
    pub fn from_token(token: &str) -> Option<Colour> {
        COLOUR_TOKENS
            .get(token.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Foreground ANSI code for printing this colour's name in its own colour.
    pub fn fg_code(self) -> &'static str {
        match self {
            Colour::Red => "\x1b[31m",
            Colour::Magenta => "\x1b[35m",
            Colour::Yellow => "\x1b[33m",
            Colour::Green => "\x1b[32m",
            Colour::Cyan => "\x1b[36m",
            Colour::Blue => "\x1b[34m",
        }
    }

    fn bg_code(self) -> &'static str {
        match self {
            Colour::Red => "\x1b[41m",
            Colour::Magenta => "\x1b[45m",
            Colour::Yellow => "\x1b[43m",
            Colour::Green => "\x1b[42m",
            Colour::Cyan => "\x1b[46m",
            Colour::Blue => "\x1b[44m",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The skill levels a session can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Medium,
}

impl Difficulty {
    /// Parses a difficulty name, case-insensitively.
    pub fn parse(name: &str) -> Result<Difficulty, MastermindError> {
        match name.to_ascii_lowercase().as_str() {
            "medium" => Ok(Difficulty::Medium),
            _ => Err(MastermindError::UnknownDifficulty {
                name: name.to_string(),
            }),
        }
    }

    /// Returns the palette this difficulty plays with.
    pub fn palette(self) -> &'static [Colour] {
        match self {
            Difficulty::Medium => &CLASSIC_COLOURS,
        }
    }
}

/// The markers a graded slot can earn. A slot that earns neither is absent
/// and contributes nothing to the visible hint collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Right colour in the right position.
    Exact,
    /// Right colour, wrong position.
    Present,
}

impl Hint {
    fn bg_code(self) -> &'static str {
        match self {
            Hint::Exact => "\x1b[41m",   // red peg
            Hint::Present => "\x1b[47m", // white peg
        }
    }
}

/// Grades a guess against the hidden answer.
///
/// Pass one credits `Exact` per matching slot; every non-matching answer
/// colour goes into a leftover pool. Pass two credits `Present` where the
/// pool still holds the guessed colour, consuming one instance per credit so
/// duplicated colours are never over-counted. Slot order here still mirrors
/// the guess; callers that show the result must scramble it first.
pub fn grade(answer: &Code, guess: &Code) -> Hints {
    let mut hints = [None; CODE_LENGTH];
    let mut leftovers = [0u8; PALETTE_SIZE];

    for idx in 0..CODE_LENGTH {
        if guess[idx] == answer[idx] {
            hints[idx] = Some(Hint::Exact);
        } else {
            leftovers[answer[idx].index()] += 1;
        }
    }

    for idx in 0..CODE_LENGTH {
        if hints[idx].is_some() {
            continue;
        }

        let lookup = guess[idx].index();
        if leftovers[lookup] > 0 {
            hints[idx] = Some(Hint::Present);
            leftovers[lookup] -= 1;
        }
    }

    hints
}

/// Reorders a graded turn so hint positions reveal nothing about slots.
///
/// A mixed collection is reshuffled until its order differs from the input;
/// a uniform collection (all four entries equal) is left untouched, since
/// every ordering of it is the same.
pub fn scramble_hints(hints: &mut Hints, rng: &mut impl Rng) {
    let first = hints[0];
    if hints.iter().all(|&hint| hint == first) {
        return;
    }

    let original = *hints;
    while *hints == original {
        hints.shuffle(rng);
    }
}

/// Whether a graded turn means the guess matched the answer completely.
pub fn is_winning_grade(hints: &Hints) -> bool {
    hints.iter().all(|hint| matches!(hint, Some(Hint::Exact)))
}

/// One turn's record on the board: guessed colours and their graded hints,
/// both nullable per slot while the turn is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Row {
    colours: [Option<Colour>; CODE_LENGTH],
    hints: Hints,
}

impl Row {
    /// Returns the guess slots, `None` where nothing has been placed yet.
    pub fn colours(&self) -> &[Option<Colour>; CODE_LENGTH] {
        &self.colours
    }

    /// Returns the hint slots for this turn.
    pub fn hints(&self) -> &Hints {
        &self.hints
    }
}

/// A fixed-size store of rows, one per turn, with a cursor marking the turn
/// currently being played. Rendering is left to [`BoardRenderer`] impls; the
/// board only exposes its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Row>,
    current: usize,
}

impl Board {
    /// Creates an empty board with one row per allowed turn.
    pub fn new(number_of_rows: usize) -> Self {
        Self {
            rows: vec![Row::default(); number_of_rows],
            current: 0,
        }
    }

    /// Writes a colour into the given slot of the current row.
    pub fn place_colour(&mut self, colour: Colour, slot: usize) {
        debug_assert!(slot < CODE_LENGTH, "slot index out of range");
        self.rows[self.current].colours[slot] = Some(colour);
    }

    /// Replaces the current row's hints wholesale.
    pub fn insert_hints(&mut self, hints: Hints) {
        self.rows[self.current].hints = hints;
    }

    /// Moves the cursor to the next row, saturating at the last one.
    pub fn advance(&mut self) {
        if self.current + 1 < self.rows.len() {
            self.current += 1;
        }
    }

    /// Clears every row and rewinds the cursor, ready for a new round.
    pub fn reset(&mut self) {
        self.rows.fill(Row::default());
        self.current = 0;
    }

    /// Returns all rows, oldest first.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// The code-guessing capability: supplies one colour per slot, confirms the
/// assembled guess, and receives the graded hints after each turn.
pub trait Guesser {
    /// Called once per slot per guess attempt. `slot` is 1-indexed.
    fn supply_colour(&mut self, palette: &[Colour], slot: usize) -> Colour;

    /// Called after all four slots are filled; returning `false` discards the
    /// attempt and re-collects all four slots from scratch.
    fn confirm_guess(&mut self) -> bool;

    /// Delivers the (scrambled) hints for the turn just graded. Purely
    /// informational; implementations may ignore it.
    fn receive_hints(&mut self, hints: &Hints);

    /// Called when a new round starts, before any guessing.
    fn begin_round(&mut self) {}
}

/// The code-making capability: supplies the hidden answer for a round.
pub trait Maker {
    fn supply_answer(&mut self, palette: &[Colour]) -> Code;
}

/// Automatic Maker: samples each slot independently and uniformly from the
/// palette, with replacement.
pub struct RandomMaker {
    rng: StdRng,
}

impl RandomMaker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded variant; identical seeds produce identical answers.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Maker for RandomMaker {
    fn supply_answer(&mut self, palette: &[Colour]) -> Code {
        let mut code = [palette[0]; CODE_LENGTH];
        for slot in code.iter_mut() {
            *slot = palette[self.rng.gen_range(0..palette.len())];
        }
        code
    }
}

/// Automatic Guesser implementing the two-phase deduction strategy.
///
/// Discovery: already-confirmed colours stay in the leading slots while every
/// remaining slot is flooded with a single new candidate colour; the hint
/// marker count after such a turn reveals how many copies of the candidate
/// the answer holds. Once four colours are confirmed, the confirmed multiset
/// is shuffled each turn until the hints show a win.
pub struct StrategyGuesser {
    rng: StdRng,
    last_hints: Hints,
    found: Vec<usize>,
    candidate: usize,
    guess_indices: [usize; CODE_LENGTH],
    started: bool,
}

impl StrategyGuesser {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Seeded variant; fixes the permutation phase for reproducible play.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            last_hints: [None; CODE_LENGTH],
            found: Vec::with_capacity(CODE_LENGTH),
            candidate: 0,
            guess_indices: [0; CODE_LENGTH],
            started: false,
        }
    }

    fn prepare(&mut self, palette_len: usize) {
        if !self.started {
            // First turn of the round: flood every slot with colour 0.
            self.started = true;
            self.candidate = 0;
            self.guess_indices = [0; CODE_LENGTH];
            return;
        }

        // Fold the previous turn's result into the confirmed set. The marker
        // count exceeds the confirmed count by exactly the candidate's
        // multiplicity in the answer.
        let markers = self.last_hints.iter().flatten().count();
        let newly_found = markers.saturating_sub(self.found.len());
        for _ in 0..newly_found {
            self.found.push(self.candidate);
        }

        if self.found.len() < CODE_LENGTH {
            self.candidate = (self.candidate + 1).min(palette_len - 1);
            for (slot, index) in self.guess_indices.iter_mut().enumerate() {
                *index = self.found.get(slot).copied().unwrap_or(self.candidate);
            }
        } else {
            self.guess_indices.copy_from_slice(&self.found);
            self.guess_indices.shuffle(&mut self.rng);
        }
    }
}

impl Guesser for StrategyGuesser {
    fn supply_colour(&mut self, palette: &[Colour], slot: usize) -> Colour {
        if slot == 1 {
            self.prepare(palette.len());
        }
        palette[self.guess_indices[slot - 1]]
    }

    fn confirm_guess(&mut self) -> bool {
        true
    }

    fn receive_hints(&mut self, hints: &Hints) {
        self.last_hints = *hints;
    }

    fn begin_round(&mut self) {
        self.last_hints = [None; CODE_LENGTH];
        self.found.clear();
        self.candidate = 0;
        self.guess_indices = [0; CODE_LENGTH];
        self.started = false;
    }
}

/// Consumes board state to produce a human-viewable representation. The game
/// calls this after every placement and every graded turn.
pub trait BoardRenderer {
    fn render(&mut self, board: &Board);
}

/// Renderer that draws nothing. Used for automatic play and tests.
pub struct NullRenderer;

impl BoardRenderer for NullRenderer {
    fn render(&mut self, _board: &Board) {}
}

/// Renderer that prints the classic box board to stdout, newest row first.
pub struct TermRenderer;

impl BoardRenderer for TermRenderer {
    fn render(&mut self, board: &Board) {
        println!("{}", board_string(board));
    }
}

/// Formats the whole board as the classic box template, newest row first.
/// Colour slots are 4-space background blocks, hint slots 2-space blocks
/// (red peg = exact, white peg = present).
pub fn board_string(board: &Board) -> String {
    board
        .rows()
        .iter()
        .rev()
        .map(format_row)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_row(row: &Row) -> String {
    let colours: Vec<String> = row.colours().iter().map(|&slot| colour_cell(slot)).collect();
    let hints: Vec<String> = row.hints().iter().map(|&slot| hint_cell(slot)).collect();
    format!(
        "---------------------------\n\
         |{}|{}|{}|{}||{}|{}\n\
         |{}|{}|{}|{}||-----\n\
         ---------------------|{}|{}",
        colours[0],
        colours[1],
        colours[2],
        colours[3],
        hints[0],
        hints[1],
        colours[0],
        colours[1],
        colours[2],
        colours[3],
        hints[2],
        hints[3],
    )
}

fn colour_cell(slot: Option<Colour>) -> String {
    match slot {
        Some(colour) => format!("{}    \x1b[0m", colour.bg_code()),
        None => String::from("    "),
    }
}

fn hint_cell(slot: Option<Hint>) -> String {
    match slot {
        Some(hint) => format!("{}  \x1b[0m", hint.bg_code()),
        None => String::from("  "),
    }
}

/// Errors that can occur while configuring a session. Both are fatal and
/// raised before any play begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MastermindError {
    OddRoundCount { rounds: u32 },
    UnknownDifficulty { name: String },
}

impl fmt::Display for MastermindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MastermindError::OddRoundCount { rounds } => {
                write!(f, "number of rounds must be even, got {rounds}")
            }
            MastermindError::UnknownDifficulty { name } => {
                write!(f, "unknown difficulty level: {name}")
            }
        }
    }
}

impl std::error::Error for MastermindError {}

/// A full session: one Guesser, one Maker, a renderer, and an even number of
/// rounds played over a shared board. The Maker's accumulated points are the
/// session's result.
pub struct Game {
    guesser: Box<dyn Guesser>,
    maker: Box<dyn Maker>,
    renderer: Box<dyn BoardRenderer>,
    palette: &'static [Colour],
    turns: usize,
    rounds: u32,
    board: Board,
    maker_points: u32,
    rng: StdRng,
}

impl Game {
    /// Creates a session. Fails if `rounds` is odd.
    pub fn new(
        guesser: Box<dyn Guesser>,
        maker: Box<dyn Maker>,
        renderer: Box<dyn BoardRenderer>,
        difficulty: Difficulty,
        turns: usize,
        rounds: u32,
    ) -> Result<Self, MastermindError> {
        Self::from_rng(
            guesser,
            maker,
            renderer,
            difficulty,
            turns,
            rounds,
            StdRng::from_entropy(),
        )
    }

    /// Seeded variant; fixes the hint scrambling for reproducible sessions.
    pub fn with_seed(
        guesser: Box<dyn Guesser>,
        maker: Box<dyn Maker>,
        renderer: Box<dyn BoardRenderer>,
        difficulty: Difficulty,
        turns: usize,
        rounds: u32,
        seed: u64,
    ) -> Result<Self, MastermindError> {
        Self::from_rng(
            guesser,
            maker,
            renderer,
            difficulty,
            turns,
            rounds,
            StdRng::seed_from_u64(seed),
        )
    }

    fn from_rng(
        guesser: Box<dyn Guesser>,
        maker: Box<dyn Maker>,
        renderer: Box<dyn BoardRenderer>,
        difficulty: Difficulty,
        turns: usize,
        rounds: u32,
        rng: StdRng,
    ) -> Result<Self, MastermindError> {
        if rounds % 2 != 0 {
            return Err(MastermindError::OddRoundCount { rounds });
        }

        Ok(Self {
            guesser,
            maker,
            renderer,
            palette: difficulty.palette(),
            turns,
            rounds,
            board: Board::new(turns),
            maker_points: 0,
            rng,
        })
    }

    /// Plays every round and returns the Maker's accumulated points.
    pub fn play(&mut self) -> u32 {
        for _ in 0..self.rounds {
            self.play_round();
        }

        self.maker_points
    }

    fn play_round(&mut self) {
        self.board.reset();
        self.guesser.begin_round();
        let answer = self.maker.supply_answer(self.palette);

        self.renderer.render(&self.board);

        for turn in 1..=self.turns {
            let guess = self.collect_guess();

            let mut hints = grade(&answer, &guess);
            scramble_hints(&mut hints, &mut self.rng);
            self.board.insert_hints(hints);
            self.guesser.receive_hints(&hints);
            self.renderer.render(&self.board);

            if is_winning_grade(&hints) {
                // Fewer turns to win means fewer points for the Maker.
                self.maker_points += turn as u32;
                return;
            }
            if turn == self.turns {
                self.maker_points += EXHAUSTION_BONUS;
                return;
            }

            self.board.advance();
        }
    }

    fn collect_guess(&mut self) -> Code {
        loop {
            let mut guess = [self.palette[0]; CODE_LENGTH];
            for slot in 0..CODE_LENGTH {
                let colour = self.guesser.supply_colour(self.palette, slot + 1);
                guess[slot] = colour;
                self.board.place_colour(colour, slot);
                self.renderer.render(&self.board);
            }

            if self.guesser.confirm_guess() {
                return guess;
            }
        }
    }
}
