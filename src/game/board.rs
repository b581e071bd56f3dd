use rand::Rng;
use rand::seq::SliceRandom;

pub const SYMBOLS: [&str; 32] = [
    // Fruit
    "🍎", "🍌", "🍇", "🍉", "🍓", "🍒", "🍍", "🥝", "🍑", "🍐", "🥥", "🥭", "🍊", "🍋", "🍈", "🍏",
    // Vegetables
    "🥦", "🥕", "🌽", "🥔",
    // Animals
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🦁",
    // Vehicles
    "🚗", "🚀",
];

pub const MIN_SIZE: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub symbol: &'static str,
    pub matched: bool,
    pub position: usize,
}

/// Side length of a square board that can be filled with catalog pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    /// Fewer than two cells per side
    TooSmall(u32),
    /// size² is odd, so the cells cannot be paired
    OddCellCount(u32),
    /// More pairs than the symbol catalog holds
    NotEnoughSymbols { size: u32, pairs: usize },
}

impl std::fmt::Display for SizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeError::TooSmall(size) => {
                write!(f, "grid size {} is below the minimum of {}", size, MIN_SIZE)
            }
            SizeError::OddCellCount(size) => {
                write!(f, "grid size {} gives an odd number of cells", size)
            }
            SizeError::NotEnoughSymbols { size, pairs } => write!(
                f,
                "grid size {} needs {} symbols but only {} are available",
                size,
                pairs,
                SYMBOLS.len()
            ),
        }
    }
}

impl std::error::Error for SizeError {}

impl GridSize {
    pub fn new(size: u32) -> Result<Self, SizeError> {
        if size < MIN_SIZE {
            return Err(SizeError::TooSmall(size));
        }
        let cells = size as usize * size as usize;
        if cells % 2 != 0 {
            return Err(SizeError::OddCellCount(size));
        }
        let pairs = cells / 2;
        if pairs > SYMBOLS.len() {
            return Err(SizeError::NotEnoughSymbols { size, pairs });
        }
        Ok(Self(size))
    }

    /// Largest side length the catalog can fill.
    pub fn max() -> Self {
        let mut size = MIN_SIZE;
        while GridSize::new(size + 2).is_ok() {
            size += 2;
        }
        Self(size)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn cells(self) -> usize {
        self.0 as usize * self.0 as usize
    }

    pub fn pairs(self) -> usize {
        self.cells() / 2
    }
}

pub fn generate_board<R: Rng + ?Sized>(size: GridSize, rng: &mut R) -> Vec<Tile> {
    let selected = &SYMBOLS[..size.pairs()];
    let mut symbols = Vec::with_capacity(size.cells());
    symbols.extend_from_slice(selected);
    symbols.extend_from_slice(selected);
    symbols.shuffle(rng);

    symbols
        .into_iter()
        .enumerate()
        .map(|(position, symbol)| Tile {
            symbol,
            matched: false,
            position,
        })
        .collect()
}

/// Builds a board with a fixed symbol order, for scripted games.
#[cfg(test)]
pub fn board_from_symbols(symbols: &[&'static str]) -> Vec<Tile> {
    symbols
        .iter()
        .enumerate()
        .map(|(position, &symbol)| Tile {
            symbol,
            matched: false,
            position,
        })
        .collect()
}
