//! The board.

use crate::{
    cells::{Coord, State, ALIVE, DEAD},
    error::Error,
};
use rand::Rng;
use std::{
    fmt::{self, Display, Formatter, Write},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A square board of cells.
///
/// The cells are stored row by row and indexed by `(row, column)`.
/// The size of a board never changes; every generation of a run produces
/// a new board of the same size.
///
/// With the `serde` feature, a board is (de)serialized as rows of `0` and
/// `1`, and deserialization checks it the same way [`Board::from_rows`] does.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")
)]
pub struct Board {
    size: usize,
    cells: Vec<State>,
}

impl Board {
    /// Creates an empty board with the given side length.
    pub fn new(size: usize) -> Result<Self, Error> {
        let len = Self::cell_count(size)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| Error::BoardTooLarge(size))?;
        cells.resize(len, DEAD);
        Ok(Board { size, cells })
    }

    /// Number of cells of a board with the given side length.
    pub(crate) fn cell_count(size: usize) -> Result<usize, Error> {
        if size == 0 {
            return Err(Error::NonPositiveError);
        }
        size.checked_mul(size)
            .filter(|&len| len <= isize::MAX as usize)
            .ok_or(Error::BoardTooLarge(size))
    }

    /// Wraps cells that are already laid out row by row.
    pub(crate) fn from_cells(size: usize, cells: Vec<State>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Board { size, cells }
    }

    /// Creates a board from rows of `0` and `1`.
    ///
    /// Every row must have as many cells as there are rows.
    pub fn from_rows<R, C>(rows: R) -> Result<Self, Error>
    where
        R: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let rows = rows.into_iter().collect::<Vec<_>>();
        let size = rows.len();
        let mut board = Board::new(size)?;
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return Err(Error::NonSquareError(size));
            }
            for (j, &value) in row.iter().enumerate() {
                board.cells[i * size + j] = match value {
                    0 => DEAD,
                    1 => ALIVE,
                    v => {
                        return Err(Error::ParseBoardError(format!(
                            "cell ({}, {}) has value {}",
                            i, j, v
                        )))
                    }
                };
            }
        }
        Ok(board)
    }

    /// Parses a [Plaintext](https://conwaylife.com/wiki/Plaintext) picture.
    ///
    /// `.` is a dead cell and `o` (or `O`, `*`) a living one.
    /// Blank lines and lines starting with `!` are ignored.
    pub fn from_plaintext(input: &str) -> Result<Self, Error> {
        let rows = input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('!'))
            .map(|line| {
                line.chars()
                    .map(|c| match c {
                        '.' => Ok(0),
                        'o' | 'O' | '*' => Ok(1),
                        c => Err(Error::ParseBoardError(format!("unexpected {:?}", c))),
                    })
                    .collect::<Result<Vec<u8>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Board::from_rows(rows)
    }

    /// Fills a new board at random, each cell independently alive
    /// with probability `density`.
    pub fn random<R: Rng + ?Sized>(size: usize, density: f64, rng: &mut R) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::DensityError(density));
        }
        let mut board = Board::new(size)?;
        for cell in board.cells.iter_mut() {
            *cell = State::from(rng.gen_bool(density));
        }
        Ok(board)
    }

    /// Side length of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the state of a cell. Returns `None` if there is no such cell.
    #[inline]
    pub fn get(&self, (row, col): Coord) -> Option<State> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// Sets the state of a cell.
    pub fn set(&mut self, (row, col): Coord, state: State) -> Result<(), Error> {
        if row < self.size && col < self.size {
            self.cells[row * self.size + col] = state;
            Ok(())
        } else {
            Err(Error::SetCellError((row, col)))
        }
    }

    /// Number of living cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Iterates over the rows of the board.
    pub fn rows(&self) -> impl Iterator<Item = &[State]> {
        self.cells.chunks(self.size)
    }

    /// The board as a list of lists, e.g. `[[0, 1], [1, 0]]`.
    ///
    /// This is the form stored in generation records.
    /// [`FromStr`] parses it back.
    pub fn to_list_string(&self) -> String {
        let mut str = String::with_capacity(self.cells.len() * 3 + 2);
        str.push('[');
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                str.push_str(", ");
            }
            str.push('[');
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    str.push_str(", ");
                }
                str.push(if cell.is_alive() { '1' } else { '0' });
            }
            str.push(']');
        }
        str.push(']');
        str
    }
}

/// Parses the list-of-lists form produced by [`Board::to_list_string`].
impl FromStr for Board {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let inner = compact
            .strip_prefix("[[")
            .and_then(|s| s.strip_suffix("]]"))
            .ok_or_else(|| Error::ParseBoardError(String::from("expected a list of lists")))?;
        let rows = inner
            .split("],[")
            .map(|row| {
                row.split(',')
                    .map(|value| {
                        value
                            .parse::<u8>()
                            .map_err(|_| Error::ParseBoardError(format!("bad cell {:?}", value)))
                    })
                    .collect::<Result<Vec<u8>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Board::from_rows(rows)
    }
}

impl TryFrom<Vec<Vec<u8>>> for Board {
    type Error = Error;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Board::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board
            .rows()
            .map(|row| row.iter().map(|cell| cell.value()).collect())
            .collect()
    }
}

/// Displays the board in [Plaintext](https://conwaylife.com/wiki/Plaintext)
/// format: `.` for dead cells, `o` for living cells, one line per row.
impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                f.write_char(if cell.is_alive() { 'o' } else { '.' })?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn empty_board() -> Result<(), Error> {
        let board = Board::new(4)?;
        assert_eq!(board.size(), 4);
        assert_eq!(board.population(), 0);
        assert_eq!(board.rows().count(), 4);
        Ok(())
    }

    #[test]
    fn too_large() {
        let huge = 1usize << (usize::BITS / 2);
        assert!(matches!(Board::new(huge), Err(Error::BoardTooLarge(_))));
        assert!(matches!(
            Board::random(huge, 0.5, &mut StdRng::seed_from_u64(0)),
            Err(Error::BoardTooLarge(_))
        ));
        assert!(matches!(
            Board::new(usize::MAX),
            Err(Error::BoardTooLarge(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_checks_cells() -> Result<(), Error> {
        let board = Board::from_rows(vec![[0u8, 1], [1, 1]])?;
        let json = serde_json::to_string(&board)?;
        assert_eq!(json, "[[0,1],[1,1]]");
        assert_eq!(serde_json::from_str::<Board>(&json)?, board);

        for malformed in [
            r#"{"size":2,"cells":[2,7,1]}"#,
            "[[0,1],[1]]",
            "[[0,2],[1,0]]",
            "[]",
        ] {
            assert!(serde_json::from_str::<Board>(malformed).is_err(), "{}", malformed);
        }
        Ok(())
    }

    #[test]
    fn zero_size() {
        assert!(matches!(Board::new(0), Err(Error::NonPositiveError)));
        assert!(matches!(
            Board::from_rows(Vec::<Vec<u8>>::new()),
            Err(Error::NonPositiveError)
        ));
    }

    #[test]
    fn set_get() -> Result<(), Error> {
        let mut board = Board::new(3)?;
        board.set((1, 2), ALIVE)?;
        assert_eq!(board.get((1, 2)), Some(ALIVE));
        assert_eq!(board.get((2, 1)), Some(DEAD));
        assert_eq!(board.get((3, 0)), None);
        assert!(matches!(
            board.set((0, 3), ALIVE),
            Err(Error::SetCellError((0, 3)))
        ));
        Ok(())
    }

    #[test]
    fn non_square_rows() {
        assert!(matches!(
            Board::from_rows(vec![vec![0u8, 1], vec![1]]),
            Err(Error::NonSquareError(2))
        ));
        assert!(matches!(
            Board::from_rows(vec![vec![0u8, 2], vec![1, 0]]),
            Err(Error::ParseBoardError(_))
        ));
    }

    #[test]
    fn list_string() -> Result<(), Error> {
        let board = Board::from_rows(vec![[0u8, 1], [1, 1]])?;
        let text = board.to_list_string();
        assert_eq!(text, "[[0, 1], [1, 1]]");
        assert_eq!(text.parse::<Board>()?, board);
        assert_eq!("[[1]]".parse::<Board>()?.population(), 1);
        assert!("[0, 1]".parse::<Board>().is_err());
        assert!("[[0, x], [1, 0]]".parse::<Board>().is_err());
        Ok(())
    }

    #[test]
    fn plaintext() -> Result<(), Error> {
        let board = Board::from_plaintext(
            "!Name: blinker\n\
             ...\n\
             ooo\n\
             ...\n",
        )?;
        assert_eq!(board.population(), 3);
        assert_eq!(board.to_string(), "...\nooo\n...\n");
        Ok(())
    }

    #[test]
    fn random_density() -> Result<(), Error> {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(Board::random(10, 0.0, &mut rng)?.population(), 0);
        assert_eq!(Board::random(10, 1.0, &mut rng)?.population(), 100);
        let pop = Board::random(100, 0.5, &mut rng)?.population();
        assert!(pop > 1000 && pop < 9000);
        Ok(())
    }

    #[test]
    fn random_is_seeded() -> Result<(), Error> {
        let a = Board::random(16, 0.4, &mut StdRng::seed_from_u64(42))?;
        let b = Board::random(16, 0.4, &mut StdRng::seed_from_u64(42))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn invalid_density() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Board::random(4, 1.5, &mut rng),
            Err(Error::DensityError(_))
        ));
        assert!(Board::random(4, f64::NAN, &mut rng).is_err());
    }
}
