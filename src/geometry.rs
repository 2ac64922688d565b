// Grid geometry: bounded neighbor lookups on the board
//
// Each function returns the adjacent cell in one direction, or None when the
// step would leave [0, width) x [0, height).

use crate::types::{Board, Coord, Direction};

pub fn up(cell: Coord, board: &Board) -> Option<Coord> {
    step(Direction::Up, cell, board)
}

pub fn down(cell: Coord, board: &Board) -> Option<Coord> {
    step(Direction::Down, cell, board)
}

pub fn left(cell: Coord, board: &Board) -> Option<Coord> {
    step(Direction::Left, cell, board)
}

pub fn right(cell: Coord, board: &Board) -> Option<Coord> {
    step(Direction::Right, cell, board)
}

/// Moves one cell in `direction`, staying on the board
pub fn step(direction: Direction, cell: Coord, board: &Board) -> Option<Coord> {
    let next = direction.apply(&cell);
    if board.contains(next) {
        Some(next)
    } else {
        None
    }
}

/// All on-board neighbors of `cell`, in `Direction::all()` order
pub fn neighbors(cell: Coord, board: &Board) -> impl Iterator<Item = Coord> + '_ {
    Direction::all()
        .into_iter()
        .filter_map(move |dir| step(dir, cell, board))
}
