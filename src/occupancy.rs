// Occupancy model for a single decision
//
// Built fresh from every board snapshot and never mutated afterwards:
// - hazard cells (every body cell, plus strike cells around equal-or-longer opponents' heads)
// - food cells
// - vacancy records for every occupied cell

use std::collections::{HashMap, HashSet};

use crate::geometry;
use crate::types::{Board, Coord};

/// When an occupied cell frees up, and who occupies it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyRecord {
    pub snake_id: String,
    /// Turns until this segment leaves the cell; the tail is always 1
    pub turns_until_vacant: usize,
    pub cell: Coord,
}

#[derive(Debug, Clone)]
pub struct Occupancy {
    pub my_length: usize,
    pub hazards: HashSet<Coord>,
    pub food: HashSet<Coord>,
    pub vacancy: HashMap<Coord, VacancyRecord>,
}

impl Occupancy {
    /// Builds the occupancy model from the controlled snake's point of view
    pub fn build(board: &Board, you_id: &str, my_length: usize) -> Self {
        Occupancy {
            my_length,
            hazards: build_hazard_set(board, you_id, my_length),
            food: build_food_set(board),
            vacancy: build_vacancy_map(board),
        }
    }

    pub fn is_hazard(&self, cell: Coord) -> bool {
        self.hazards.contains(&cell)
    }

    pub fn is_food(&self, cell: Coord) -> bool {
        self.food.contains(&cell)
    }

    pub fn vacancy_at(&self, cell: Coord) -> Option<&VacancyRecord> {
        self.vacancy.get(&cell)
    }
}

/// Every body cell on the board, plus the head neighbors of each opponent
/// at least as long as the controlled snake
pub fn build_hazard_set(board: &Board, you_id: &str, my_length: usize) -> HashSet<Coord> {
    let mut hazards = HashSet::new();

    for snake in &board.snakes {
        if snake.id != you_id && snake.body.len() >= my_length {
            if let Some(head) = snake.head() {
                hazards.extend(geometry::neighbors(head, board));
            }
        }
        hazards.extend(snake.body.iter().copied());
    }

    hazards
}

pub fn build_food_set(board: &Board) -> HashSet<Coord> {
    board.food.iter().copied().collect()
}

/// Maps each occupied cell to the turn it frees up
///
/// When segments overlap (e.g. a stacked tail right after eating) the
/// later-vacating segment wins, since the cell stays blocked until it leaves.
pub fn build_vacancy_map(board: &Board) -> HashMap<Coord, VacancyRecord> {
    let mut vacancy: HashMap<Coord, VacancyRecord> = HashMap::new();

    for snake in &board.snakes {
        let length = snake.body.len();
        for (index, &cell) in snake.body.iter().enumerate() {
            let record = VacancyRecord {
                snake_id: snake.id.clone(),
                turns_until_vacant: length - index,
                cell,
            };
            match vacancy.get(&cell) {
                Some(existing) if existing.turns_until_vacant >= record.turns_until_vacant => {}
                _ => {
                    vacancy.insert(cell, record);
                }
            }
        }
    }

    vacancy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Battlesnake;

    fn board_with(snakes: Vec<Battlesnake>, food: Vec<Coord>) -> Board {
        Board {
            width: 11,
            height: 11,
            food,
            snakes,
            hazards: vec![],
        }
    }

    fn snake(id: &str, cells: &[(i32, i32)]) -> Battlesnake {
        Battlesnake::from_body(id, 100, cells.iter().map(|&(x, y)| Coord::new(x, y)).collect())
    }

    #[test]
    fn test_hazards_include_every_body_cell() {
        let me = snake("me", &[(1, 1), (1, 2), (1, 3)]);
        let short = snake("short", &[(8, 8), (8, 9)]);
        let board = board_with(vec![me.clone(), short.clone()], vec![]);

        let hazards = build_hazard_set(&board, "me", 3);
        for cell in me.body.iter().chain(short.body.iter()) {
            assert!(hazards.contains(cell), "{:?} should be a hazard", cell);
        }
    }

    #[test]
    fn test_longer_opponent_head_neighbors_are_hazards() {
        let me = snake("me", &[(1, 1), (1, 2), (1, 3)]);
        let big = snake("big", &[(5, 5), (5, 6), (5, 7), (5, 8)]);
        let board = board_with(vec![me, big], vec![]);

        let hazards = build_hazard_set(&board, "me", 3);
        for cell in &[Coord::new(5, 4), Coord::new(4, 5), Coord::new(6, 5)] {
            assert!(hazards.contains(cell), "{:?} should be predicted", cell);
        }
    }

    #[test]
    fn test_equal_length_opponent_is_predicted() {
        let me = snake("me", &[(1, 1), (1, 2), (1, 3)]);
        let twin = snake("twin", &[(5, 5), (5, 6), (5, 7)]);
        let board = board_with(vec![me, twin], vec![]);

        let hazards = build_hazard_set(&board, "me", 3);
        assert!(hazards.contains(&Coord::new(5, 4)));
        assert!(hazards.contains(&Coord::new(4, 5)));
        assert!(hazards.contains(&Coord::new(6, 5)));
    }

    #[test]
    fn test_shorter_opponent_head_neighbors_are_not_predicted() {
        let me = snake("me", &[(1, 1), (1, 2), (1, 3)]);
        let short = snake("short", &[(5, 5), (5, 6)]);
        let board = board_with(vec![me, short], vec![]);

        let hazards = build_hazard_set(&board, "me", 3);
        assert!(!hazards.contains(&Coord::new(5, 4)));
        assert!(!hazards.contains(&Coord::new(4, 5)));
        assert!(!hazards.contains(&Coord::new(6, 5)));
        assert_eq!(hazards.len(), 5);
    }

    #[test]
    fn test_own_head_is_not_predicted() {
        let me = snake("me", &[(5, 5), (5, 6), (5, 7)]);
        let board = board_with(vec![me], vec![]);

        let hazards = build_hazard_set(&board, "me", 3);
        assert_eq!(hazards.len(), 3);
    }

    #[test]
    fn test_prediction_stays_on_board() {
        let me = snake("me", &[(5, 5), (5, 6)]);
        let cornered = snake("cornered", &[(0, 0), (0, 1), (0, 2)]);
        let board = board_with(vec![me, cornered], vec![]);

        let hazards = build_hazard_set(&board, "me", 2);
        assert!(hazards.iter().all(|&c| board.contains(c)));
        assert!(hazards.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn test_food_set_is_verbatim() {
        let food = vec![Coord::new(2, 2), Coord::new(9, 0)];
        let board = board_with(vec![snake("me", &[(5, 5)])], food.clone());

        let set = build_food_set(&board);
        assert_eq!(set.len(), 2);
        assert!(food.iter().all(|f| set.contains(f)));
    }

    #[test]
    fn test_vacancy_tail_is_one_and_grows_towards_head() {
        let me = snake("me", &[(3, 3), (3, 4), (3, 5), (4, 5), (5, 5)]);
        let board = board_with(vec![me.clone()], vec![]);

        let vacancy = build_vacancy_map(&board);
        let turns: Vec<usize> = me
            .body
            .iter()
            .map(|c| vacancy[c].turns_until_vacant)
            .collect();

        assert_eq!(turns, vec![5, 4, 3, 2, 1]);
        assert!(turns.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(vacancy[&Coord::new(5, 5)].snake_id, "me");
        assert_eq!(vacancy[&Coord::new(5, 5)].cell, Coord::new(5, 5));
    }

    #[test]
    fn test_vacancy_stacked_segments_keep_the_later_turn() {
        // Just ate: tail is doubled
        let me = snake("me", &[(3, 3), (3, 4), (3, 4)]);
        let board = board_with(vec![me], vec![]);

        let vacancy = build_vacancy_map(&board);
        assert_eq!(vacancy.len(), 2);
        assert_eq!(vacancy[&Coord::new(3, 4)].turns_until_vacant, 2);
    }

    #[test]
    fn test_occupancy_build_wires_all_sets() {
        let me = snake("me", &[(1, 1), (1, 2)]);
        let board = board_with(vec![me], vec![Coord::new(7, 7)]);

        let occupancy = Occupancy::build(&board, "me", 2);
        assert_eq!(occupancy.my_length, 2);
        assert!(occupancy.is_hazard(Coord::new(1, 2)));
        assert!(occupancy.is_food(Coord::new(7, 7)));
        assert_eq!(
            occupancy.vacancy_at(Coord::new(1, 2)).map(|r| r.turns_until_vacant),
            Some(1)
        );
        assert!(occupancy.vacancy_at(Coord::new(7, 7)).is_none());
    }
}
