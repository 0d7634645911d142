//! Randomized depth-first-search maze (recursive backtracking, iteratively)
//!
//! Keeps an explicit visitation stack instead of recursing: each step marks
//! the current cell visited, moves to a random unvisited neighbour after
//! knocking down the shared wall, or backtracks by popping the stack. When
//! the stack drains the grid is a spanning tree - exactly one path between
//! any two cells.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::MazeGenerator;
use crate::error::RaceError;

/// One grid cell with four independent wall flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
    pub visited: bool,
}

impl GridCell {
    fn sealed(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            top: true,
            right: true,
            bottom: true,
            left: true,
            visited: false,
        }
    }
}

pub struct BacktrackerMaze {
    cols: usize,
    rows: usize,
    cells: Vec<GridCell>,
    stack: Vec<usize>,
    current: Option<usize>,
    complete: bool,
    rng: Pcg32,
}

impl BacktrackerMaze {
    pub fn new(cols: usize, rows: usize, seed: u64) -> Result<Self, RaceError> {
        if cols == 0 || rows == 0 {
            return Err(RaceError::GridSize(cols, rows));
        }
        Ok(Self {
            cols,
            rows,
            cells: Vec::new(),
            stack: Vec::new(),
            current: None,
            complete: false,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid coordinates of the search cursor, while generation is running
    pub fn current_cell(&self) -> Option<(usize, usize)> {
        self.current.map(|i| (self.cells[i].col, self.cells[i].row))
    }

    fn index(&self, col: usize, row: usize) -> usize {
        col * self.rows + row
    }

    /// Unvisited grid-adjacent neighbours of a cell, in up/right/down/left
    /// order before the random pick.
    fn unvisited_neighbours(&self, idx: usize) -> Vec<usize> {
        let (col, row) = (self.cells[idx].col, self.cells[idx].row);
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(self.index(col, row - 1));
        }
        if col + 1 < self.cols {
            out.push(self.index(col + 1, row));
        }
        if row + 1 < self.rows {
            out.push(self.index(col, row + 1));
        }
        if col > 0 {
            out.push(self.index(col - 1, row));
        }
        out.retain(|&i| !self.cells[i].visited);
        out
    }

    fn open_shared_wall(&mut self, a: usize, b: usize) {
        let (ac, ar) = (self.cells[a].col as isize, self.cells[a].row as isize);
        let (bc, br) = (self.cells[b].col as isize, self.cells[b].row as isize);
        match (ac - bc, ar - br) {
            (0, 1) => {
                self.cells[a].top = false;
                self.cells[b].bottom = false;
            }
            (-1, 0) => {
                self.cells[a].right = false;
                self.cells[b].left = false;
            }
            (0, -1) => {
                self.cells[a].bottom = false;
                self.cells[b].top = false;
            }
            (1, 0) => {
                self.cells[a].left = false;
                self.cells[b].right = false;
            }
            _ => {}
        }
    }
}

impl MazeGenerator for BacktrackerMaze {
    type Cell = GridCell;

    fn start(&mut self) {
        self.cells = (0..self.cols)
            .flat_map(|col| (0..self.rows).map(move |row| GridCell::sealed(col, row)))
            .collect();
        self.stack.clear();
        self.complete = false;
        self.current = Some(0);
    }

    fn stop(&mut self) {
        self.current = None;
        self.stack.clear();
    }

    /// One graph-search step: advance, carve, or backtrack
    fn step(&mut self) -> bool {
        let Some(cur) = self.current else {
            return false;
        };
        self.cells[cur].visited = true;

        let neighbours = self.unvisited_neighbours(cur);
        if !neighbours.is_empty() {
            let next = neighbours[self.rng.random_range(0..neighbours.len())];
            self.stack.push(cur);
            self.open_shared_wall(cur, next);
            self.current = Some(next);
            true
        } else if let Some(prev) = self.stack.pop() {
            self.current = Some(prev);
            true
        } else {
            self.current = None;
            self.complete = true;
            log::info!("maze complete: {}x{} cells", self.cols, self.rows);
            false
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn cells(&self) -> &[GridCell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn run_to_completion(maze: &mut BacktrackerMaze) {
        maze.start();
        for _ in 0..100_000 {
            if !maze.step() {
                return;
            }
        }
        panic!("maze generation did not terminate");
    }

    /// Open-wall adjacency of a completed maze
    fn open_edges(maze: &BacktrackerMaze) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for cell in maze.cells() {
            let idx = maze.index(cell.col, cell.row);
            if !cell.right && cell.col + 1 < maze.cols() {
                edges.push((idx, maze.index(cell.col + 1, cell.row)));
            }
            if !cell.bottom && cell.row + 1 < maze.rows() {
                edges.push((idx, maze.index(cell.col, cell.row + 1)));
            }
        }
        edges
    }

    #[test]
    fn test_completed_maze_is_a_spanning_tree() {
        let mut maze = BacktrackerMaze::new(8, 6, 1234).unwrap();
        run_to_completion(&mut maze);
        assert!(maze.is_complete());
        assert!(maze.cells().iter().all(|c| c.visited));

        let edges = open_edges(&maze);
        // Spanning tree: exactly cells-1 edges and fully connected
        assert_eq!(edges.len(), 8 * 6 - 1);

        let mut adjacency = vec![Vec::new(); 8 * 6];
        for &(a, b) in &edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        let mut seen = vec![false; 8 * 6];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node] {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        assert!(seen.iter().all(|&v| v));
    }

    #[test]
    fn test_outer_walls_survive() {
        let mut maze = BacktrackerMaze::new(5, 5, 7).unwrap();
        run_to_completion(&mut maze);
        for cell in maze.cells() {
            if cell.row == 0 {
                assert!(cell.top);
            }
            if cell.row == 4 {
                assert!(cell.bottom);
            }
            if cell.col == 0 {
                assert!(cell.left);
            }
            if cell.col == 4 {
                assert!(cell.right);
            }
        }
    }

    #[test]
    fn test_stop_cancels_without_completing() {
        let mut maze = BacktrackerMaze::new(6, 6, 3).unwrap();
        maze.start();
        for _ in 0..5 {
            maze.step();
        }
        maze.stop();
        assert!(!maze.is_complete());
        assert!(!maze.step());
    }

    #[test]
    fn test_single_cell_grid_completes_immediately() {
        let mut maze = BacktrackerMaze::new(1, 1, 0).unwrap();
        maze.start();
        assert!(!maze.step());
        assert!(maze.is_complete());
        assert!(maze.cells()[0].visited);
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(BacktrackerMaze::new(0, 5, 0).is_err());
        assert!(BacktrackerMaze::new(5, 0, 0).is_err());
    }

    #[test]
    fn test_same_seed_same_maze() {
        let mut a = BacktrackerMaze::new(7, 7, 42).unwrap();
        let mut b = BacktrackerMaze::new(7, 7, 42).unwrap();
        run_to_completion(&mut a);
        run_to_completion(&mut b);
        for (ca, cb) in a.cells().iter().zip(b.cells()) {
            assert_eq!(ca.top, cb.top);
            assert_eq!(ca.right, cb.right);
            assert_eq!(ca.bottom, cb.bottom);
            assert_eq!(ca.left, cb.left);
        }
    }
}
