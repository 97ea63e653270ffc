use std::cmp::max;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::GridConfig;
use crate::snake::{Direction, Snake};
use crate::{Cell, GridInt};

const INITIAL_TICK_INTERVAL: Duration = Duration::from_millis(100);
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(50);
const TICK_SPEEDUP_STEP: Duration = Duration::from_millis(2);
const FOOD_REWARD: u32 = 10;
const INITIAL_SNAKE_SIZE: usize = 3;
const SPAWN_HEAD: Cell = (5, 5);
const FOOD_SAMPLE_ATTEMPTS: u32 = 64;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    GameOver,
}

/// Outcome of a single tick, consumed by the host loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickResult {
    /// The snake advanced. `reschedule` carries the new tick interval when
    /// eating sped the game up.
    Moved { ate: bool, reschedule: Option<Duration> },
    /// The snake hit a wall or itself; the run is over.
    Crashed,
    /// The snake filled the whole grid; the run is over.
    Won,
}

/// All game state and the per-tick transition. Input only stages a pending
/// direction; `tick` commits it, moves the snake, and resolves collisions
/// and food.
pub struct GameEngine {
    grid_count: GridInt,
    snake: Snake,
    food: Cell,
    direction: Direction,
    pending_direction: Direction,
    score: u32,
    tick_interval: Duration,
    run_state: RunState,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(config: GridConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GridConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GridConfig, rng: StdRng) -> Self {
        let mut engine = GameEngine {
            grid_count: config.grid_count(),
            snake: Snake::spawn(SPAWN_HEAD, INITIAL_SNAKE_SIZE, Direction::Right),
            food: (0, 0),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            score: 0,
            tick_interval: INITIAL_TICK_INTERVAL,
            run_state: RunState::Idle,
            rng,
        };
        engine.place_food();
        engine
    }

    /// Back to a fresh game: 3-cell snake heading right, zero score,
    /// initial speed, new food. Leaves the run state alone.
    pub fn reset(&mut self) {
        self.snake = Snake::spawn(SPAWN_HEAD, INITIAL_SNAKE_SIZE, Direction::Right);
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.score = 0;
        self.tick_interval = INITIAL_TICK_INTERVAL;
        self.place_food();
    }

    /// Enter Running through a fresh game, from Idle or GameOver alike.
    pub fn start(&mut self) {
        self.reset();
        self.run_state = RunState::Running;
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Idle;
        }
    }

    /// Stage a direction change for the next tick. Ignored unless Running,
    /// and ignored when `dir` reverses the committed direction; between two
    /// ticks the last accepted request wins.
    pub fn set_pending_direction(&mut self, dir: Direction) {
        if self.run_state != RunState::Running {
            return;
        }
        if dir == self.direction.opposite() {
            return;
        }
        self.pending_direction = dir;
    }

    /// True iff `cell` lies outside the grid or on the snake. The body is
    /// the pre-move one, tail included: the cell being vacated this tick
    /// still blocks.
    pub fn check_collision(&self, cell: Cell) -> bool {
        let (x, y) = cell;
        if x < 0 || y < 0 || x >= self.grid_count || y >= self.grid_count {
            return true;
        }
        self.snake.contains(cell)
    }

    pub fn tick(&mut self) -> TickResult {
        if self.run_state != RunState::Running {
            return TickResult::Moved { ate: false, reschedule: None };
        }

        self.direction = self.pending_direction;
        let (dx, dy) = self.direction.delta();
        let (hx, hy) = self.snake.head();
        let new_head = (hx + dx, hy + dy);

        if self.check_collision(new_head) {
            self.run_state = RunState::GameOver;
            return TickResult::Crashed;
        }

        self.snake.push_head(new_head);

        if new_head == self.food {
            self.score += FOOD_REWARD;
            if !self.place_food() {
                self.run_state = RunState::GameOver;
                return TickResult::Won;
            }
            let reschedule = if self.tick_interval > MIN_TICK_INTERVAL {
                self.tick_interval = max(self.tick_interval - TICK_SPEEDUP_STEP, MIN_TICK_INTERVAL);
                Some(self.tick_interval)
            } else {
                None
            };
            TickResult::Moved { ate: true, reschedule }
        } else {
            self.snake.pop_tail();
            TickResult::Moved { ate: false, reschedule: None }
        }
    }

    // Uniform rejection sampling with a capped attempt count; once the board
    // is crowded enough that sampling keeps hitting the snake, fall back to
    // drawing from the free cells directly. Returns false only when the
    // snake covers the whole grid.
    fn place_food(&mut self) -> bool {
        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let cell = (
                self.rng.gen_range(0..self.grid_count),
                self.rng.gen_range(0..self.grid_count),
            );
            if !self.snake.contains(cell) {
                self.food = cell;
                return true;
            }
        }

        let mut free: Vec<Cell> = Vec::new();
        for y in 0..self.grid_count {
            for x in 0..self.grid_count {
                if !self.snake.contains((x, y)) {
                    free.push((x, y));
                }
            }
        }

        match free.choose(&mut self.rng) {
            Some(&cell) => {
                self.food = cell;
                true
            }
            None => false,
        }
    }

    pub fn grid_count(&self) -> GridInt {
        self.grid_count
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;

    fn running_engine() -> GameEngine {
        let mut engine = GameEngine::with_seed(GridConfig::default(), 7);
        engine.start();
        engine
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let mut engine = running_engine();
        engine.food = (6, 5);

        let result = engine.tick();
        assert_eq!(
            result,
            TickResult::Moved { ate: true, reschedule: Some(Duration::from_millis(98)) }
        );

        let body: Vec<_> = engine.snake().segments().collect();
        assert_eq!(body, vec![(6, 5), (5, 5), (4, 5), (3, 5)]);
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.tick_interval(), Duration::from_millis(98));
        assert_ne!(engine.food(), (6, 5));
        assert!(!engine.snake().contains(engine.food()));
    }

    #[test]
    fn plain_move_keeps_length_and_score() {
        let mut engine = running_engine();
        engine.food = (0, 0);

        let result = engine.tick();
        assert_eq!(result, TickResult::Moved { ate: false, reschedule: None });

        let body: Vec<_> = engine.snake().segments().collect();
        assert_eq!(body, vec![(6, 5), (5, 5), (4, 5)]);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn wall_hit_ends_the_run() {
        let mut engine = running_engine();
        engine.snake = Snake::spawn((0, 5), 2, Left);
        engine.direction = Left;
        engine.pending_direction = Left;

        assert_eq!(engine.tick(), TickResult::Crashed);
        assert_eq!(engine.run_state(), RunState::GameOver);
        assert_eq!(engine.score(), 0);
        // The body is untouched by a crashing tick.
        assert_eq!(engine.snake().len(), 2);
    }

    #[test]
    fn moving_into_the_vacating_tail_cell_still_crashes() {
        let mut engine = running_engine();
        engine.food = (6, 5);
        assert_eq!(engine.tick(), TickResult::Moved { ate: true, reschedule: Some(Duration::from_millis(98)) });
        engine.food = (0, 0);

        // Walk a tight square; the fourth turn aims at the tail cell that
        // would be vacated this same tick.
        engine.set_pending_direction(Up);
        engine.tick();
        engine.set_pending_direction(Left);
        engine.tick();
        engine.set_pending_direction(Down);
        let body: Vec<_> = engine.snake().segments().collect();
        assert_eq!(body, vec![(5, 4), (6, 4), (6, 5), (5, 5)]);

        assert_eq!(engine.tick(), TickResult::Crashed);
        assert_eq!(engine.run_state(), RunState::GameOver);
        assert_eq!(engine.score(), 10);
    }

    #[test]
    fn food_lands_on_the_single_free_cell() {
        let mut engine = GameEngine::with_seed(GridConfig::new(40, 20), 3);
        let mut snake = Snake::spawn((0, 0), 1, Right);
        snake.push_head((1, 0));
        snake.push_head((1, 1));
        engine.snake = snake;

        assert!(engine.place_food());
        assert_eq!(engine.food(), (0, 1));
    }

    #[test]
    fn filling_the_grid_wins() {
        let mut engine = GameEngine::with_seed(GridConfig::new(40, 20), 3);
        let mut snake = Snake::spawn((0, 0), 1, Right);
        snake.push_head((1, 0));
        snake.push_head((1, 1));
        engine.snake = snake;
        engine.food = (0, 1);
        engine.direction = Left;
        engine.pending_direction = Left;
        engine.run_state = RunState::Running;

        assert_eq!(engine.tick(), TickResult::Won);
        assert_eq!(engine.run_state(), RunState::GameOver);
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.snake().len(), 4);
    }

    #[test]
    fn interval_bottoms_out_at_the_floor() {
        let mut engine = running_engine();
        engine.tick_interval = Duration::from_millis(51);
        engine.food = (6, 5);
        let result = engine.tick();
        assert_eq!(
            result,
            TickResult::Moved { ate: true, reschedule: Some(Duration::from_millis(50)) }
        );

        engine.food = (7, 5);
        let result = engine.tick();
        assert_eq!(result, TickResult::Moved { ate: true, reschedule: None });
        assert_eq!(engine.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn tick_outside_running_is_a_no_op() {
        let mut engine = GameEngine::with_seed(GridConfig::default(), 7);
        let before: Vec<_> = engine.snake().segments().collect();

        assert_eq!(engine.tick(), TickResult::Moved { ate: false, reschedule: None });
        let after: Vec<_> = engine.snake().segments().collect();
        assert_eq!(before, after);
        assert_eq!(engine.run_state(), RunState::Idle);
    }
}
