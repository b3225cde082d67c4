//! Downstream path walking
//!
//! Every downstream traversal in the engine goes through [`PathWalker`]:
//! distance to the network, segment decomposition, channel routing and
//! the convergence check.

use std::collections::HashSet;
use std::ops::ControlFlow;

use pixeltc_core::{Cell, Direction};

use super::basin::Basin;
use super::geodesic::StepMetric;

/// Where a walk stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAt {
    /// Stop on the first drainage-network cell entered
    Network,
    /// Cross the network and stop only when leaving the basin
    BasinExit,
}

/// Why a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// The next cell is off the grid or outside the basin
    OutOfBasin,
    /// Entered a network cell (only with [`StopAt::Network`])
    ReachedNetwork,
    /// The next cell was already visited by this walk
    Cycle,
    /// Took as many steps as the grid has cells
    StepLimitExceeded,
    /// The current cell has no flow direction
    Sink,
    /// The visitor asked to stop
    Halted,
}

/// One step of a walk, handed to the visitor.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub from: Cell,
    pub to: Cell,
    pub direction: Direction,
    /// Length of this step (m)
    pub length: f64,
    /// Distance walked from the start, this step included (m)
    pub distance: f64,
    /// `to` is a network cell
    pub to_network: bool,
}

/// Result of a walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkOutcome {
    pub end: WalkEnd,
    /// Last cell reached inside the basin
    pub last: Cell,
    /// Steps taken
    pub steps: usize,
    /// Distance from the start to `last` (m)
    pub distance: f64,
}

/// Follows flow directions downstream from a start cell.
#[derive(Debug, Clone, Copy)]
pub struct PathWalker<'a> {
    basin: &'a Basin,
    metric: &'a StepMetric,
    stop: StopAt,
    step_limit: usize,
}

impl<'a> PathWalker<'a> {
    pub fn new(basin: &'a Basin, metric: &'a StepMetric, stop: StopAt) -> Self {
        Self {
            basin,
            metric,
            stop,
            step_limit: basin.rows() * basin.cols(),
        }
    }

    /// Walk without observing the steps
    pub fn run(&self, start: Cell) -> WalkOutcome {
        self.walk(start, |_| ControlFlow::Continue(()))
    }

    /// Walk from `start`, calling `visit` for every step that enters a basin cell.
    ///
    /// Steps that would leave the basin or revisit a cell end the walk
    /// without being visited. Breaking from `visit` ends the walk on the
    /// step's target with [`WalkEnd::Halted`].
    pub fn walk<F>(&self, start: Cell, mut visit: F) -> WalkOutcome
    where
        F: FnMut(&Step) -> ControlFlow<()>,
    {
        let flow = self.basin.flow();
        let (rows, cols) = flow.shape();
        let mut visited = HashSet::new();
        visited.insert(start);

        let mut current = start;
        let mut steps = 0;
        let mut distance = 0.0;
        let outcome = |end, last, steps, distance| WalkOutcome {
            end,
            last,
            steps,
            distance,
        };

        loop {
            if steps >= self.step_limit {
                return outcome(WalkEnd::StepLimitExceeded, current, steps, distance);
            }
            let Some(direction) = flow.direction(current.0, current.1) else {
                return outcome(WalkEnd::Sink, current, steps, distance);
            };
            let next = match direction.step(current.0, current.1, rows, cols) {
                Some(next) if self.basin.in_basin(next) => next,
                _ => return outcome(WalkEnd::OutOfBasin, current, steps, distance),
            };
            if !visited.insert(next) {
                return outcome(WalkEnd::Cycle, current, steps, distance);
            }

            let length = self.metric.length(current, direction);
            distance += length;
            steps += 1;
            let step = Step {
                from: current,
                to: next,
                direction,
                length,
                distance,
                to_network: self.basin.on_network(next),
            };
            current = next;

            if visit(&step).is_break() {
                return outcome(WalkEnd::Halted, current, steps, distance);
            }
            if self.stop == StopAt::Network && step.to_network {
                return outcome(WalkEnd::ReachedNetwork, current, steps, distance);
            }
        }
    }
}
