//! Connectivity checks on the flow-direction graph
//!
//! A basin is accepted when:
//! - an outlet exists (largest flow accumulation inside the basin),
//! - every basin cell drains to the outlet without cycles,
//! - the drainage network is 8-connected to the outlet,
//! - accumulation strictly decreases moving upstream along the network.
//!
//! These checks gate every travel-time computation.

use std::collections::VecDeque;
use std::ops::ControlFlow;

use ndarray::Array2;
use pixeltc_core::raster::D8Neighbors;
use pixeltc_core::{Cell, DivergenceCause, Error, Raster, Result};
use tracing::debug;

use super::basin::Basin;
use super::geodesic::StepMetric;
use super::walker::{PathWalker, StopAt, WalkEnd};

/// Convergence state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Unvisited,
    /// On the path currently being walked
    Visiting,
    Converged,
    Diverged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityReport {
    pub outlet: Cell,
    /// Basin cells shown to drain to the outlet
    pub converged_cells: usize,
    /// Network cells reached from the outlet
    pub connected_network_cells: usize,
}

/// Run every check, stopping at the first failure.
pub fn validate_connectivity(basin: &Basin, metric: &StepMetric) -> Result<ConnectivityReport> {
    let outlet = find_outlet(basin.mask(), basin.accumulation())?;
    debug!(?outlet, "outlet located");
    let converged_cells = check_convergence(basin, metric, outlet)?;
    let connected_network_cells = check_network_connectivity(basin, outlet)?;
    check_monotonic_accumulation(basin, outlet)?;
    Ok(ConnectivityReport {
        outlet,
        converged_cells,
        connected_network_cells,
    })
}

/// Basin cell with the largest accumulation; `NaN` is skipped and ties go to
/// the first cell in row-major order.
pub fn find_outlet(basin: &Raster<u8>, accumulation: &Raster<f64>) -> Result<Cell> {
    let mut best: Option<(Cell, f64)> = None;
    for (cell, &acc) in accumulation.data().indexed_iter() {
        if basin.data()[cell] != 1 || acc.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| acc > b) {
            best = Some((cell, acc));
        }
    }
    best.map(|(cell, _)| cell).ok_or(Error::NoOutlet)
}

/// Every basin cell must reach the outlet. Returns the number of converged cells.
pub fn check_convergence(basin: &Basin, metric: &StepMetric, outlet: Cell) -> Result<usize> {
    let walker = PathWalker::new(basin, metric, StopAt::BasinExit);
    let mut state = Array2::from_elem((basin.rows(), basin.cols()), CellState::Unvisited);
    state[outlet] = CellState::Converged;

    for start in basin.cells() {
        if state[start] != CellState::Unvisited {
            continue;
        }
        state[start] = CellState::Visiting;
        let mut path = vec![start];
        let mut joined_cycle = false;

        let outcome = walker.walk(start, |step| {
            let seen = state[step.to];
            match seen {
                CellState::Converged => ControlFlow::Break(()),
                CellState::Visiting | CellState::Diverged => {
                    joined_cycle = seen == CellState::Visiting;
                    ControlFlow::Break(())
                }
                CellState::Unvisited => {
                    state[step.to] = CellState::Visiting;
                    path.push(step.to);
                    ControlFlow::Continue(())
                }
            }
        });

        let cause = match outcome.end {
            WalkEnd::Halted if !joined_cycle && state[outcome.last] == CellState::Converged => None,
            WalkEnd::Halted if joined_cycle => Some(DivergenceCause::Cycle),
            WalkEnd::Halted => Some(DivergenceCause::LeftBasin),
            WalkEnd::Cycle => Some(DivergenceCause::Cycle),
            WalkEnd::OutOfBasin | WalkEnd::ReachedNetwork => Some(DivergenceCause::LeftBasin),
            WalkEnd::Sink => Some(DivergenceCause::Sink),
            WalkEnd::StepLimitExceeded => Some(DivergenceCause::StepLimit),
        };

        let settled = if cause.is_none() {
            CellState::Converged
        } else {
            CellState::Diverged
        };
        for &cell in &path {
            state[cell] = settled;
        }
        if let Some(cause) = cause {
            let last_valid = path.last().copied().unwrap_or(start);
            return Err(Error::ConvergenceFailure {
                start,
                last_valid,
                outlet,
                cause,
            });
        }
    }

    Ok(state.iter().filter(|&&s| s == CellState::Converged).count())
}

/// Every basin network cell must be 8-connected to the outlet through network cells.
pub fn check_network_connectivity(basin: &Basin, outlet: Cell) -> Result<usize> {
    let reached = bfs_from_outlet(basin, outlet, |_, next| basin.on_network(next));
    if let Some((row, col)) = first_unreached_network_cell(basin, &reached) {
        return Err(Error::DisconnectedNetwork { row, col });
    }
    Ok(reached.iter().filter(|&&r| r).count())
}

/// Walking upstream from the outlet over network cells, accumulation must
/// strictly decrease and stay positive.
pub fn check_monotonic_accumulation(basin: &Basin, outlet: Cell) -> Result<()> {
    let acc = basin.accumulation().data();
    let mut violation: Option<Cell> = None;
    let reached = bfs_from_outlet(basin, outlet, |from, next| {
        if !basin.on_network(next) {
            return false;
        }
        if !(acc[next] > 0.0) {
            violation.get_or_insert(next);
            return false;
        }
        acc[next] < acc[from]
    });

    if let Some((row, col)) = violation.or_else(|| first_unreached_network_cell(basin, &reached)) {
        return Err(Error::AccumulationViolation {
            row,
            col,
            value: acc[(row, col)],
        });
    }
    Ok(())
}

/// Breadth-first search from the outlet over 8-neighbours accepted by `follow(from, next)`.
fn bfs_from_outlet<F>(basin: &Basin, outlet: Cell, mut follow: F) -> Array2<bool>
where
    F: FnMut(Cell, Cell) -> bool,
{
    let (rows, cols) = (basin.rows(), basin.cols());
    let mut reached = Array2::from_elem((rows, cols), false);
    let mut queue = VecDeque::from([outlet]);
    reached[outlet] = true;

    while let Some(cell) = queue.pop_front() {
        for (_, r, c) in D8Neighbors::new(cell.0, cell.1, rows, cols) {
            let next = (r, c);
            if !reached[next] && follow(cell, next) {
                reached[next] = true;
                queue.push_back(next);
            }
        }
    }
    reached
}

fn first_unreached_network_cell(basin: &Basin, reached: &Array2<bool>) -> Option<Cell> {
    basin
        .cells()
        .find(|&cell| basin.on_network(cell) && !reached[cell])
}
