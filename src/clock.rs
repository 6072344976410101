//! Clock - Fixed-period driver for instruction pointers
//!
//! The clock owns the active pointer set. Each tick runs one
//! [`Interpreter::step`] for every pointer in ascending [`PointerId`] order,
//! so a `p` by an earlier pointer is visible to a `g` by a later one within
//! the same tick.
//!
//! Time is pushed in by the host: [`Clock::poll`] fires every tick whose
//! deadline has passed. Starting is edge-triggered and runs one tick
//! immediately before the periodic schedule begins.

use std::time::Duration;

use crate::error::{FungeError, Result};
use crate::grid::ToroidalGrid;
use crate::vm::{GridWrite, InstructionPointer, Interpreter, PointerId, StepResult};

/// Everything that happened during one tick
#[derive(Debug, Default)]
pub struct TickReport {
    /// Tick sequence number, starting at 1
    pub tick: u64,
    /// Step result per pointer, in tick order
    pub outcomes: Vec<(PointerId, StepResult)>,
    /// Cells written by `p` during this tick
    pub writes: Vec<GridWrite>,
    /// Pointers removed by `@`
    pub terminated: Vec<PointerId>,
}

impl TickReport {
    pub fn faults(&self) -> impl Iterator<Item = (PointerId, &FungeError)> {
        self.outcomes.iter().filter_map(|(id, r)| match r {
            StepResult::Fault(e) => Some((*id, e)),
            _ => None,
        })
    }
}

/// Outcome of [`Clock::toggle`]
#[derive(Debug)]
pub enum Toggle {
    /// Clock started; carries the immediate first tick
    Started(TickReport),
    Stopped,
}

pub struct Clock {
    period: Duration,
    running: bool,
    next_due: Option<Duration>,
    ticks: u64,
    pointers: Vec<InstructionPointer>,
    interpreter: Interpreter,
}

impl Clock {
    pub fn new(period: Duration, interpreter: Interpreter) -> Result<Self> {
        if period.is_zero() {
            return Err(FungeError::InvalidConfig("tick period must be positive".into()));
        }
        Ok(Self {
            period,
            running: false,
            next_due: None,
            ticks: 0,
            pointers: Vec::new(),
            interpreter,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks fired since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Add a pointer, keeping tick order by id
    pub fn add_pointer(&mut self, mut ip: InstructionPointer) {
        ip.set_active(self.running);
        let idx = self
            .pointers
            .partition_point(|other| other.id() < ip.id());
        self.pointers.insert(idx, ip);
    }

    pub fn remove_pointer(&mut self, id: PointerId) -> Option<InstructionPointer> {
        let idx = self.pointers.iter().position(|ip| ip.id() == id)?;
        Some(self.pointers.remove(idx))
    }

    pub fn pointers(&self) -> &[InstructionPointer] {
        &self.pointers
    }

    pub fn pointer(&self, id: PointerId) -> Option<&InstructionPointer> {
        self.pointers.iter().find(|ip| ip.id() == id)
    }

    pub fn pointer_mut(&mut self, id: PointerId) -> Option<&mut InstructionPointer> {
        self.pointers.iter_mut().find(|ip| ip.id() == id)
    }

    /// Start or stop. Starting runs one tick synchronously.
    pub fn toggle(&mut self, now: Duration, grid: &mut ToroidalGrid) -> Toggle {
        if self.running {
            self.stop();
            Toggle::Stopped
        } else {
            Toggle::Started(self.start(now, grid))
        }
    }

    fn start(&mut self, now: Duration, grid: &mut ToroidalGrid) -> TickReport {
        log::info!("Starting clock ({:?} period)", self.period);
        self.running = true;
        self.next_due = Some(now + self.period);
        for ip in &mut self.pointers {
            ip.set_active(true);
        }
        self.tick(grid)
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Stopping clock after {} ticks", self.ticks);
        }
        self.running = false;
        self.next_due = None;
        for ip in &mut self.pointers {
            ip.set_active(false);
        }
    }

    /// Fire every tick that is due at `now`
    pub fn poll(&mut self, now: Duration, grid: &mut ToroidalGrid) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while let Some(due) = self.next_due {
            if !self.running || due > now {
                break;
            }
            self.next_due = Some(due + self.period);
            reports.push(self.tick(grid));
        }
        reports
    }

    /// Run one step for every pointer, in id order
    pub fn tick(&mut self, grid: &mut ToroidalGrid) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        for ip in &mut self.pointers {
            let result = self.interpreter.step(ip, grid);
            if matches!(result, StepResult::Halt) {
                report.terminated.push(ip.id());
            }
            report.outcomes.push((ip.id(), result));
        }
        report.writes = self.interpreter.take_writes();

        if !report.terminated.is_empty() {
            self.pointers.retain(|ip| !report.terminated.contains(&ip.id()));
            if self.pointers.is_empty() {
                self.stop();
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;
    use crate::tween::AnimationScheduler;
    use crate::vm::{Positionable, SharedScheduler};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn pointer(id: u32, grid: &ToroidalGrid, sched: &SharedScheduler, col: i64, row: i64) -> InstructionPointer {
        InstructionPointer::new(PointerId(id), grid, col, row, Direction::Right, sched, ms(60)).unwrap()
    }

    #[test]
    fn test_start_ticks_immediately_then_periodically() {
        let mut grid = ToroidalGrid::from_source("1111");
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let mut clock = Clock::new(ms(100), Interpreter::with_seed(1)).unwrap();
        clock.add_pointer(pointer(0, &grid, &sched, 0, 0));

        match clock.toggle(ms(0), &mut grid) {
            Toggle::Started(report) => assert_eq!(report.tick, 1),
            Toggle::Stopped => panic!("expected start"),
        }
        assert!(clock.pointers()[0].is_active());
        assert!(clock.poll(ms(99), &mut grid).is_empty());
        assert_eq!(clock.poll(ms(100), &mut grid).len(), 1);
        assert_eq!(clock.poll(ms(350), &mut grid).len(), 2);
        assert_eq!(clock.pointers()[0].stack().len(), 4);

        assert!(matches!(clock.toggle(ms(360), &mut grid), Toggle::Stopped));
        assert!(!clock.pointers()[0].is_active());
        assert!(clock.poll(ms(10_000), &mut grid).is_empty());
    }

    #[test]
    fn test_terminate_removes_pointer_and_halts() {
        let mut grid = ToroidalGrid::from_source("@");
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let mut clock = Clock::new(ms(10), Interpreter::with_seed(1)).unwrap();
        clock.add_pointer(pointer(0, &grid, &sched, 0, 0));

        let report = match clock.toggle(ms(0), &mut grid) {
            Toggle::Started(report) => report,
            Toggle::Stopped => panic!("expected start"),
        };
        assert_eq!(report.terminated, vec![PointerId(0)]);
        assert!(clock.pointers().is_empty());
        assert!(!clock.is_running());
    }

    #[test]
    fn test_pointers_tick_in_id_order() {
        // ip1 writes '7' at (0,1); ip2 reads it back in the same tick.
        let mut grid = ToroidalGrid::new(4, 3).unwrap();
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let mut clock = Clock::new(ms(10), Interpreter::with_seed(1)).unwrap();

        let mut reader = pointer(2, &grid, &sched, 3, 2);
        reader.stack_mut().push(0);
        reader.stack_mut().push(1);
        grid.set(3, 2, 'g');
        let mut writer = pointer(1, &grid, &sched, 3, 0);
        writer.stack_mut().push('7' as i64);
        writer.stack_mut().push(0);
        writer.stack_mut().push(1);
        grid.set(3, 0, 'p');

        clock.add_pointer(reader);
        clock.add_pointer(writer);
        assert_eq!(clock.pointers()[0].id(), PointerId(1));

        let report = clock.tick(&mut grid);
        assert_eq!(report.writes.len(), 1);
        assert_eq!(
            clock.pointer(PointerId(2)).unwrap().stack().as_slice(),
            &['7' as i64]
        );
    }

    #[test]
    fn test_fault_only_stalls_offending_pointer() {
        let mut grid = ToroidalGrid::from_source("+ \n1 ");
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let mut clock = Clock::new(ms(10), Interpreter::with_seed(1)).unwrap();
        clock.add_pointer(pointer(0, &grid, &sched, 0, 0));
        clock.add_pointer(pointer(1, &grid, &sched, 0, 1));

        let report = clock.tick(&mut grid);
        let faults: Vec<_> = report.faults().map(|(id, _)| id).collect();
        assert_eq!(faults, vec![PointerId(0)]);
        assert_eq!(clock.pointer(PointerId(0)).unwrap().position().col, 0);
        assert_eq!(clock.pointer(PointerId(1)).unwrap().position().col, 1);
        assert_eq!(clock.pointers().len(), 2);
    }

    #[test]
    fn test_multiply_program_end_to_end() {
        let config = crate::config::Config {
            rows: 3,
            cols: 3,
            ..crate::config::Config::default()
        };
        let mut grid = crate::loader::load_string("67*", &config).unwrap();
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let mut clock = Clock::new(config.tick_period(), Interpreter::with_seed(1)).unwrap();
        clock.add_pointer(pointer(0, &grid, &sched, 0, 0));

        assert!(matches!(clock.toggle(ms(0), &mut grid), Toggle::Started(_)));
        let reports = clock.poll(config.tick_period() * 2, &mut grid);
        assert_eq!(reports.len(), 2);

        let ip = &clock.pointers()[0];
        assert_eq!(ip.stack().as_slice(), &[42]);
        // Three steps right on a 3-wide grid lands back on the start.
        assert_eq!(ip.position().col, 0);
    }

    #[test]
    fn test_pointer_wraps_vertically() {
        let mut grid = ToroidalGrid::from_source("^\n \n ");
        let sched = Rc::new(RefCell::new(AnimationScheduler::new()));
        let mut clock = Clock::new(ms(10), Interpreter::with_seed(1)).unwrap();
        clock.add_pointer(pointer(0, &grid, &sched, 0, 0));

        clock.tick(&mut grid);
        let ip = &clock.pointers()[0];
        assert_eq!(ip.direction(), Direction::Up);
        assert_eq!(ip.position().row, 2);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(Clock::new(Duration::ZERO, Interpreter::new()).is_err());
    }
}
