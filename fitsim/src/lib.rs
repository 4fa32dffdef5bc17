//! Welcome to `fitsim`!
//!
//! A discrete-time simulator of contiguous memory allocation. A fixed
//! workload of processes arrives over time, each asking for a run of
//! memory; one of four placement strategies (first, next, best or worst
//! fit) decides where each one lands. At the end we count how much of the
//! requested service could not be delivered.

mod process;
mod analyze;

pub mod algo;
pub mod memmap;
pub mod report;
pub mod workload;
pub mod helpe;

pub use crate::helpe::*;
pub use crate::analyze::{compare, map_is_valid};

/// One line of workload, exactly as some [WorkloadGen] produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSpec {
    pub arrival:    Units,
    pub size:       Units,
    pub service:    Units,
}

/// Where a [Process] stands in its lifecycle. The only legal
/// transitions are, in order:
///
/// `NotArrived -> Waiting -> Resident -> Finished`
///
/// A resident process is never swapped back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    NotArrived,
    Waiting,
    Resident,
    Finished,
}

/// Our fundamental unit of interest. A [`Process`] arrives at
/// [`arrival`](Process::arrival), waits until `size` contiguous units
/// of memory can be found for it, and then stays resident for
/// [`service`](Process::service) ticks.
///
/// > ***ATTENTION:*** `remaining` is decremented at the *end* of every tick
/// > the process spends in memory, and the process is only reaped at the
/// > *start* of the following one. A process with service 1 placed at tick
/// > `t` thus finishes at tick `t + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id:         Pid,
    pub arrival:    Units,
    pub size:       Units,
    // The originally requested service time. Never changes.
    pub service:    Units,
    pub remaining:  Units,
    pub status:     Status,
}

/// Who lives in a [Segment].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Hole,
    Process(Pid),
}

/// A contiguous run of the address space, `[start, start + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub occupant:   Occupant,
    pub start:      Units,
    pub len:        Units,
}
