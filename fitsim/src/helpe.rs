pub use std::{
    io::{BufRead, BufReader, Read, Write},
    path::PathBuf,
    fmt,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use indexmap::IndexMap;
pub use clap::{Parser, ValueEnum};
pub use log::{debug, trace};

pub use crate::{Process, ProcessSpec, Segment, Occupant, Status,
    memmap::{MemoryMap, SegmentId},
    algo::{
        Simulator,
        SimConfig,
        placement::{FitKind, FitStrategy},
    },
    analyze::{Summary, Fragmentation},
    report::*,
    workload::*,
};

/// The unit for measuring both memory and logical time. `fitsim`
/// does not care about semantics, as long as a tick is the atomic
/// step of the simulation and a unit is the atomic piece of memory.
///
/// Using one type for sizes and ticks keeps the workload triples
/// homogeneous, which is all the input format ever gives us.
pub type Units = usize;

/// Processes are identified by their position in the workload.
pub type Pid = u32;

/// Raised by [MemoryMap] whenever a caller breaks its contract.
///
/// None of these are runtime conditions: a simulation which hits one
/// of them is defective and is aborted.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("memory must have a non-zero size")]
    ZeroSize,
    #[error("cannot insert a zero-sized occupant")]
    ZeroRequest,
    #[error("segment {0:?} does not exist (anymore)")]
    StaleHandle(SegmentId),
    #[error("segment at offset {start} is occupied by P{pid}, not a hole")]
    NotAHole {
        start:  Units,
        pid:    Pid,
    },
    #[error("hole at offset {start} has {len} units, {wanted} were requested")]
    HoleTooSmall {
        start:  Units,
        len:    Units,
        wanted: Units,
    },
    #[error("no segment is occupied by P{0}")]
    NoSuchOccupant(Pid),
}

/// Appears while turning raw input into the [ProcessSpec]s
/// that seed a simulation.
#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("token #{position} ({token:?}) is not a non-negative integer")]
    Parse {
        position:   usize,
        token:      String,
    },
    #[error("expected {expected} processes, got {found}")]
    Count {
        expected:   usize,
        found:      usize,
    },
    #[error("process {pid} has {field} 0, which must be positive")]
    NonPositive {
        pid:        Pid,
        field:      &'static str,
    },
}

/// Everything that may stop [Simulator] from running to completion.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("bad configuration: {0}")]
    Config(String),
    #[error("reporter failed: {0}")]
    Report(#[from] std::io::Error),
    #[error(transparent)]
    Workload(#[from] WorkloadError),
    #[error("memory contract broken at tick {time}: {source}")]
    Memory {
        time:   Units,
        #[source]
        source: MapError,
    },
}
