use crate::helpe::*;

/// How scattered the free memory is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fragmentation {
    pub holes:          usize,
    pub free:           Units,
    pub largest_hole:   Units,
}

impl Fragmentation {
    pub fn of(map: &MemoryMap) -> Self {
        map.segments()
            .filter(|s| s.is_hole())
            .fold(Self::default(), |acc, s| Self {
                holes:          acc.holes + 1,
                free:           acc.free + s.len,
                largest_hole:   acc.largest_hole.max(s.len),
            })
    }
}

/// The outcome of a finished simulation.
///
/// Processes that never made it into memory count with their
/// whole service time as unserviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub fit:            FitKind,
    pub unserviced:     Units,
    pub required:       Units,
    pub percent:        Units,
    pub finished:       usize,
    pub never_placed:   usize,
    pub fragmentation:  Fragmentation,
}

impl Summary {
    pub fn of(sim: &Simulator) -> Self {
        let procs = sim.processes();
        let unserviced = procs.iter().map(|p| p.remaining).sum();
        let required = procs.iter().map(|p| p.service).sum();

        Self {
            fit:            sim.fit(),
            unserviced,
            required,
            percent:        percent_unserviced(unserviced, required),
            finished:       procs.iter().filter(|p| p.status == Status::Finished).count(),
            never_placed:   procs.iter()
                .filter(|p| matches!(p.status, Status::NotArrived | Status::Waiting))
                .count(),
            fragmentation:  Fragmentation::of(sim.memory()),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Using the {} algorithm", self.fit)?;
        writeln!(f, "\tTotal unserviced time is {}", self.unserviced)?;
        writeln!(f, "\tTotal service required is {}", self.required)?;
        writeln!(f, "\tPercent unserviced is {}%", self.percent)
    }
}

/// Integer percentage, truncated. Nothing to serve means
/// nothing was left unserved.
#[inline(always)]
pub fn percent_unserviced(unserviced: Units, required: Units) -> Units {
    if required == 0 { 0 } else { unserviced * 100 / required }
}

/// Debug-time sanity check of a [MemoryMap].
pub fn map_is_valid(map: &MemoryMap) -> bool {
    match map.check() {
        Ok(())  => true,
        Err(e)  => {
            log::error!("{e}");
            false
        }
    }
}

/// Runs every [FitKind] over the same workload. Simulations are
/// independent of each other, so they all run in parallel.
///
/// Summaries come back in [FitKind::ALL] order.
pub fn compare(config: SimConfig, specs: &[ProcessSpec]) -> Result<Vec<Summary>, SimError> {
    FitKind::ALL
        .par_iter()
        .map(|&fit| {
            let mut sim = Simulator::new(config, fit, specs.to_vec())?;
            sim.run(&mut Silent)
        })
        .collect()
}
