pub mod placement;

use crate::{
    helpe::*,
    analyze::map_is_valid,
};

/// Knobs of a single simulation. The defaults are those of the
/// classic classroom setup: 50 processes competing for 100 units
/// of memory over 100 ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub memory_size:    Units,
    pub total_time:     Units,
    pub processes:      usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            memory_size:    100,
            total_time:     100,
            processes:      50,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.memory_size == 0 {
            return Err(SimError::Config(String::from("memory size must be positive")));
        }

        Ok(())
    }
}

/// Owns everything a run mutates: the memory, the process table,
/// the clock and next fit's cursor. Two simulators never share
/// state, so any number of them may run side by side.
///
/// Every tick goes through four passes over the process table,
/// always in ascending id order:
///
/// 1. *arrivals*: processes whose arrival time has come start waiting,
/// 2. *completions*: resident processes out of service leave memory,
/// 3. *placement*: waiting processes try to get memory,
/// 4. *service*: every resident process gets one tick of service.
///
/// Completions run before placement, hence memory freed during a
/// tick can be handed out during that very same tick.
pub struct Simulator {
    config: SimConfig,
    fit:    FitKind,
    memory: MemoryMap,
    table:  Vec<Process>,
    // Where next fit resumes. Refreshed by every insertion and
    // every release, whatever the strategy.
    cursor: SegmentId,
    now:    Units,
}

impl Simulator {
    /// Sets up a simulation at tick 0, with all memory free and
    /// no process arrived yet. Exactly `config.processes` records
    /// must be supplied.
    pub fn new(
        config: SimConfig,
        fit:    FitKind,
        specs:  Vec<ProcessSpec>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        if specs.len() != config.processes {
            return Err(WorkloadError::Count {
                expected:   config.processes,
                found:      specs.len(),
            }.into());
        }
        validate_specs(&specs)?;
        let memory = MemoryMap::new(config.memory_size)
            .map_err(|source| SimError::Memory { time: 0, source })?;
        let cursor = memory.head();
        let table = specs.into_iter()
            .enumerate()
            .map(|(id, spec)| Process::new(id as Pid, spec))
            .collect();

        Ok(Self {
            config,
            fit,
            memory,
            table,
            cursor,
            now:    0,
        })
    }

    #[inline(always)]
    pub fn now(&self) -> Units {
        self.now
    }

    pub fn fit(&self) -> FitKind {
        self.fit
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn memory(&self) -> &MemoryMap {
        &self.memory
    }

    /// The process table, indexed by [Pid].
    pub fn processes(&self) -> &[Process] {
        &self.table
    }

    pub fn is_over(&self) -> bool {
        self.now >= self.config.total_time
    }

    /// Runs all remaining ticks, reporting every event along the way,
    /// and sums things up.
    pub fn run<R>(&mut self, reporter: &mut R) -> Result<Summary, SimError>
    where R: Reporter + ?Sized {
        self.emit(reporter, EventTag::Start, None)?;
        while !self.is_over() {
            self.step(reporter)?;
        }
        self.emit(reporter, EventTag::End, None)?;

        Ok(Summary::of(self))
    }

    /// Advances the simulation by exactly one tick.
    pub fn step<R>(&mut self, reporter: &mut R) -> Result<(), SimError>
    where R: Reporter + ?Sized {
        let t = self.now;

        //---START ARRIVALS
        for idx in 0..self.table.len() {
            let p = &mut self.table[idx];
            if p.status == Status::NotArrived && p.has_arrived_by(t) {
                p.status = Status::Waiting;
                let id = p.id;
                self.emit(reporter, EventTag::Arrived, Some(id))?;
            }
        }
        //---END ARRIVALS

        //---START COMPLETIONS
        for idx in 0..self.table.len() {
            if !self.table[idx].is_done() {
                continue;
            }
            let id = self.table[idx].id;
            self.table[idx].status = Status::Finished;
            self.cursor = self.memory
                .release(id)
                .map_err(|source| SimError::Memory { time: t, source })?;
            self.emit(reporter, EventTag::Finished, Some(id))?;
        }
        //---END COMPLETIONS

        //---START PLACEMENT
        for idx in 0..self.table.len() {
            if !self.table[idx].is_waiting() {
                continue;
            }
            let (id, size) = (self.table[idx].id, self.table[idx].size);
            let from = if self.fit.uses_cursor() { self.cursor } else { self.memory.head() };
            let Some(hole) = self.fit.find_fit(&self.memory, size, from) else {
                continue;
            };
            self.cursor = self.memory
                .insert(hole, size, id)
                .map_err(|source| SimError::Memory { time: t, source })?;
            self.table[idx].status = Status::Resident;
            debug!("t={t}: P{id} ({size} units) placed by {}", self.fit);
            self.emit(reporter, EventTag::InMemory, Some(id))?;
        }
        //---END PLACEMENT

        //---START SERVICE
        for p in self.table.iter_mut().filter(|p| p.is_resident()) {
            p.serve();
        }
        //---END SERVICE

        debug_assert!(map_is_valid(&self.memory), "Invalid memory map at tick {t}!");
        self.now += 1;

        Ok(())
    }

    /// Freezes the current state for a [Reporter].
    pub fn snapshot(&self, event: EventTag, pid: Option<Pid>) -> Snapshot {
        Snapshot {
            time:       self.now,
            event,
            pid,
            memory:     self.memory.snapshot(),
            waiting:    self.table.iter()
                .filter(|p| p.is_waiting())
                .map(|p| (p.id, WaitingEntry {
                    arrival:    p.arrival,
                    size:       p.size,
                    remaining:  p.remaining,
                }))
                .collect(),
        }
    }

    fn emit<R>(&self, reporter: &mut R, event: EventTag, pid: Option<Pid>) -> Result<(), SimError>
    where R: Reporter + ?Sized {
        reporter.report(&self.snapshot(event, pid))?;

        Ok(())
    }
}
