//! Rendering of simulation events. Reporters only ever see frozen
//! copies of the simulator's state; they decide nothing.
use crate::helpe::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    Start,
    Arrived,
    Finished,
    InMemory,
    End,
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventTag::Start     => "START",
            EventTag::Arrived   => "ARRIVED",
            EventTag::Finished  => "FINISHED",
            EventTag::InMemory  => "INMEMORY",
            EventTag::End       => "END",
        })
    }
}

/// What a reporter gets to know about a waiting process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingEntry {
    pub arrival:    Units,
    pub size:       Units,
    pub remaining:  Units,
}

/// The state of a simulation right after `event` happened
/// to `pid` (if the event concerns a process at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub time:       Units,
    pub event:      EventTag,
    pub pid:        Option<Pid>,
    pub memory:     Vec<Segment>,
    // Sorted by pid.
    pub waiting:    IndexMap<Pid, WaitingEntry>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time: {} {}", self.time, self.event)?;
        if let Some(pid) = self.pid {
            write!(f, ":P{pid}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "  Memory [PID,start,size]: {}",
            self.memory.iter().format_with("", |s, g| g(&format_args!("->{s}")))
        )?;
        writeln!(
            f,
            "  Waiting (PID,arrival,size,t): {}",
            self.waiting.iter().format_with("", |(pid, w), g| {
                g(&format_args!("(P{pid},{},{},{}) ", w.arrival, w.size, w.remaining))
            })
        )?;
        writeln!(f)
    }
}

/// Consumes [Snapshot]s as the simulation produces them.
pub trait Reporter {
    fn report(&mut self, snapshot: &Snapshot) -> std::io::Result<()>;
}

/// Writes the classic human-readable event log.
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        write!(self.out, "{snapshot}")?;
        if snapshot.event == EventTag::End {
            self.out.flush()?;
        }

        Ok(())
    }
}

/// Keeps every snapshot around.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLog {
    pub entries: Vec<Snapshot>,
}

impl Reporter for EventLog {
    fn report(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        self.entries.push(snapshot.clone());

        Ok(())
    }
}

/// Throws everything away.
pub struct Silent;

impl Reporter for Silent {
    fn report(&mut self, _: &Snapshot) -> std::io::Result<()> {
        Ok(())
    }
}
