use crate::helpe::*;

impl Process {
    /// Spawns a not-yet-arrived process out of a workload record.
    pub fn new(id: Pid, spec: ProcessSpec) -> Self {
        Self {
            id,
            arrival:    spec.arrival,
            size:       spec.size,
            service:    spec.service,
            remaining:  spec.service,
            status:     Status::NotArrived,
        }
    }

    #[inline(always)]
    pub fn has_arrived_by(&self, t: Units) -> bool {
        self.arrival <= t
    }

    #[inline(always)]
    pub fn is_waiting(&self) -> bool {
        self.status == Status::Waiting
    }

    #[inline(always)]
    pub fn is_resident(&self) -> bool {
        self.status == Status::Resident
    }

    /// Returns `true` if the process has had all of its
    /// service delivered but still holds on to its memory.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.status == Status::Resident && self.remaining == 0
    }

    /// Hands out one tick of service. Saturates at zero.
    #[inline(always)]
    pub fn serve(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

impl Segment {
    #[inline(always)]
    pub fn is_hole(&self) -> bool {
        self.occupant == Occupant::Hole
    }

    /// Returns `true` if this is a hole wide enough for `size` units.
    #[inline(always)]
    pub fn fits(&self, size: Units) -> bool {
        self.is_hole() && self.len >= size
    }

    /// First address past the segment.
    #[inline(always)]
    pub fn end(&self) -> Units {
        self.start + self.len
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Hole          => write!(f, "H"),
            Occupant::Process(pid)  => write!(f, "P{pid}"),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.occupant, self.start, self.len)
    }
}
