use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::helpe::*;

/// Defines the interface for obtaining a workload.
///
/// For example: [TextWorkload] reads integer triples from a file
/// or stdin, [RandomWorkload] makes them up.
///
/// The user can implement their own types as needed.
pub trait WorkloadGen {
    /// Either exactly `n` valid records are returned, or an error.
    /// A simulation never starts from a partial workload.
    fn read_specs(&mut self, n: usize) -> Result<Vec<ProcessSpec>, WorkloadError>;
}

/// Checks that every process asks for some memory and some time.
pub fn validate_specs(specs: &[ProcessSpec]) -> Result<(), WorkloadError> {
    for (idx, s) in specs.iter().enumerate() {
        let field = if s.size == 0 {
            "size"
        } else if s.service == 0 {
            "service"
        } else {
            continue;
        };
        return Err(WorkloadError::NonPositive { pid: idx as Pid, field });
    }

    Ok(())
}

/// Writes one `arrival size service` line per record, which is
/// exactly what [TextWorkload] reads back.
pub fn write_specs<W: Write>(out: &mut W, specs: &[ProcessSpec]) -> std::io::Result<()> {
    for s in specs {
        writeln!(out, "{} {} {}", s.arrival, s.size, s.service)?;
    }
    out.flush()
}

/// Reads whitespace-separated `arrival size service` triples.
///
/// Line breaks carry no meaning. Whatever follows the `n`-th
/// triple is ignored, though it may already have been pulled out
/// of `source` by buffering. Asking for no triples reads nothing.
pub struct TextWorkload<R: Read> {
    source: R,
}

impl<R: Read> TextWorkload<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }
}

impl TextWorkload<std::fs::File> {
    pub fn from_path(path: PathBuf) -> Result<Self, WorkloadError> {
        Ok(Self::new(std::fs::File::open(path)?))
    }
}

impl<R: Read> WorkloadGen for TextWorkload<R> {
    fn read_specs(&mut self, n: usize) -> Result<Vec<ProcessSpec>, WorkloadError> {
        if n == 0 {
            return Ok(vec![]);
        }
        let wanted = 3 * n;
        let mut nums: Vec<Units> = Vec::with_capacity(wanted);
        let reader = BufReader::new(&mut self.source);
        'lines: for line in reader.lines() {
            for token in line?.split_whitespace() {
                let Ok(v) = token.parse::<Units>() else {
                    return Err(WorkloadError::Parse {
                        position:   nums.len() + 1,
                        token:      token.to_string(),
                    });
                };
                nums.push(v);
                if nums.len() == wanted {
                    break 'lines;
                }
            }
        }
        if nums.len() < wanted {
            return Err(WorkloadError::Count {
                expected:   n,
                found:      nums.len() / 3,
            });
        }
        let res: Vec<ProcessSpec> = nums.chunks_exact(3)
            .map(|c| ProcessSpec { arrival: c[0], size: c[1], service: c[2] })
            .collect();
        validate_specs(&res)?;

        Ok(res)
    }
}

/// Makes up a workload with a seeded generator. The same seed
/// always yields the same workload.
///
/// Arrivals are drawn from `[0, max_arrival)`, sizes from
/// `[1, max_size]` and service times from `[1, max_service]`.
pub struct RandomWorkload {
    rng:                StdRng,
    pub max_arrival:    Units,
    pub max_size:       Units,
    pub max_service:    Units,
}

impl RandomWorkload {
    pub const MAX_ARRIVAL: Units = 80;
    pub const MAX_SIZE: Units = 30;
    pub const MAX_SERVICE: Units = 100;

    pub fn new(seed: u64) -> Self {
        Self {
            rng:            StdRng::seed_from_u64(seed),
            max_arrival:    Self::MAX_ARRIVAL,
            max_size:       Self::MAX_SIZE,
            max_service:    Self::MAX_SERVICE,
        }
    }

    pub fn with_limits(mut self, max_arrival: Units, max_size: Units, max_service: Units) -> Self {
        self.max_arrival = max_arrival;
        self.max_size = max_size;
        self.max_service = max_service;
        self
    }
}

impl WorkloadGen for RandomWorkload {
    fn read_specs(&mut self, n: usize) -> Result<Vec<ProcessSpec>, WorkloadError> {
        // Degenerate limits collapse onto the smallest legal value.
        let (arrivals, sizes, services) = (
            self.max_arrival.max(1),
            self.max_size.max(1),
            self.max_service.max(1),
        );

        Ok((0..n)
            .map(|_| ProcessSpec {
                arrival:    self.rng.gen_range(0..arrivals),
                size:       self.rng.gen_range(1..=sizes),
                service:    self.rng.gen_range(1..=services),
            })
            .collect())
    }
}
