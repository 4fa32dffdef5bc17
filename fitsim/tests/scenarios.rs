//! End-to-end simulations, checked through the events they report.

use std::io::Write as _;

use fitsim::*;

fn spec(arrival: Units, size: Units, service: Units) -> ProcessSpec {
    ProcessSpec { arrival, size, service }
}

fn run_logged(config: SimConfig, fit: FitKind, specs: Vec<ProcessSpec>) -> (Summary, EventLog) {
    let mut sim = Simulator::new(config, fit, specs).unwrap();
    let mut log = EventLog::default();
    let summary = sim.run(&mut log).unwrap();
    (summary, log)
}

fn events_of(log: &EventLog, tag: EventTag) -> Vec<(Units, Pid)> {
    log.entries.iter()
        .filter(|s| s.event == tag)
        .filter_map(|s| s.pid.map(|pid| (s.time, pid)))
        .collect()
}

/// Checks a reported memory layout the hard way, without
/// going through [MemoryMap::check].
fn assert_sound_layout(memory: &[Segment], total: Units) {
    assert!(!memory.is_empty());
    assert_eq!(memory[0].start, 0);
    for pair in memory.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start, "{memory:?}");
        assert!(!(pair[0].is_hole() && pair[1].is_hole()), "{memory:?}");
    }
    assert!(memory.iter().all(|s| s.len > 0), "{memory:?}");
    assert_eq!(memory.iter().map(|s| s.len).sum::<Units>(), total);
}

#[test]
fn whole_memory_process_comes_and_goes() {
    let config = SimConfig { memory_size: 100, total_time: 100, processes: 1 };
    let (summary, log) = run_logged(config, FitKind::First, vec![spec(0, 100, 1)]);

    assert_eq!(events_of(&log, EventTag::InMemory), vec![(0, 0)]);
    assert_eq!(events_of(&log, EventTag::Finished), vec![(1, 0)]);
    let placed = log.entries.iter().find(|s| s.event == EventTag::InMemory).unwrap();
    assert_eq!(placed.memory, vec![Segment { occupant: Occupant::Process(0), start: 0, len: 100 }]);
    let end = log.entries.last().unwrap();
    assert_eq!(end.event, EventTag::End);
    assert_eq!(end.time, 100);
    assert_eq!(end.memory, vec![Segment { occupant: Occupant::Hole, start: 0, len: 100 }]);
    assert_eq!((summary.unserviced, summary.required, summary.percent), (0, 1, 0));
}

#[test]
fn second_process_waits_for_room() {
    let config = SimConfig { memory_size: 100, total_time: 20, processes: 2 };
    let (summary, log) = run_logged(config, FitKind::First, vec![spec(0, 40, 5), spec(0, 70, 5)]);

    assert_eq!(events_of(&log, EventTag::InMemory), vec![(0, 0), (5, 1)]);
    assert_eq!(events_of(&log, EventTag::Finished), vec![(5, 0), (10, 1)]);
    // P1 is still waiting, untouched, when P0 moves in and when it leaves.
    let p1_waits = |tag: EventTag| log.entries.iter()
        .find(|s| s.event == tag && s.pid == Some(0))
        .is_some_and(|s| s.waiting.get(&1).is_some_and(|w| w.remaining == 5));
    assert!(p1_waits(EventTag::InMemory));
    assert!(p1_waits(EventTag::Finished));
    assert_eq!(summary.unserviced, 0);
    assert_eq!(summary.finished, 2);
}

#[test]
fn arrivals_come_before_completions_and_placements() {
    let config = SimConfig { memory_size: 10, total_time: 5, processes: 2 };
    let (_, log) = run_logged(config, FitKind::Best, vec![spec(0, 10, 2), spec(2, 10, 1)]);
    let tick_two: Vec<(EventTag, Option<Pid>)> = log.entries.iter()
        .filter(|s| s.time == 2)
        .map(|s| (s.event, s.pid))
        .collect();
    assert_eq!(tick_two, vec![
        (EventTag::Arrived, Some(1)),
        (EventTag::Finished, Some(0)),
        (EventTag::InMemory, Some(1)),
    ]);
}

#[test]
fn oversized_processes_keep_their_whole_service() {
    let config = SimConfig { memory_size: 50, total_time: 10, processes: 2 };
    let (summary, _) = run_logged(config, FitKind::Worst, vec![spec(0, 60, 7), spec(0, 10, 3)]);
    assert_eq!(summary.unserviced, 7);
    assert_eq!(summary.required, 10);
    assert_eq!(summary.percent, 70);
    assert_eq!(summary.never_placed, 1);
    assert_eq!(summary.finished, 1);
}

#[test]
fn horizon_cuts_service_short() {
    let config = SimConfig { memory_size: 50, total_time: 4, processes: 1 };
    let (summary, log) = run_logged(config, FitKind::Next, vec![spec(1, 10, 10)]);
    // Served during ticks 1, 2 and 3.
    assert_eq!(summary.unserviced, 7);
    assert_eq!(summary.percent, 70);
    assert!(events_of(&log, EventTag::Finished).is_empty());
}

#[test]
fn empty_workload_reports_zero_percent() {
    let config = SimConfig { memory_size: 50, total_time: 3, processes: 0 };
    let (summary, log) = run_logged(config, FitKind::First, vec![]);
    assert_eq!((summary.unserviced, summary.required, summary.percent), (0, 0, 0));
    let tags: Vec<EventTag> = log.entries.iter().map(|s| s.event).collect();
    assert_eq!(tags, vec![EventTag::Start, EventTag::End]);
}

#[test]
fn runs_are_deterministic() {
    let config = SimConfig::default();
    let specs = RandomWorkload::new(42).read_specs(config.processes).unwrap();
    for fit in FitKind::ALL {
        let (first, log_a) = run_logged(config, fit, specs.clone());
        let (second, log_b) = run_logged(config, fit, specs.clone());
        assert_eq!(first, second, "{fit}");
        assert_eq!(log_a, log_b, "{fit}");
    }
}

#[test]
fn placements_are_sound_and_layouts_stay_valid() {
    let config = SimConfig { memory_size: 128, total_time: 150, processes: 80 };
    for seed in 0..5 {
        let specs = RandomWorkload::new(seed)
            .with_limits(100, 40, 30)
            .read_specs(config.processes)
            .unwrap();
        for fit in FitKind::ALL {
            let (summary, log) = run_logged(config, fit, specs.clone());
            for (idx, snap) in log.entries.iter().enumerate() {
                assert_sound_layout(&snap.memory, config.memory_size);
                if snap.event != EventTag::InMemory {
                    continue;
                }
                // Right before the insertion, the process was waiting
                // and some hole could take it.
                let before = &log.entries[idx - 1];
                let pid = snap.pid.unwrap();
                let size = before.waiting.get(&pid).unwrap().size;
                assert!(before.memory.iter().any(|s| s.fits(size)), "{fit}, seed {seed}");
            }
            assert!(summary.unserviced <= summary.required);
        }
    }
}

#[test]
fn worst_fit_picks_the_biggest_hole_in_a_run() {
    // After tick 2 memory reads [H,0,10][P1,10,5][H,15,50][P3,65,5][H,70,30]
    // and P4 goes into the 50-hole.
    let specs = vec![
        spec(0, 10, 2),
        spec(0, 5, 20),
        spec(0, 50, 2),
        spec(0, 5, 20),
        spec(3, 5, 20),
    ];
    let config = SimConfig { memory_size: 100, total_time: 4, processes: 5 };
    let (_, log) = run_logged(config, FitKind::Worst, specs);
    let placed = log.entries.iter()
        .find(|s| s.event == EventTag::InMemory && s.pid == Some(4))
        .unwrap();
    assert_eq!(placed.time, 3);
    assert_eq!(placed.memory, vec![
        Segment { occupant: Occupant::Hole, start: 0, len: 10 },
        Segment { occupant: Occupant::Process(1), start: 10, len: 5 },
        Segment { occupant: Occupant::Process(4), start: 15, len: 5 },
        Segment { occupant: Occupant::Hole, start: 20, len: 45 },
        Segment { occupant: Occupant::Process(3), start: 65, len: 5 },
        Segment { occupant: Occupant::Hole, start: 70, len: 30 },
    ]);
}

#[test]
fn text_log_reads_like_the_classic_one() {
    let config = SimConfig { memory_size: 100, total_time: 2, processes: 1 };
    let mut sim = Simulator::new(config, FitKind::First, vec![spec(0, 30, 5)]).unwrap();
    let mut reporter = TextReporter::new(Vec::new());
    sim.run(&mut reporter).unwrap();
    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(
        text,
        "Time: 0 START\n  Memory [PID,start,size]: ->[H,0,100]\n  Waiting (PID,arrival,size,t): \n\n\
         Time: 0 ARRIVED:P0\n  Memory [PID,start,size]: ->[H,0,100]\n  Waiting (PID,arrival,size,t): (P0,0,30,5) \n\n\
         Time: 0 INMEMORY:P0\n  Memory [PID,start,size]: ->[P0,0,30]->[H,30,70]\n  Waiting (PID,arrival,size,t): \n\n\
         Time: 2 END\n  Memory [PID,start,size]: ->[P0,0,30]->[H,30,70]\n  Waiting (PID,arrival,size,t): \n\n"
    );
}

#[test]
fn workload_files_feed_the_simulator() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "0 40 3\n1 30 2\n2 50 1").unwrap();
    let specs = TextWorkload::from_path(file.path().to_path_buf())
        .unwrap()
        .read_specs(3)
        .unwrap();
    let config = SimConfig { memory_size: 100, total_time: 10, processes: 3 };
    let summary = Simulator::new(config, FitKind::Best, specs)
        .unwrap()
        .run(&mut Silent)
        .unwrap();
    assert_eq!(summary.required, 6);
    assert_eq!(summary.unserviced, 0);
}

#[test]
fn missing_workload_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let res = TextWorkload::from_path(dir.path().join("nope"));
    assert!(matches!(res, Err(WorkloadError::Io(_))));
}
