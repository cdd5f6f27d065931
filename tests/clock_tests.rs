use pretty_log::clock::StartClock;
use pretty_log::{EncoderPools, PrettyEncoder};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_elapsed_monotonicity() {
    let clock = StartClock::new();
    let mut prev = clock.elapsed();
    for _ in 0..1000 {
        let current = clock.elapsed();
        assert!(current >= prev, "Elapsed time should never go backwards");
        prev = current;
    }
}

#[test]
fn test_copies_share_start() {
    let clock = StartClock::new();
    let copy = clock;
    thread::sleep(Duration::from_millis(2));

    assert_eq!(clock, copy);
    assert!(copy.elapsed() >= Duration::from_millis(2));
}

#[test]
fn test_starting_at_known_instant() {
    let start = Instant::now() - Duration::from_secs(3);
    let clock = StartClock::starting_at(start);

    assert_eq!(clock.start(), start);
    assert!(clock.elapsed() >= Duration::from_secs(3));
}

#[test]
fn test_clock_survives_thread_hop() {
    let clock = StartClock::new();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(1));
        (clock.start(), clock.elapsed())
    });

    let (start, elapsed) = handle.join().unwrap();
    assert_eq!(start, clock.start());
    assert!(elapsed >= Duration::from_millis(1));
}

#[test]
fn test_encoder_lineage_keeps_root_clock() {
    let root = PrettyEncoder::with_pools(Arc::new(EncoderPools::default()));
    let child = root.with_fields(&[]);
    let grandchild = child.deep_clone();
    let scratch = grandchild.clone_empty();

    assert_eq!(child.clock(), root.clock());
    assert_eq!(grandchild.clock(), root.clock());
    assert_eq!(scratch.clock(), root.clock());
}

#[test]
fn test_new_roots_get_new_clocks() {
    let first = PrettyEncoder::new();
    thread::sleep(Duration::from_millis(1));
    let second = PrettyEncoder::new();

    assert!(second.clock().start() > first.clock().start());
}
