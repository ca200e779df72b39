//! Sampler threads must stop and be joined when the `Sampler` goes away.

use std::time::{Duration, Instant};

use weighid_core::mocks::NoopScale;
use weighid_core::sampler::{Sample, Sampler};
use weighid_hardware::SimulatedScale;
use weighid_traits::clock::MonotonicClock;

#[test]
fn sampler_thread_exits_on_drop() {
    let clock = MonotonicClock::new();
    let sampler = Sampler::spawn(NoopScale, 10, Duration::from_millis(100), clock);
    std::thread::sleep(Duration::from_millis(50));
    drop(sampler);
}

#[test]
fn event_sampler_thread_exits_on_drop() {
    let clock = MonotonicClock::new();
    let sampler = Sampler::spawn_event(NoopScale, Duration::from_millis(100), clock);
    std::thread::sleep(Duration::from_millis(50));
    drop(sampler);
}

#[test]
fn multiple_samplers_dont_leak_threads() {
    let clock = MonotonicClock::new();
    for _ in 0..10 {
        let sampler = Sampler::spawn(NoopScale, 50, Duration::from_millis(20), clock);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(sampler.next(Duration::from_millis(1)), Sample::Pending);
        drop(sampler);
    }
}

#[test]
fn readings_arrive_in_order_then_close() {
    let clock = MonotonicClock::new();
    let scale = SimulatedScale::new([1.0, 2.0, 3.0]);
    let sampler = Sampler::spawn_event(scale, Duration::from_millis(10), clock);

    let mut got = Vec::new();
    loop {
        match sampler.next(Duration::from_millis(500)) {
            Sample::Value(v) => got.push(v),
            Sample::Closed => break,
            Sample::Pending => panic!("sampler stalled"),
        }
    }
    assert_eq!(got, vec![1.0, 2.0, 3.0]);
}

#[test]
fn full_channel_does_not_block_shutdown() {
    let clock = MonotonicClock::new();
    let scale = SimulatedScale::new([5.0]).looping(true);
    let sampler = Sampler::spawn_event(scale, Duration::from_millis(10), clock);
    // Nobody consumes: the channel fills up and the thread parks in send.
    std::thread::sleep(Duration::from_millis(50));

    let start = Instant::now();
    drop(sampler);
    assert!(
        start.elapsed() < Duration::from_millis(200),
        "shutdown took {:?}",
        start.elapsed()
    );
}

#[test]
fn stall_grows_without_readings() {
    let clock = MonotonicClock::new();
    let sampler = Sampler::spawn_event(NoopScale, Duration::from_millis(10), clock);
    std::thread::sleep(Duration::from_millis(60));
    assert!(sampler.stalled_for(&clock) >= 50);
}

#[test]
fn sampler_shutdown_is_prompt() {
    let clock = MonotonicClock::new();
    let sampler = Sampler::spawn(NoopScale, 10, Duration::from_millis(50), clock);
    std::thread::sleep(Duration::from_millis(100));

    let start = Instant::now();
    drop(sampler);
    // Worst case: one sleep period (100 ms at 10 Hz) plus join.
    assert!(
        start.elapsed() < Duration::from_millis(250),
        "shutdown took {:?}",
        start.elapsed()
    );
}

#[test]
fn stall_is_measured_on_the_given_clock() {
    use weighid_traits::clock::ManualClock;

    let clock = ManualClock::new();
    let sampler = Sampler::spawn_event(NoopScale, Duration::from_millis(10), clock.clone());
    std::thread::sleep(Duration::from_millis(20));
    clock.advance(Duration::from_secs(5));
    assert!(sampler.stalled_for(&clock) >= 5_000);
    drop(sampler);
}

#[test]
fn failing_event_reads_do_not_advance_a_manual_clock() {
    use weighid_traits::clock::ManualClock;

    let clock = ManualClock::new();
    let sampler = Sampler::spawn_event(NoopScale, Duration::from_millis(10), clock.clone());
    std::thread::sleep(Duration::from_millis(50));
    // Backoff between failed reads waits in real time.
    assert_eq!(clock.elapsed(), Duration::ZERO);
    assert_eq!(sampler.stalled_for(&clock), 0);

    let start = Instant::now();
    drop(sampler);
    assert!(
        start.elapsed() < Duration::from_millis(200),
        "shutdown took {:?}",
        start.elapsed()
    );
}
