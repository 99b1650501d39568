//! Channel Handoffs
//!
//! Message-passing companions to the counter experiment: the same worker
//! machinery, but communicating results over channels instead of mutating
//! shared state.
//!
//! - [`relay_value`]: a spawned worker produces one value and hands it over a
//!   rendezvous (zero-capacity) channel; the caller blocks until it arrives.
//! - [`first_to_finish`]: several labeled workers run jittered loops and send
//!   their label when done; the caller takes the first arrival as the winner.
//!
//! Both are library-and-test surfaces; the CLI's stdout is reserved for the
//! counter reports.

use crossbeam_channel::bounded;
use std::io;
use std::thread;
use std::time::Duration;

use crate::rng::XorShift64;

/// Produce one value on a spawned worker and hand it to the caller through a
/// rendezvous channel.
///
/// The zero-capacity channel makes this a true handoff: the worker's send
/// blocks until the caller is at the receive. Returns `Err` only if the
/// worker thread fails to spawn.
pub fn relay_value<T, F>(produce: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = bounded(0);
    let handle = thread::Builder::new()
        .name("handoff".to_string())
        .spawn(move || {
            // Receiver outlives the send; an error here means the caller was
            // dropped mid-handoff, which join() below would surface anyway.
            let _ = sender.send(produce());
        })?;

    let value = receiver.recv().expect("handoff worker dropped its sender");
    handle.join().expect("handoff worker panicked");
    Ok(value)
}

/// Race `labels.len()` workers and return the label of the first to finish.
///
/// Each worker runs `laps` rounds of a seeded-jitter sleep (up to
/// `max_lap_micros` per lap), then sends its label. Per-worker RNG streams
/// are forked from `seed`, so the race is reproducible modulo OS sleep
/// precision — which worker wins is still a scheduling outcome, not part of
/// any contract.
///
/// The channel holds one slot per worker, so losers' sends never block and
/// every worker is joined before returning.
pub fn first_to_finish(
    labels: &[&'static str],
    laps: u32,
    max_lap_micros: u64,
    seed: u64,
) -> io::Result<&'static str> {
    assert!(!labels.is_empty(), "a race needs at least one runner");

    let (sender, receiver) = bounded(labels.len());
    let mut handles = Vec::with_capacity(labels.len());

    for (lane, &label) in labels.iter().enumerate() {
        let sender = sender.clone();
        let mut rng = XorShift64::new(seed ^ (lane as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15));
        let handle = thread::Builder::new()
            .name(format!("racer-{lane}"))
            .spawn(move || {
                for _ in 0..laps {
                    if max_lap_micros > 0 {
                        thread::sleep(Duration::from_micros(rng.next_below(max_lap_micros)));
                    }
                }
                let _ = sender.send(label);
            })?;
        handles.push(handle);
    }
    drop(sender);

    let winner = receiver.recv().expect("no racer finished");
    for handle in handles {
        handle.join().expect("racer panicked");
    }
    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_hands_over_the_produced_value() {
        let value = relay_value(|| 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn relay_moves_owned_values() {
        let value = relay_value(|| String::from("payload")).unwrap();
        assert_eq!(value, "payload");
    }

    #[test]
    fn race_returns_one_of_the_runners() {
        let labels = ["tortoise", "hare", "hound"];
        let winner = first_to_finish(&labels, 3, 50, 42).unwrap();
        assert!(labels.contains(&winner));
    }

    #[test]
    fn single_runner_always_wins() {
        let winner = first_to_finish(&["solo"], 1, 0, 0).unwrap();
        assert_eq!(winner, "solo");
    }
}
