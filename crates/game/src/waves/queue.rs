//! Spawn queue of the running wave.

use std::collections::VecDeque;

use super::config::{SpawnTiming, UnitConfig};

/// Slack applied when comparing due times against an accumulated clock.
const DUE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedSpawn {
    /// Pool slot reserved for this unit
    pub slot: usize,
    /// Wave clock value at which the unit activates
    pub due_at: f32,
    pub config: UnitConfig,
}

/// FIFO of pending activations. Due times never decrease front to back.
#[derive(Debug, Clone, Default)]
pub struct SpawnQueue {
    entries: VecDeque<QueuedSpawn>,
}

impl SpawnQueue {
    /// Builds the queue in file order; entry `i` is bound to slot `i`.
    pub fn build(units: Vec<UnitConfig>, timing: SpawnTiming) -> Self {
        let mut due_at = 0.0_f32;
        let entries = units
            .into_iter()
            .enumerate()
            .map(|(slot, config)| {
                let delay = config.spawn_delay.max(0.0);
                due_at = match timing {
                    SpawnTiming::Relative => due_at + delay,
                    SpawnTiming::FromWaveStart => due_at.max(delay),
                };
                QueuedSpawn {
                    slot,
                    due_at,
                    config,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pops every entry due at `clock`, in queue order.
    ///
    /// An entry counts as due up to `DUE_EPSILON` (0.1 ms) before its due time,
    /// so a clock summed from frame deltas still meets an exact delay.
    pub fn drain_due(&mut self, clock: f32) -> Vec<QueuedSpawn> {
        let mut due = Vec::new();
        while self
            .entries
            .front()
            .is_some_and(|e| e.due_at <= clock + DUE_EPSILON)
        {
            if let Some(entry) = self.entries.pop_front() {
                due.push(entry);
            }
        }
        due
    }

    /// Withdraws the pending entry of `slot`, if any.
    pub fn remove_slot(&mut self, slot: usize) -> Option<QueuedSpawn> {
        let index = self.entries.iter().position(|e| e.slot == slot)?;
        self.entries.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(delays: &[f32]) -> Vec<UnitConfig> {
        delays
            .iter()
            .enumerate()
            .map(|(i, d)| UnitConfig::new(format!("unit_{i}")).with_delay(*d))
            .collect()
    }

    fn due_times(queue: &SpawnQueue) -> Vec<f32> {
        queue.entries.iter().map(|e| e.due_at).collect()
    }

    #[test]
    fn test_relative_delays_are_summed() {
        let queue = SpawnQueue::build(wave(&[0.0, 2.0, 2.0, 0.5]), SpawnTiming::Relative);
        assert_eq!(due_times(&queue), vec![0.0, 2.0, 4.0, 4.5]);
    }

    #[test]
    fn test_from_wave_start_keeps_order() {
        let queue = SpawnQueue::build(wave(&[0.0, 2.0, 2.0, 1.0]), SpawnTiming::FromWaveStart);
        assert_eq!(due_times(&queue), vec![0.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_negative_delay_counts_as_zero() {
        let queue = SpawnQueue::build(wave(&[1.0, -3.0]), SpawnTiming::Relative);
        assert_eq!(due_times(&queue), vec![1.0, 1.0]);
    }

    #[test]
    fn test_drain_due_pops_all_due_in_order() {
        let mut queue = SpawnQueue::build(wave(&[0.0, 2.0, 2.0]), SpawnTiming::FromWaveStart);

        let slots = |v: Vec<QueuedSpawn>| v.into_iter().map(|e| e.slot).collect::<Vec<_>>();
        assert_eq!(slots(queue.drain_due(0.0)), vec![0]);
        assert!(queue.drain_due(1.0).is_empty());
        assert_eq!(slots(queue.drain_due(2.0)), vec![1, 2]);
        assert!(queue.is_empty());
        assert!(queue.drain_due(3.0).is_empty());
    }

    #[test]
    fn test_drain_tolerates_float_accumulation() {
        let mut queue = SpawnQueue::build(wave(&[0.3]), SpawnTiming::Relative);
        let clock = 0.1_f32 + 0.1 + 0.1;
        assert_eq!(queue.drain_due(clock).len(), 1);
    }

    #[test]
    fn test_remove_slot() {
        let mut queue = SpawnQueue::build(wave(&[0.0, 1.0, 2.0]), SpawnTiming::Relative);
        assert_eq!(queue.remove_slot(1).map(|e| e.config.prefab_id), Some("unit_1".to_string()));
        assert!(queue.remove_slot(1).is_none());
        assert_eq!(queue.len(), 2);

        let remaining: Vec<usize> = queue.drain_due(10.0).into_iter().map(|e| e.slot).collect();
        assert_eq!(remaining, vec![0, 2]);
    }
}
