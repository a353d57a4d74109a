//! Wave lifecycle manager.
//!
//! Drives one wave at a time through
//! `Allocating → BuildingQueue → WaveRunning → Deallocating`, one evaluation
//! per [`WaveLifecycleManager::tick`]. Pool allocation and release are spread
//! over ticks in chunks of `batch_size` so a large wave never costs more than
//! one batch of unit creation in a single frame.
//!
//! The manager is engine agnostic: units are created through a
//! [`UnitFactory`] and wave contents come from a [`WaveConfigLoader`].

use std::mem;

use tracing::{debug, error, info, warn};

use super::config::{UnitConfig, WaveManagerConfig};
use super::error::WaveError;
use super::loader::WaveConfigLoader;
use super::pool::{BatchCursor, SlotStatus, UnitPool};
use super::queue::{QueuedSpawn, SpawnQueue};
use super::state::WaveState;

/// Collaborator that owns the actual unit instances.
pub trait UnitFactory {
    type Handle;

    /// Creates an inactive unit for `slot`.
    fn create(&mut self, slot: usize) -> Self::Handle;

    /// Brings a pooled unit into play with `config`.
    fn activate(&mut self, handle: &Self::Handle, slot: usize, config: &UnitConfig);

    /// Takes a unit out of play without destroying it.
    fn deactivate(&mut self, handle: &Self::Handle, slot: usize);

    fn destroy(&mut self, handle: Self::Handle, slot: usize);
}

#[derive(Debug)]
pub struct WaveLifecycleManager<H> {
    config: WaveManagerConfig,
    state: WaveState,
    pool: UnitPool<H>,
    queue: SpawnQueue,

    // === Batch progress ===
    /// Set while an allocation or release batch sequence is in flight
    busy: bool,
    cursor: BatchCursor,
    release_order: Vec<usize>,

    // === Wave tracking ===
    /// Definition resolved on Allocating entry, consumed by BuildingQueue
    staged: Vec<UnitConfig>,
    current_wave: Option<String>,
    last_wave: Option<String>,
    wave_number: u32,
    waves_completed: u32,
    wave_clock: f32,
    enemies_remaining: u32,
    death_inbox: Vec<usize>,

    error: Option<WaveError>,
}

impl<H> WaveLifecycleManager<H> {
    pub fn new(config: WaveManagerConfig) -> Result<Self, WaveError> {
        config.validate()?;
        Ok(Self {
            pool: UnitPool::with_capacity(config.pool_capacity),
            config,
            state: WaveState::Allocating,
            queue: SpawnQueue::default(),
            busy: false,
            cursor: BatchCursor::default(),
            release_order: Vec::new(),
            staged: Vec::new(),
            current_wave: None,
            last_wave: None,
            wave_number: 0,
            waves_completed: 0,
            wave_clock: 0.0,
            enemies_remaining: 0,
            death_inbox: Vec::new(),
            error: None,
        })
    }

    pub fn config(&self) -> &WaveManagerConfig {
        &self.config
    }

    pub fn state(&self) -> WaveState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pool(&self) -> &UnitPool<H> {
        &self.pool
    }

    /// Units of the current wave not yet confirmed gone, spawned or not.
    pub fn enemies_remaining(&self) -> u32 {
        self.enemies_remaining
    }

    pub fn current_wave(&self) -> Option<&str> {
        self.current_wave.as_deref()
    }

    /// 1-indexed number of the wave in progress, 0 before the first one.
    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn waves_completed(&self) -> u32 {
        self.waves_completed
    }

    /// Seconds of running (unpaused) time since the wave started.
    pub fn wave_clock(&self) -> f32 {
        self.wave_clock
    }

    pub fn pending_spawns(&self) -> usize {
        self.queue.len()
    }

    pub fn live_units(&self) -> usize {
        self.pool.live()
    }

    pub fn error(&self) -> Option<&WaveError> {
        self.error.as_ref()
    }

    /// Death notification from combat resolution, applied on the next running tick.
    pub fn notify_unit_death(&mut self, slot: usize) {
        self.death_inbox.push(slot);
    }

    /// Forces a state transition.
    ///
    /// Refused while a batch is in flight, for `Paused` outside `WaveRunning`,
    /// for leaving `Paused` other than back to `WaveRunning`, for
    /// `BuildingQueue` or `WaveRunning` before any wave was resolved, and for
    /// `Allocating` while slots are still populated.
    pub fn set_state(&mut self, new_state: WaveState) -> Result<(), WaveError> {
        let from = self.state;
        if new_state == from {
            return Ok(());
        }
        if self.busy {
            return Err(WaveError::BatchInFlight(from));
        }

        let invalid = WaveError::InvalidTransition {
            from,
            to: new_state,
        };
        match (from, new_state) {
            (WaveState::WaveRunning, WaveState::Paused) => {}
            (WaveState::Paused, WaveState::WaveRunning) => {}
            (WaveState::Paused, _) | (_, WaveState::Paused) => return Err(invalid),
            (_, WaveState::BuildingQueue | WaveState::WaveRunning)
                if self.current_wave.is_none() =>
            {
                return Err(invalid)
            }
            (_, WaveState::Allocating) if !self.pool.is_empty() => return Err(invalid),
            _ => {}
        }

        if new_state == WaveState::Allocating {
            self.error = None;
        }

        info!("wave{{state={:?}->{:?} forced}}", from, new_state);
        self.state = new_state;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), WaveError> {
        self.set_state(WaveState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), WaveError> {
        if self.state != WaveState::Paused {
            return Err(WaveError::InvalidTransition {
                from: self.state,
                to: WaveState::WaveRunning,
            });
        }
        self.set_state(WaveState::WaveRunning)
    }

    /// Binds an allocated slot to a live unit.
    ///
    /// A slot still waiting in the spawn queue leaves the queue. Any other
    /// slot joins the wave and counts as one more enemy.
    pub fn register_unit(&mut self, config: UnitConfig, slot: usize) -> Result<(), WaveError> {
        self.ensure_wave_active()?;
        self.pool.bind(slot, config)?;

        if self.queue.remove_slot(slot).is_none() {
            self.enemies_remaining += 1;
        }
        debug!(
            "wave{{register slot={} remaining={}}}",
            slot, self.enemies_remaining
        );
        Ok(())
    }

    /// Unbinds a slot, returning it to the pooled state.
    ///
    /// A live or still queued unit leaving this way counts as gone. Returns
    /// whether the enemy count changed.
    pub fn unregister_unit(&mut self, slot: usize) -> Result<bool, WaveError> {
        self.ensure_wave_active()?;
        let (_, was_live) = self.pool.release(slot)?;

        let counted = was_live || self.queue.remove_slot(slot).is_some();
        if counted {
            self.enemies_remaining = self.enemies_remaining.saturating_sub(1);
        }
        debug!(
            "wave{{unregister slot={} remaining={}}}",
            slot, self.enemies_remaining
        );
        Ok(counted)
    }

    /// One scheduler evaluation. Returns the state after the tick.
    pub fn tick<F>(&mut self, dt: f32, loader: &dyn WaveConfigLoader, factory: &mut F) -> WaveState
    where
        F: UnitFactory<Handle = H>,
    {
        match self.state {
            WaveState::Allocating => self.tick_allocating(loader, factory),
            WaveState::BuildingQueue => self.tick_building_queue(),
            WaveState::WaveRunning => self.tick_running(dt, factory),
            WaveState::Deallocating => self.tick_deallocating(factory),
            WaveState::Paused | WaveState::Finished | WaveState::Failed => {}
        }
        self.state
    }

    fn tick_allocating<F>(&mut self, loader: &dyn WaveConfigLoader, factory: &mut F)
    where
        F: UnitFactory<Handle = H>,
    {
        if !self.busy && !self.begin_allocating(loader) {
            return;
        }

        // Nothing to allocate: the queue is built in the same tick.
        if self.cursor.is_done() {
            self.busy = false;
            self.state = WaveState::BuildingQueue;
            self.tick_building_queue();
            return;
        }

        let batch = self.cursor.step(self.config.batch_size);
        let batch_len = batch.len();
        for slot in batch {
            if !self.pool.is_vacant(slot) {
                self.fail(WaveError::SlotOccupied(slot));
                return;
            }
            let handle = factory.create(slot);
            if let Err(e) = self.pool.insert(slot, handle) {
                self.fail(e);
                return;
            }
        }

        debug!(
            "wave{{alloc batch={} remaining={}}}",
            batch_len,
            self.cursor.remaining()
        );

        if self.cursor.is_done() {
            self.busy = false;
            self.state = WaveState::BuildingQueue;
            info!(
                "wave{{state=BuildingQueue wave={} allocated={}}}",
                self.current_wave.as_deref().unwrap_or("-"),
                self.pool.allocated()
            );
        }
    }

    /// Allocating entry action. Returns false when the manager settled elsewhere.
    fn begin_allocating(&mut self, loader: &dyn WaveConfigLoader) -> bool {
        let map = self.config.map_name.clone();
        let Some(wave) = loader.find_next_wave(&map, self.last_wave.as_deref()) else {
            self.state = WaveState::Finished;
            info!(
                "wave{{state=Finished map={} completed={}}}",
                map, self.waves_completed
            );
            return false;
        };

        let units = match loader.load_wave(&map, &wave) {
            Ok(units) => units,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };

        if units.len() > self.pool.capacity() {
            self.fail(WaveError::CapacityExceeded {
                wave,
                requested: units.len(),
                capacity: self.pool.capacity(),
            });
            return false;
        }

        self.wave_number += 1;
        self.cursor = BatchCursor::new(units.len());
        info!(
            "wave{{state=Allocating wave={} number={} units={} batches={}}}",
            wave,
            self.wave_number,
            units.len(),
            self.config.batches_for(units.len())
        );
        self.staged = units;
        self.current_wave = Some(wave);
        self.busy = true;
        true
    }

    fn tick_building_queue(&mut self) {
        let units = mem::take(&mut self.staged);
        if units.len() > self.pool.allocated() {
            self.fail(WaveError::CapacityExceeded {
                wave: self.current_wave.clone().unwrap_or_default(),
                requested: units.len(),
                capacity: self.pool.allocated(),
            });
            return;
        }

        self.queue = SpawnQueue::build(units, self.config.spawn_timing);
        self.enemies_remaining = self.queue.len() as u32;
        self.wave_clock = 0.0;
        self.death_inbox.clear();
        self.state = WaveState::WaveRunning;

        info!(
            "wave{{state=WaveRunning wave={} queued={}}}",
            self.current_wave.as_deref().unwrap_or("-"),
            self.queue.len()
        );
    }

    fn tick_running<F>(&mut self, dt: f32, factory: &mut F)
    where
        F: UnitFactory<Handle = H>,
    {
        for slot in mem::take(&mut self.death_inbox) {
            match self.pool.mark_dead(slot) {
                Some(handle) => {
                    factory.deactivate(handle, slot);
                    self.enemies_remaining = self.enemies_remaining.saturating_sub(1);
                    debug!(
                        "wave{{death slot={} remaining={}}}",
                        slot, self.enemies_remaining
                    );
                }
                None => warn!("wave{{death slot={} ignored, not live}}", slot),
            }
        }

        for QueuedSpawn { slot, config, .. } in self.queue.drain_due(self.wave_clock) {
            match self.pool.bind(slot, config.clone()) {
                Ok(handle) => factory.activate(handle, slot, &config),
                Err(e) => {
                    self.fail(e);
                    return;
                }
            }
        }

        self.wave_clock += dt.max(0.0);

        if self.enemies_remaining == 0 && self.queue.is_empty() {
            self.waves_completed += 1;
            self.state = WaveState::Deallocating;
            info!(
                "wave{{state=Deallocating wave={} cleared_at={:.2}}}",
                self.current_wave.as_deref().unwrap_or("-"),
                self.wave_clock
            );
        }
    }

    fn tick_deallocating<F>(&mut self, factory: &mut F)
    where
        F: UnitFactory<Handle = H>,
    {
        if !self.busy {
            self.release_order = self.pool.populated_slots();
            self.cursor = BatchCursor::new(self.release_order.len());
            self.queue.clear();
            self.death_inbox.clear();
            self.busy = true;
        }

        let batch = self.cursor.step(self.config.batch_size);
        let batch_len = batch.len();
        for index in batch {
            let slot = self.release_order[index];
            if let Some(entry) = self.pool.take(slot) {
                if matches!(entry.status, SlotStatus::Live(_)) {
                    factory.deactivate(&entry.handle, slot);
                }
                factory.destroy(entry.handle, slot);
            }
        }

        debug!(
            "wave{{dealloc batch={} remaining={}}}",
            batch_len,
            self.cursor.remaining()
        );

        if self.cursor.is_done() {
            self.busy = false;
            self.release_order.clear();
            self.enemies_remaining = 0;
            self.last_wave = self.current_wave.take();
            self.state = WaveState::Allocating;
            info!(
                "wave{{state=Allocating previous={}}}",
                self.last_wave.as_deref().unwrap_or("-")
            );
        }
    }

    fn ensure_wave_active(&self) -> Result<(), WaveError> {
        match self.state {
            WaveState::WaveRunning | WaveState::Paused => Ok(()),
            other => Err(WaveError::WaveNotRunning(other)),
        }
    }

    fn fail(&mut self, e: WaveError) {
        error!("wave{{state=Failed error=\"{}\"}}", e);
        self.busy = false;
        self.state = WaveState::Failed;
        self.error = Some(e);
    }
}
