use schema::{Actor, StatusKind};
use serde::{Deserialize, Serialize};

/// A timed effect attached to one combatant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    pub stacks: u32,
    /// Remaining status pulses.
    pub duration: u32,
    /// Per-stack pulse damage, already scaled by the applier's power multiplier.
    pub power: i32,
    /// Highest unscaled power applied so far.
    pub base_power: i32,
    pub source: Actor,
    pulse_meter: u32,
}

impl ActiveStatus {
    pub fn pulse_damage(&self) -> i32 {
        if self.kind.is_damage_over_time() {
            self.power.max(0) * self.stacks as i32
        } else {
            0
        }
    }
}

/// Result of merging an application into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub stacks: u32,
    pub duration: u32,
}

/// Ordered collection of statuses, one entry per kind, in first-application order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    entries: Vec<ActiveStatus>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds stacks up to the kind's cap, keeps the longer duration and the higher power.
    pub fn apply(
        &mut self,
        kind: StatusKind,
        stacks: u32,
        duration: u32,
        base_power: i32,
        power: i32,
        source: Actor,
    ) -> Applied {
        let cap = kind.stack_cap();
        let stacks = stacks.max(1);
        let duration = duration.max(1);

        if let Some(existing) = self.get_mut(kind) {
            existing.stacks = (existing.stacks + stacks).min(cap);
            existing.duration = existing.duration.max(duration);
            existing.power = existing.power.max(power);
            existing.base_power = existing.base_power.max(base_power);
            existing.source = source;
            return Applied {
                stacks: existing.stacks,
                duration: existing.duration,
            };
        }

        let status = ActiveStatus {
            kind,
            stacks: stacks.min(cap),
            duration,
            power,
            base_power,
            source,
            pulse_meter: 0,
        };
        let applied = Applied {
            stacks: status.stacks,
            duration: status.duration,
        };
        self.entries.push(status);
        applied
    }

    /// Raises the power of an existing status to `base_power * mul_pct / 100`.
    pub fn scale_power(&mut self, kind: StatusKind, mul_pct: u32) -> bool {
        match self.get_mut(kind) {
            Some(status) => {
                let scaled = status.base_power * mul_pct as i32 / 100;
                status.power = status.power.max(scaled);
                true
            }
            None => false,
        }
    }

    /// Advances the pulse meter of one status; true when it pulses this tick.
    pub fn advance_pulse(&mut self, kind: StatusKind, pulse_ticks: u32) -> bool {
        match self.get_mut(kind) {
            Some(status) => {
                status.pulse_meter += 1;
                if status.pulse_meter >= pulse_ticks {
                    status.pulse_meter = 0;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Decrements the remaining duration, removing the status at zero.
    /// Returns true when the status expired.
    pub fn decrement(&mut self, kind: StatusKind) -> bool {
        let Some(position) = self.entries.iter().position(|s| s.kind == kind) else {
            return false;
        };
        let status = &mut self.entries[position];
        status.duration = status.duration.saturating_sub(1);
        if status.duration == 0 {
            self.entries.remove(position);
            true
        } else {
            false
        }
    }

    pub fn get(&self, kind: StatusKind) -> Option<&ActiveStatus> {
        self.entries.iter().find(|s| s.kind == kind)
    }

    pub fn get_mut(&mut self, kind: StatusKind) -> Option<&mut ActiveStatus> {
        self.entries.iter_mut().find(|s| s.kind == kind)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn stacks_of(&self, kind: StatusKind) -> u32 {
        self.get(kind).map(|s| s.stacks).unwrap_or(0)
    }

    /// Kinds currently present, in application order.
    pub fn kinds(&self) -> Vec<StatusKind> {
        self.entries.iter().map(|s| s.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveStatus> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
