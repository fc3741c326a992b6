//! Event types and sinks for observing placement passes.
//!
//! [`SpawnEvent`]s are emitted by [`crate::scatter::runner::PlacementEngine`] and the
//! free run functions. Sinks declare interest per [`SpawnEventKind`] through
//! [`EventSink::wants`], so per-candidate events cost nothing when nobody listens.
use glam::IVec2;

use crate::rules::SpawnType;
use crate::scatter::evaluator::Rejection;
use crate::scatter::runner::{RuleSummary, RunConfig, RunResult};
use crate::scatter::Placement;

/// Describes events emitted during a placement pass.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SpawnEvent {
    /// Emitted when a pass starts.
    RunStarted {
        /// The run configuration used.
        config: RunConfig,
        /// Number of rules in the rule set.
        rule_count: usize,
        /// Session seed of the pass.
        seed: u64,
    },

    /// Emitted when the entire pass finishes.
    RunFinished {
        /// Aggregated result for all rules.
        result: RunResult,
    },

    /// Emitted when a rule starts scanning.
    RuleStarted {
        /// Index of the rule in the rule set.
        index: usize,
        /// The rule name.
        name: String,
        spawn_type: SpawnType,
    },

    /// Emitted when a rule finished scanning.
    RuleFinished {
        /// Index of the rule in the rule set.
        index: usize,
        /// Counters for the rule.
        summary: RuleSummary,
    },

    /// Emitted for every candidate tile that was not placed.
    CandidateRejected {
        rule_index: usize,
        tile: IVec2,
        reason: Rejection,
    },

    /// Emitted for every placement, group members included.
    PlacementMade {
        rule_index: usize,
        placement: Placement,
    },

    /// Emitted after a cluster was committed.
    GroupSpawned {
        rule_index: usize,
        /// Cluster number within the rule.
        group_id: u32,
        /// Members including the anchor.
        size: u32,
    },

    /// Non-fatal warning generated during a pass.
    Warning {
        /// Context string (e.g. rule name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

impl SpawnEvent {
    pub fn kind(&self) -> SpawnEventKind {
        match self {
            SpawnEvent::RunStarted { .. } => SpawnEventKind::RunStarted,
            SpawnEvent::RunFinished { .. } => SpawnEventKind::RunFinished,
            SpawnEvent::RuleStarted { .. } => SpawnEventKind::RuleStarted,
            SpawnEvent::RuleFinished { .. } => SpawnEventKind::RuleFinished,
            SpawnEvent::CandidateRejected { .. } => SpawnEventKind::CandidateRejected,
            SpawnEvent::PlacementMade { .. } => SpawnEventKind::PlacementMade,
            SpawnEvent::GroupSpawned { .. } => SpawnEventKind::GroupSpawned,
            SpawnEvent::Warning { .. } => SpawnEventKind::Warning,
        }
    }
}

/// Discriminant of [`SpawnEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnEventKind {
    RunStarted,
    RunFinished,
    RuleStarted,
    RuleFinished,
    CandidateRejected,
    PlacementMade,
    GroupSpawned,
    Warning,
}

impl SpawnEventKind {
    pub const ALL: [SpawnEventKind; 8] = [
        SpawnEventKind::RunStarted,
        SpawnEventKind::RunFinished,
        SpawnEventKind::RuleStarted,
        SpawnEventKind::RuleFinished,
        SpawnEventKind::CandidateRejected,
        SpawnEventKind::PlacementMade,
        SpawnEventKind::GroupSpawned,
        SpawnEventKind::Warning,
    ];
}

/// A generic event sink that accepts [`SpawnEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SpawnEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: SpawnEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SpawnEvent) {}

    #[inline]
    fn wants(&self, _kind: SpawnEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(SpawnEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SpawnEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SpawnEvent),
{
    #[inline]
    fn send(&mut self, event: SpawnEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SpawnEvent>,
    only: Option<Vec<SpawnEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collects only the listed kinds.
    pub fn only(kinds: impl IntoIterator<Item = SpawnEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<SpawnEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SpawnEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SpawnEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: SpawnEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: SpawnEvent) {
        let kind = event.kind();
        let interested: Vec<usize> = (0..self.sinks.len())
            .filter(|i| self.sinks[*i].wants(kind))
            .collect();
        let Some((&last, rest)) = interested.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: SpawnEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

/// Buffers the events another sink wants, for replay after parallel work.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
pub(crate) struct BufferSink {
    wanted: [bool; SpawnEventKind::ALL.len()],
    events: Vec<SpawnEvent>,
}

#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
impl BufferSink {
    pub(crate) fn mirroring(target: &dyn EventSink) -> Self {
        let mut wanted = [false; SpawnEventKind::ALL.len()];
        for (slot, kind) in wanted.iter_mut().zip(SpawnEventKind::ALL) {
            *slot = target.wants(kind);
        }
        Self {
            wanted,
            events: Vec::new(),
        }
    }

    pub(crate) fn replay_into(self, target: &mut dyn EventSink) {
        for event in self.events {
            target.send(event);
        }
    }
}

impl EventSink for BufferSink {
    fn send(&mut self, event: SpawnEvent) {
        self.events.push(event);
    }

    fn wants(&self, kind: SpawnEventKind) -> bool {
        SpawnEventKind::ALL
            .iter()
            .position(|k| *k == kind)
            .is_some_and(|i| self.wanted[i])
    }
}
