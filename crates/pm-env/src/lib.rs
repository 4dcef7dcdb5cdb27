//! Host capability surface: resize, visibility, and frame scheduling.
//!
//! A real host (a windowing shell, a headless driver) implements these traits
//! against its own event loop; the simulated implementations here back the
//! unit tests and double as a headless host.

use pm_dom::NodeId;
use std::collections::VecDeque;

/// Viewport width change delivered by a [`ResizeNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub width: u32,
}

/// Visibility report for one observed node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub node: NodeId,
    /// Fraction of the node's area visible within the viewport, 0.0..=1.0.
    pub ratio: f64,
}

/// Delivers viewport width changes to the page runtime.
pub trait ResizeNotifier {
    /// Current viewport width in logical pixels.
    fn viewport_width(&self) -> u32;

    /// Next undelivered resize event, if any. Every resize is delivered;
    /// there is no debouncing.
    fn poll_resize(&mut self) -> Option<ResizeEvent>;
}

/// Observes element visibility and reports intersection ratios.
pub trait VisibilityWatcher {
    fn observe(&mut self, node: NodeId);
    fn unobserve(&mut self, node: NodeId);

    /// Drains undelivered intersection entries.
    fn poll_entries(&mut self) -> Vec<IntersectionEntry>;
}

/// Schedules work for the next display refresh.
///
/// Requests made before the next tick coalesce: one frame drives every
/// pending animation. This is cooperative yielding on the host's rendering
/// loop, not a timer.
pub trait FrameScheduler {
    fn request_frame(&mut self);

    /// Consumes the pending request, returning whether a frame was due.
    fn take_frame_request(&mut self) -> bool;
}

/// In-memory viewport with an explicit width, for tests and headless hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedViewport {
    width: u32,
    pending: VecDeque<ResizeEvent>,
}

impl SimulatedViewport {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            pending: VecDeque::new(),
        }
    }

    /// Applies a new width and queues a resize event, even when the width is
    /// unchanged (hosts fire resize per window event, not per delta).
    pub fn resize(&mut self, width: u32) {
        self.width = width;
        self.pending.push_back(ResizeEvent { width });
    }
}

impl ResizeNotifier for SimulatedViewport {
    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn poll_resize(&mut self) -> Option<ResizeEvent> {
        self.pending.pop_front()
    }
}

/// In-memory visibility watcher driven by explicit ratio updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedVisibility {
    observed: Vec<NodeId>,
    ratios: Vec<(NodeId, f64)>,
    pending: Vec<IntersectionEntry>,
}

impl SimulatedVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a node's visible fraction and, if the node is observed,
    /// queues an intersection entry for delivery.
    pub fn set_ratio(&mut self, node: NodeId, ratio: f64) {
        match self.ratios.iter_mut().find(|(id, _)| *id == node) {
            Some(entry) => entry.1 = ratio,
            None => self.ratios.push((node, ratio)),
        }

        if self.is_observing(node) {
            self.pending.push(IntersectionEntry { node, ratio });
        }
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

impl VisibilityWatcher for SimulatedVisibility {
    fn observe(&mut self, node: NodeId) {
        if self.is_observing(node) {
            return;
        }
        self.observed.push(node);

        // An initial entry is delivered for nodes whose position is already
        // known at observe time.
        if let Some((_, ratio)) = self.ratios.iter().find(|(id, _)| *id == node) {
            self.pending.push(IntersectionEntry {
                node,
                ratio: *ratio,
            });
        }
    }

    fn unobserve(&mut self, node: NodeId) {
        self.observed.retain(|id| *id != node);
        self.pending.retain(|entry| entry.node != node);
    }

    fn poll_entries(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.pending)
    }
}

/// Coalescing frame-request queue, usable by any single-threaded host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRequestQueue {
    pending: bool,
    requested_total: u64,
}

impl FrameRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a frame has been requested and not yet consumed.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total requests made, before coalescing. Useful for asserting that
    /// callers do not busy-schedule.
    pub fn requested_total(&self) -> u64 {
        self.requested_total
    }
}

impl FrameScheduler for FrameRequestQueue {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requested_total = self.requested_total.saturating_add(1);
    }

    fn take_frame_request(&mut self) -> bool {
        let due = self.pending;
        self.pending = false;
        due
    }
}
