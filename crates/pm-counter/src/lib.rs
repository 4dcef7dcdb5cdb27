//! Scroll-triggered counter animation.
//!
//! Each counter element carries a numeric `data-target` attribute and an
//! optional `data-format` tag. Once a counter becomes at least half visible
//! it animates from 0 to its target over a nominal duration, one increment
//! per display refresh, and settles on the exact formatted target.

use pm_core::PageError;
use pm_core::PageResult;
use pm_dom::Dom;
use pm_dom::NodeId;
use pm_dom::Selector;
use pm_env::FrameScheduler;
use pm_env::IntersectionEntry;
use pm_env::VisibilityWatcher;
use pm_format::FormatTag;

/// Attribute holding the numeric animation target.
pub const TARGET_ATTRIBUTE: &str = "data-target";

/// Attribute selecting the display suffix.
pub const FORMAT_ATTRIBUTE: &str = "data-format";

const DEFAULT_DURATION_MS: u32 = 2_000;
const DEFAULT_NOMINAL_TICK_MS: u32 = 10;
const DEFAULT_THRESHOLD: f64 = 0.5;

/// Animation pacing configuration.
///
/// The per-tick increment is `target / (duration_ms / nominal_tick_ms)`.
/// The tick cadence is nominal: real ticks run at the host's refresh rate
/// (commonly ~16.7 ms), so the real duration generally exceeds
/// `duration_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorConfig {
    pub duration_ms: u32,
    pub nominal_tick_ms: u32,
    /// Intersection ratio at or above which animation starts (inclusive).
    pub threshold: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            nominal_tick_ms: DEFAULT_NOMINAL_TICK_MS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AnimatorConfig {
    pub fn validate(&self) -> PageResult<()> {
        if self.duration_ms == 0 {
            return Err(PageError::new(
                "counter.duration_invalid",
                "animation duration_ms must be greater than zero",
            ));
        }

        if self.nominal_tick_ms == 0 {
            return Err(PageError::new(
                "counter.tick_invalid",
                "animation nominal_tick_ms must be greater than zero",
            ));
        }

        if self.nominal_tick_ms > self.duration_ms {
            return Err(PageError::new(
                "counter.tick_exceeds_duration",
                format!(
                    "nominal_tick_ms ({}) exceeds duration_ms ({})",
                    self.nominal_tick_ms, self.duration_ms
                ),
            ));
        }

        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(PageError::new(
                "counter.threshold_invalid",
                format!("threshold {} is outside (0.0, 1.0]", self.threshold),
            ));
        }

        Ok(())
    }

    fn step_for(&self, target: u64) -> f64 {
        let nominal_ticks = f64::from(self.duration_ms) / f64::from(self.nominal_tick_ms);
        target as f64 / nominal_ticks
    }
}

/// Per-counter lifecycle. Entering `Animating` happens at most once.
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Observed,
    Animating { current: f64 },
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
struct CounterState {
    node: NodeId,
    target: u64,
    format: FormatTag,
    phase: Phase,
}

/// Animates every counter element found under one selector.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAnimator {
    config: AnimatorConfig,
    counters: Vec<CounterState>,
}

impl CounterAnimator {
    /// Discovers counter elements. Elements whose target attribute is
    /// missing or does not parse are skipped; runtime failure is silent
    /// degradation, never an error.
    pub fn discover(dom: &Dom, selector: &Selector, config: AnimatorConfig) -> PageResult<Self> {
        config.validate()?;

        let mut counters = Vec::new();
        for node in dom.query_selector_all(selector) {
            let Some(element) = dom.get(node) else {
                continue;
            };

            let Some(target) = element
                .attribute(TARGET_ATTRIBUTE)
                .and_then(|value| value.trim().parse::<u64>().ok())
            else {
                continue;
            };

            counters.push(CounterState {
                node,
                target,
                format: FormatTag::from_attribute(element.attribute(FORMAT_ATTRIBUTE)),
                phase: Phase::Idle,
            });
        }

        Ok(Self { config, counters })
    }

    /// Registers every idle counter with the shared visibility watcher.
    pub fn register(&mut self, watcher: &mut dyn VisibilityWatcher) {
        for counter in &mut self.counters {
            if counter.phase == Phase::Idle {
                watcher.observe(counter.node);
                counter.phase = Phase::Observed;
            }
        }
    }

    /// Starts animating counters whose intersection ratio meets the
    /// threshold (inclusive). A triggered counter is unregistered from the
    /// watcher immediately, so later visibility changes cannot restart it.
    pub fn handle_entries(
        &mut self,
        entries: &[IntersectionEntry],
        watcher: &mut dyn VisibilityWatcher,
        frames: &mut dyn FrameScheduler,
    ) {
        let mut triggered = false;

        for entry in entries {
            if entry.ratio < self.config.threshold {
                continue;
            }

            let Some(counter) = self
                .counters
                .iter_mut()
                .find(|counter| counter.node == entry.node && counter.phase == Phase::Observed)
            else {
                continue;
            };

            watcher.unobserve(counter.node);
            counter.phase = Phase::Animating { current: 0.0 };
            triggered = true;
        }

        if triggered {
            frames.request_frame();
        }
    }

    /// Advances every animating counter by one tick and requests another
    /// frame while any counter is still running.
    ///
    /// Intermediate values are the running total rounded up; the final write
    /// is the exact target, so ceiling rounding never leaves an overshoot.
    pub fn handle_frame(&mut self, dom: &mut Dom, frames: &mut dyn FrameScheduler) {
        let mut still_running = false;

        for counter in &mut self.counters {
            let Phase::Animating { current } = &mut counter.phase else {
                continue;
            };

            *current += self.config.step_for(counter.target);

            if *current >= counter.target as f64 {
                write_text(dom, counter.node, counter.format.render(counter.target));
                counter.phase = Phase::Settled;
            } else {
                let shown = current.ceil() as u64;
                write_text(dom, counter.node, counter.format.render(shown));
                still_running = true;
            }
        }

        if still_running {
            frames.request_frame();
        }
    }

    /// Unregisters every counter still waiting on visibility.
    pub fn dispose(self, watcher: &mut dyn VisibilityWatcher) {
        for counter in &self.counters {
            if counter.phase == Phase::Observed {
                watcher.unobserve(counter.node);
            }
        }
    }

    pub fn counter_count(&self) -> usize {
        self.counters.len()
    }

    pub fn animating_count(&self) -> usize {
        self.counters
            .iter()
            .filter(|counter| matches!(counter.phase, Phase::Animating { .. }))
            .count()
    }

    pub fn settled_count(&self) -> usize {
        self.counters
            .iter()
            .filter(|counter| counter.phase == Phase::Settled)
            .count()
    }

    pub fn is_settled(&self, node: NodeId) -> bool {
        self.counters
            .iter()
            .any(|counter| counter.node == node && counter.phase == Phase::Settled)
    }
}

fn write_text(dom: &mut Dom, node: NodeId, text: String) {
    if let Some(element) = dom.get_mut(node) {
        element.set_text(text);
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimatorConfig, CounterAnimator, FORMAT_ATTRIBUTE, TARGET_ATTRIBUTE};
    use pm_dom::{Dom, Element, NodeId, Selector};
    use pm_env::{FrameRequestQueue, IntersectionEntry, SimulatedVisibility, VisibilityWatcher};

    const MAX_TEST_FRAMES: usize = 4_096;

    fn counter_selector() -> Selector {
        Selector::Class("counter-value".to_owned())
    }

    fn counter_element(target: &str, format: Option<&str>) -> Element {
        let element = Element::new("span")
            .with_class("counter-value")
            .with_text("0")
            .with_attribute(TARGET_ATTRIBUTE, target);
        match format {
            Some(tag) => element.with_attribute(FORMAT_ATTRIBUTE, tag),
            None => element,
        }
    }

    fn text_of(dom: &Dom, node: NodeId) -> String {
        dom.get(node)
            .map(|element| element.text().to_owned())
            .unwrap_or_default()
    }

    fn run_animation(
        animator: &mut CounterAnimator,
        dom: &mut Dom,
        frames: &mut FrameRequestQueue,
    ) -> usize {
        let mut ticks = 0_usize;
        while take_frame(frames) {
            animator.handle_frame(dom, frames);
            ticks += 1;
            assert!(ticks <= MAX_TEST_FRAMES, "animation never settled");
        }
        ticks
    }

    fn take_frame(frames: &mut FrameRequestQueue) -> bool {
        use pm_env::FrameScheduler;
        frames.take_frame_request()
    }

    #[test]
    fn discovery_skips_unparseable_targets() {
        let mut dom = Dom::new();
        dom.insert(counter_element("1500", None));
        dom.insert(counter_element("not-a-number", None));
        dom.insert(Element::new("span").with_class("counter-value"));

        let animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default());
        assert!(animator.is_ok_and(|animator| animator.counter_count() == 1));
    }

    #[test]
    fn config_validation_rejects_degenerate_pacing() {
        let zero_duration = AnimatorConfig {
            duration_ms: 0,
            ..AnimatorConfig::default()
        };
        assert!(zero_duration.validate().is_err());

        let zero_tick = AnimatorConfig {
            nominal_tick_ms: 0,
            ..AnimatorConfig::default()
        };
        assert!(zero_tick.validate().is_err());

        let tick_too_long = AnimatorConfig {
            duration_ms: 100,
            nominal_tick_ms: 200,
            ..AnimatorConfig::default()
        };
        assert!(tick_too_long.validate().is_err());

        let bad_threshold = AnimatorConfig {
            threshold: 1.5,
            ..AnimatorConfig::default()
        };
        assert!(bad_threshold.validate().is_err());

        assert!(AnimatorConfig::default().validate().is_ok());
    }

    #[test]
    fn half_visibility_triggers_and_unobserves() {
        let mut dom = Dom::new();
        let node = dom.insert(counter_element("1500", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        assert!(watcher.is_observing(node));

        watcher.set_ratio(node, 0.5);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);

        assert_eq!(animator.animating_count(), 1);
        assert!(!watcher.is_observing(node));
        assert!(frames.is_pending());
    }

    #[test]
    fn below_threshold_visibility_does_not_trigger() {
        let mut dom = Dom::new();
        let node = dom.insert(counter_element("1500", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(node, 0.49);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);

        assert_eq!(animator.animating_count(), 0);
        assert!(watcher.is_observing(node));
        assert!(!frames.is_pending());
    }

    #[test]
    fn plain_counter_settles_on_exact_grouped_target() {
        let mut dom = Dom::new();
        let node = dom.insert(counter_element("1500", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(node, 0.8);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);

        let ticks = run_animation(&mut animator, &mut dom, &mut frames);
        assert_eq!(ticks, 200);
        assert_eq!(text_of(&dom, node), "1.500");
        assert!(animator.is_settled(node));
    }

    #[test]
    fn km_counter_settles_with_unit_suffix() {
        let mut dom = Dom::new();
        let node = dom.insert(counter_element("250", Some("km")));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(node, 1.0);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);
        run_animation(&mut animator, &mut dom, &mut frames);

        assert_eq!(text_of(&dom, node), "250 km");
    }

    #[test]
    fn displayed_values_are_monotonic_and_bounded() {
        let mut dom = Dom::new();
        let node = dom.insert(counter_element("1500", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(node, 0.6);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);

        let mut previous = 0_u64;
        while take_frame(&mut frames) {
            animator.handle_frame(&mut dom, &mut frames);
            let digits: String = text_of(&dom, node)
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            let shown = digits.parse::<u64>().unwrap_or(0);
            assert!(shown >= previous);
            assert!(shown <= 1500);
            previous = shown;
        }
        assert_eq!(previous, 1500);
    }

    #[test]
    fn animation_runs_at_most_once_per_element() {
        let mut dom = Dom::new();
        let node = dom.insert(counter_element("7", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(node, 0.9);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);
        run_animation(&mut animator, &mut dom, &mut frames);
        assert!(animator.is_settled(node));

        // Leaving and re-entering the viewport produces no further entries
        // (the node is unobserved) and a synthetic entry is ignored.
        watcher.set_ratio(node, 0.0);
        watcher.set_ratio(node, 1.0);
        assert!(watcher.poll_entries().is_empty());

        animator.handle_entries(
            &[IntersectionEntry { node, ratio: 1.0 }],
            &mut watcher,
            &mut frames,
        );
        assert!(!frames.is_pending());
        assert_eq!(animator.settled_count(), 1);
        assert_eq!(text_of(&dom, node), "7");
    }

    #[test]
    fn counters_animate_independently() {
        let mut dom = Dom::new();
        let fast = dom.insert(counter_element("10", None));
        let slow = dom.insert(counter_element("100000", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(fast, 1.0);
        watcher.set_ratio(slow, 1.0);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);
        assert_eq!(animator.animating_count(), 2);

        // The nominal tick count is 200; float accumulation may need one
        // extra tick before the slower step crosses its target.
        let ticks = run_animation(&mut animator, &mut dom, &mut frames);
        assert!((200..=201).contains(&ticks));
        assert_eq!(text_of(&dom, fast), "10");
        assert_eq!(text_of(&dom, slow), "100.000");
    }

    #[test]
    fn dispose_releases_pending_observations() {
        let mut dom = Dom::new();
        let observed = dom.insert(counter_element("10", None));
        let triggered = dom.insert(counter_element("10", None));

        let mut animator =
            CounterAnimator::discover(&dom, &counter_selector(), AnimatorConfig::default())
                .unwrap_or_else(|_| unreachable!());
        let mut watcher = SimulatedVisibility::new();
        let mut frames = FrameRequestQueue::new();

        animator.register(&mut watcher);
        watcher.set_ratio(triggered, 1.0);
        let entries = watcher.poll_entries();
        animator.handle_entries(&entries, &mut watcher, &mut frames);

        animator.dispose(&mut watcher);
        assert!(!watcher.is_observing(observed));
        assert_eq!(watcher.observed_count(), 0);
    }
}
