//! Page runtime wiring the navbar toggler and counter animator.
//!
//! Initialization is explicit: selectors and capabilities in, a disposable
//! runtime handle out. The host pumps the runtime once per rendered frame;
//! nothing here installs global listeners.

use pm_core::PageResult;
use pm_counter::AnimatorConfig;
use pm_counter::CounterAnimator;
use pm_dom::Dom;
use pm_dom::Selector;
use pm_env::FrameScheduler;
use pm_env::IntersectionEntry;
use pm_env::ResizeEvent;
use pm_env::ResizeNotifier;
use pm_env::VisibilityWatcher;
use pm_navbar::MobileMarkerToggler;
use pm_navbar::NavbarToggler;

const DEFAULT_NAVBAR_SELECTOR: &str = ".navbar";
const DEFAULT_COUNTER_SELECTOR: &str = ".counter-value";

/// Selectors and pacing for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub navbar_selector: String,
    pub counter_selector: String,
    pub animator: AnimatorConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            navbar_selector: DEFAULT_NAVBAR_SELECTOR.to_owned(),
            counter_selector: DEFAULT_COUNTER_SELECTOR.to_owned(),
            animator: AnimatorConfig::default(),
        }
    }
}

/// Disposable handle over both page behaviors.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRuntime {
    toggler: NavbarToggler,
    marker: MobileMarkerToggler,
    animator: CounterAnimator,
}

impl PageRuntime {
    /// Parses selectors, validates pacing, attaches both navbar paths,
    /// applies the full toggler once with the current viewport width, and
    /// registers every discovered counter with the visibility watcher.
    ///
    /// A missing navbar or an empty counter set is not an error; runtime
    /// behavior degrades silently per element.
    pub fn initialize(
        dom: &mut Dom,
        config: &PageConfig,
        notifier: &dyn ResizeNotifier,
        watcher: &mut dyn VisibilityWatcher,
    ) -> PageResult<Self> {
        let navbar_selector = Selector::parse(&config.navbar_selector)?;
        let counter_selector = Selector::parse(&config.counter_selector)?;

        let toggler = NavbarToggler::attach(dom, &navbar_selector);
        let marker = MobileMarkerToggler::attach(dom, &navbar_selector);
        toggler.apply(dom, notifier.viewport_width());

        let mut animator =
            CounterAnimator::discover(dom, &counter_selector, config.animator.clone())?;
        animator.register(watcher);

        Ok(Self {
            toggler,
            marker,
            animator,
        })
    }

    /// Reclassifies the navbar through both coexisting paths. No debouncing;
    /// every event is applied synchronously.
    pub fn handle_resize(&mut self, dom: &mut Dom, event: ResizeEvent) {
        self.toggler.apply(dom, event.width);
        self.marker.apply(dom, event.width);
    }

    pub fn handle_intersections(
        &mut self,
        entries: &[IntersectionEntry],
        watcher: &mut dyn VisibilityWatcher,
        frames: &mut dyn FrameScheduler,
    ) {
        self.animator.handle_entries(entries, watcher, frames);
    }

    pub fn handle_frame(&mut self, dom: &mut Dom, frames: &mut dyn FrameScheduler) {
        self.animator.handle_frame(dom, frames);
    }

    /// One host-frame step: drain resize events, deliver intersection
    /// entries, and run a single animation tick if one was scheduled.
    pub fn pump(
        &mut self,
        dom: &mut Dom,
        notifier: &mut dyn ResizeNotifier,
        watcher: &mut dyn VisibilityWatcher,
        frames: &mut dyn FrameScheduler,
    ) {
        while let Some(event) = notifier.poll_resize() {
            self.handle_resize(dom, event);
        }

        let entries = watcher.poll_entries();
        if !entries.is_empty() {
            self.handle_intersections(&entries, watcher, frames);
        }

        if frames.take_frame_request() {
            self.handle_frame(dom, frames);
        }
    }

    /// Releases watcher registrations for counters that never triggered.
    pub fn dispose(self, watcher: &mut dyn VisibilityWatcher) {
        self.animator.dispose(watcher);
    }

    pub fn animator(&self) -> &CounterAnimator {
        &self.animator
    }
}
