//! Demo host: a fake page with a responsive navbar and scroll counters.
//!
//! The window is the viewport. Resizing it below the breakpoint flips the
//! navbar into its mobile class set; scrolling the counter row into view
//! triggers the one-shot count-up animations. The egui shell implements the
//! `pm-env` capability traits against real window geometry and pumps the
//! page runtime once per rendered frame.

use eframe::egui;
use pm_counter::FORMAT_ATTRIBUTE;
use pm_counter::TARGET_ATTRIBUTE;
use pm_dom::Dom;
use pm_dom::Element;
use pm_dom::NodeId;
use pm_env::FrameRequestQueue;
use pm_env::IntersectionEntry;
use pm_env::ResizeEvent;
use pm_env::ResizeNotifier;
use pm_env::VisibilityWatcher;
use pm_navbar::MOBILE_BREAKPOINT_PX;
use pm_page::PageConfig;
use pm_page::PageRuntime;
use std::collections::VecDeque;

const HERO_HEIGHT: f32 = 1100.0;
const VISIBILITY_THRESHOLD: f64 = 0.5;
const NAV_LINKS: [&str; 4] = ["Home", "Collections", "Search", "About"];

fn main() -> Result<(), eframe::Error> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Pagemotion Demo")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pagemotion Demo",
        native_options,
        Box::new(|_cc| Ok(Box::new(DemoApp::default()))),
    )
}

/// Resize notifier backed by the egui window rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WindowViewport {
    width: u32,
    pending: VecDeque<ResizeEvent>,
}

impl WindowViewport {
    fn new(width: u32) -> Self {
        Self {
            width,
            pending: VecDeque::new(),
        }
    }

    /// Called once per frame with the current window width; queues a resize
    /// event whenever the width changed since the last frame.
    fn sync(&mut self, width: u32) {
        if width == self.width {
            return;
        }
        self.width = width;
        self.pending.push_back(ResizeEvent { width });
    }
}

impl ResizeNotifier for WindowViewport {
    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn poll_resize(&mut self) -> Option<ResizeEvent> {
        self.pending.pop_front()
    }
}

/// Visibility watcher fed by per-frame widget rectangles.
///
/// Entries are queued on threshold crossings (and on the first report for a
/// node), not on every frame, matching intersection-observer delivery.
#[derive(Debug, Clone, Default, PartialEq)]
struct ScrollVisibility {
    observed: Vec<NodeId>,
    last_above: Vec<(NodeId, bool)>,
    pending: Vec<IntersectionEntry>,
}

impl ScrollVisibility {
    fn report_ratio(&mut self, node: NodeId, ratio: f64) {
        if !self.observed.contains(&node) {
            return;
        }

        let above = ratio >= VISIBILITY_THRESHOLD;
        match self
            .last_above
            .iter_mut()
            .find(|(existing, _)| *existing == node)
        {
            Some(entry) => {
                if entry.1 == above {
                    return;
                }
                entry.1 = above;
            }
            None => self.last_above.push((node, above)),
        }

        self.pending.push(IntersectionEntry { node, ratio });
    }
}

impl VisibilityWatcher for ScrollVisibility {
    fn observe(&mut self, node: NodeId) {
        if !self.observed.contains(&node) {
            self.observed.push(node);
        }
    }

    fn unobserve(&mut self, node: NodeId) {
        self.observed.retain(|id| *id != node);
        self.last_above.retain(|(id, _)| *id != node);
        self.pending.retain(|entry| entry.node != node);
    }

    fn poll_entries(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CounterCard {
    node: NodeId,
    label: &'static str,
}

struct DemoApp {
    dom: Dom,
    navbar: NodeId,
    counters: Vec<CounterCard>,
    runtime: Option<PageRuntime>,
    init_error: Option<String>,
    viewport: Option<WindowViewport>,
    visibility: ScrollVisibility,
    frames: FrameRequestQueue,
}

impl Default for DemoApp {
    fn default() -> Self {
        let (dom, navbar, counters) = build_demo_page();

        Self {
            dom,
            navbar,
            counters,
            runtime: None,
            init_error: None,
            viewport: None,
            visibility: ScrollVisibility::default(),
            frames: FrameRequestQueue::new(),
        }
    }
}

fn build_demo_page() -> (Dom, NodeId, Vec<CounterCard>) {
    let mut dom = Dom::new();
    let navbar = dom.insert(Element::new("nav").with_class("navbar"));
    dom.insert(Element::new("section").with_id("hero").with_class("hero-title"));

    let cards: [(&str, &str, Option<&str>); 4] = [
        ("Publications", "1500", None),
        ("Coverage", "250", Some("km")),
        ("Documents", "12840", None),
        ("Municipalities", "78", None),
    ];

    let mut counters = Vec::with_capacity(cards.len());
    for (label, target, format) in cards {
        let mut element = Element::new("span")
            .with_class("counter-value")
            .with_attribute(TARGET_ATTRIBUTE, target)
            .with_text("0");
        if let Some(tag) = format {
            element = element.with_attribute(FORMAT_ATTRIBUTE, tag);
        }
        counters.push(CounterCard {
            node: dom.insert(element),
            label,
        });
    }

    (dom, navbar, counters)
}

impl DemoApp {
    fn ensure_runtime(&mut self, width: u32) {
        if self.runtime.is_some() || self.init_error.is_some() {
            return;
        }

        let viewport = WindowViewport::new(width);
        match PageRuntime::initialize(
            &mut self.dom,
            &PageConfig::default(),
            &viewport,
            &mut self.visibility,
        ) {
            Ok(runtime) => {
                self.runtime = Some(runtime);
                self.viewport = Some(viewport);
            }
            Err(error) => self.init_error = Some(error.to_string()),
        }
    }

    fn navbar_is_mobile(&self) -> bool {
        self.dom
            .get(self.navbar)
            .is_some_and(|navbar| navbar.has_class("navbar-mobile"))
    }

    fn navbar_class_line(&self) -> String {
        self.dom
            .get(self.navbar)
            .map(|navbar| navbar.classes().join(" "))
            .unwrap_or_default()
    }

    fn render_navbar(&self, ui: &mut egui::Ui) {
        let mobile = self.navbar_is_mobile();

        if mobile {
            ui.horizontal(|ui| {
                ui.heading("Pagemotion");
                ui.label(egui::RichText::new("≡").size(22.0));
            });
            for link in NAV_LINKS {
                ui.label(link);
            }
        } else {
            ui.horizontal(|ui| {
                ui.heading("Pagemotion");
                ui.separator();
                for link in NAV_LINKS {
                    ui.label(link);
                }
            });
        }

        ui.label(
            egui::RichText::new(format!("class=\"{}\"", self.navbar_class_line()))
                .monospace()
                .size(11.0)
                .color(egui::Color32::from_rgb(140, 140, 140)),
        );
    }

    fn render_page(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("demo_page_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(24.0);
                ui.heading("Public Records Repository");
                ui.label(format!(
                    "Resize the window below {MOBILE_BREAKPOINT_PX} px to flip the navbar; \
                     scroll down until the counters are at least half visible."
                ));
                ui.allocate_space(egui::vec2(ui.available_width(), HERO_HEIGHT));

                ui.heading("In numbers");
                ui.add_space(8.0);
                ui.horizontal_wrapped(|ui| {
                    for card in &self.counters {
                        let value = self
                            .dom
                            .get(card.node)
                            .map(|element| element.text().to_owned())
                            .unwrap_or_default();

                        let response = ui.group(|ui| {
                            ui.set_min_width(180.0);
                            ui.vertical(|ui| {
                                ui.label(card.label);
                                ui.heading(egui::RichText::new(value).size(28.0));
                            });
                        });

                        let rect = response.response.rect;
                        let ratio = visible_fraction(rect, ui.clip_rect());
                        self.visibility.report_ratio(card.node, ratio);
                    }
                });
                ui.add_space(240.0);
            });
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let width = ctx.input(|input| input.screen_rect()).width().round() as u32;
        self.ensure_runtime(width);
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.sync(width);
        }

        egui::TopBottomPanel::top("navbar_panel").show(ctx, |ui| {
            self.render_navbar(ui);
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(format!("Viewport: {width} px"));
                ui.separator();
                ui.label(if width < MOBILE_BREAKPOINT_PX {
                    "Layout: mobile"
                } else {
                    "Layout: desktop"
                });
                if let Some(runtime) = &self.runtime {
                    ui.separator();
                    ui.label(format!(
                        "Counters settled: {}/{}",
                        runtime.animator().settled_count(),
                        runtime.animator().counter_count()
                    ));
                }
                if let Some(error) = &self.init_error {
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::from_rgb(200, 65, 65),
                        format!("Init error: {error}"),
                    );
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_page(ui);
        });

        if let (Some(runtime), Some(viewport)) = (self.runtime.as_mut(), self.viewport.as_mut()) {
            runtime.pump(&mut self.dom, viewport, &mut self.visibility, &mut self.frames);
        }

        // One animation tick ran this frame; keep repainting while more are
        // scheduled so the count-up advances at the display refresh rate.
        if self.frames.is_pending() {
            ctx.request_repaint();
        }
    }
}

fn visible_fraction(rect: egui::Rect, clip: egui::Rect) -> f64 {
    let area = f64::from(rect.width()) * f64::from(rect.height());
    if area <= 0.0 {
        return 0.0;
    }

    let overlap = rect.intersect(clip);
    if overlap.width() <= 0.0 || overlap.height() <= 0.0 {
        return 0.0;
    }

    let visible = f64::from(overlap.width()) * f64::from(overlap.height());
    (visible / area).clamp(0.0, 1.0)
}
