//! Responsive class toggling for the navigation bar.

use pm_dom::Dom;
use pm_dom::NodeId;
use pm_dom::Selector;

/// Width below which the mobile layout classes apply.
pub const MOBILE_BREAKPOINT_PX: u32 = 992;

/// Class set applied below the breakpoint and removed at or above it.
pub const MOBILE_LAYOUT_CLASSES: [&str; 4] =
    ["position-absolute", "w-100", "start-0", "navbar-mobile"];

const MOBILE_MARKER_CLASS: &str = "navbar-mobile";

/// Applies the full mobile layout class set based on viewport width.
///
/// Attachment resolves the navbar once; if the element is absent every later
/// `apply` is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarToggler {
    navbar: Option<NodeId>,
    breakpoint_px: u32,
}

impl NavbarToggler {
    pub fn attach(dom: &Dom, selector: &Selector) -> Self {
        Self {
            navbar: dom.query_selector(selector),
            breakpoint_px: MOBILE_BREAKPOINT_PX,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.navbar.is_some()
    }

    /// Reclassifies the navbar for the given width. Idempotent at any fixed
    /// width: class addition and removal are set operations.
    pub fn apply(&self, dom: &mut Dom, viewport_width: u32) {
        let Some(node) = self.navbar else {
            return;
        };
        let Some(navbar) = dom.get_mut(node) else {
            return;
        };

        if viewport_width < self.breakpoint_px {
            for class in MOBILE_LAYOUT_CLASSES {
                navbar.add_class(class);
            }
        } else {
            for class in MOBILE_LAYOUT_CLASSES {
                navbar.remove_class(class);
            }
        }
    }
}

/// Narrow resize path that toggles only the `navbar-mobile` marker class.
///
/// Coexists with [`NavbarToggler`]; the two paths overlap on the marker
/// class, and because class-set operations are idempotent the redundancy
/// costs work but never produces an inconsistent class list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileMarkerToggler {
    navbar: Option<NodeId>,
    breakpoint_px: u32,
}

impl MobileMarkerToggler {
    pub fn attach(dom: &Dom, selector: &Selector) -> Self {
        Self {
            navbar: dom.query_selector(selector),
            breakpoint_px: MOBILE_BREAKPOINT_PX,
        }
    }

    pub fn apply(&self, dom: &mut Dom, viewport_width: u32) {
        let Some(node) = self.navbar else {
            return;
        };
        let Some(navbar) = dom.get_mut(node) else {
            return;
        };

        if viewport_width < self.breakpoint_px {
            navbar.add_class(MOBILE_MARKER_CLASS);
        } else {
            navbar.remove_class(MOBILE_MARKER_CLASS);
        }
    }
}
