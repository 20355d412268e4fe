//! Configuration for a [`VisibilityNotifier`](crate::VisibilityNotifier).

/// Default expansion of the viewport on every side, in CSS pixels.
pub const DEFAULT_ROOT_MARGIN_PX: f32 = 50.0;

/// Default media query that signals print mode.
pub const DEFAULT_PRINT_MEDIA_QUERY: &str = "print";

/// Expansion of the viewport used to report elements slightly before they
/// scroll into view.
///
/// Values are in CSS pixels. Negative values shrink the observed region.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RootMargin {
    pub fn uniform(all: f32) -> Self {
        Self {
            left: all,
            top: all,
            right: all,
            bottom: all,
        }
    }

    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }

    pub fn from_components(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }

    /// Formats the margin as a CSS `rootMargin` value (`top right bottom left`).
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Settings fixed at notifier construction.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityConfig {
    /// Pre-visibility margin handed to the host observer.
    pub root_margin: RootMargin,
    /// Media query whose activation is treated as a print signal.
    pub print_media_query: String,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::uniform(DEFAULT_ROOT_MARGIN_PX),
            print_media_query: DEFAULT_PRINT_MEDIA_QUERY.into(),
        }
    }
}

impl VisibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn with_print_media_query(mut self, query: impl Into<String>) -> Self {
        self.print_media_query = query.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_uniform_margin_and_print_query() {
        let config = VisibilityConfig::default();
        assert_eq!(config.root_margin, RootMargin::uniform(50.0));
        assert_eq!(config.root_margin.to_css(), "50px 50px 50px 50px");
        assert_eq!(config.print_media_query, "print");
    }

    #[test]
    fn css_margin_is_top_right_bottom_left() {
        let margin = RootMargin::from_components(1.0, 2.0, 3.0, 4.0);
        assert_eq!(margin.to_css(), "2px 3px 4px 1px");
        assert_eq!(RootMargin::uniform(100.0).to_css(), "100px 100px 100px 100px");
        assert_eq!(RootMargin::symmetric(0.0, 50.5).to_css(), "50.5px 0px 50.5px 0px");
    }

    #[test]
    fn zero_margin_detection() {
        assert!(RootMargin::default().is_zero());
        assert!(!RootMargin::symmetric(0.0, 1.0).is_zero());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = VisibilityConfig::new()
            .with_root_margin(RootMargin::symmetric(0.0, 300.0))
            .with_print_media_query("print and (orientation: portrait)");
        assert_eq!(config.root_margin.bottom, 300.0);
        assert_eq!(config.print_media_query, "print and (orientation: portrait)");
    }
}
