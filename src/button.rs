//! Loading-state toggle for the control that starts an export.
//!
//! An export takes a few seconds; the button that started it shows a
//! "preparing" label, is disabled and dimmed until the export finishes.
//! [`set_loading`] applies that state to anything implementing [`Control`].

/// Label shown while an export is running.
pub const LOADING_LABEL: &str = "<i style=\"margin-right: 5px;\">⏳</i> PDF Hazırlanıyor...";

/// Label restored when the caller has no label of its own.
pub const DEFAULT_LABEL: &str = "<i style=\"margin-right: 5px;\">📥</i> PDF İndir";

pub const LOADING_OPACITY: f32 = 0.7;
pub const IDLE_OPACITY: f32 = 1.0;

/// A clickable control whose label, enabled flag and opacity can be set.
///
/// Labels are HTML (an icon element followed by the caption).
pub trait Control {
    fn set_label(&mut self, label: &str);
    fn set_enabled(&mut self, enabled: bool);
    fn set_opacity(&mut self, opacity: f32);
}

/// Plain state-holding control.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub enabled: bool,
    pub opacity: f32,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            enabled: true,
            opacity: IDLE_OPACITY,
        }
    }
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

impl Control for Button {
    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}

/// Put `control` into (or out of) the loading state.
///
/// Leaving the loading state restores `original_label`, or [`DEFAULT_LABEL`]
/// when it is `None` or empty. Calling twice with the same arguments sets the
/// same properties again and has no further effect.
pub fn set_loading<C: Control + ?Sized>(
    control: &mut C,
    is_loading: bool,
    original_label: Option<&str>,
) {
    if is_loading {
        control.set_label(LOADING_LABEL);
        control.set_enabled(false);
        control.set_opacity(LOADING_OPACITY);
    } else {
        let label = original_label
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LABEL);
        control.set_label(label);
        control.set_enabled(true);
        control.set_opacity(IDLE_OPACITY);
    }
}
