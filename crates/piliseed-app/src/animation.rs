// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

use crate::navbar::{ButtonView, NavBarView};

pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(250);

/// Tweens the bar between two views. Buttons that only exist on one side
/// grow from or shrink to zero width at their own offset.
#[derive(Debug, Clone)]
pub struct NavAnimation {
    from: NavBarView,
    to: NavBarView,
    duration: Duration,
    elapsed: Duration,
}

impl NavAnimation {
    pub fn settled(view: NavBarView, duration: Duration) -> Self {
        Self {
            from: view.clone(),
            to: view,
            duration,
            elapsed: duration,
        }
    }

    /// Starts a new tween from whatever is on screen now.
    pub fn retarget(&mut self, to: NavBarView) {
        if to == self.to {
            return;
        }
        self.from = self.frame();
        self.to = to;
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn progress(&self) -> f64 {
        if self.is_settled() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        1.0 - (1.0 - t).powi(3)
    }

    pub fn frame(&self) -> NavBarView {
        if self.is_settled() {
            return self.to.clone();
        }
        let eased = self.progress();

        let mut buttons = Vec::with_capacity(self.to.buttons.len());
        for target in &self.to.buttons {
            let start = self.from.button(target.tab).copied().unwrap_or(ButtonView {
                width_px: 0,
                visible: false,
                ..*target
            });
            buttons.push(tween_button(&start, target, eased));
        }
        for start in &self.from.buttons {
            if self.to.button(start.tab).is_some() {
                continue;
            }
            let end = ButtonView {
                width_px: 0,
                visible: false,
                ..*start
            };
            buttons.push(tween_button(start, &end, eased));
        }

        NavBarView {
            layout: self.to.layout,
            hidden: self.to.hidden,
            active_tab: self.to.active_tab,
            bar_width_px: lerp(self.from.bar_width_px, self.to.bar_width_px, eased),
            highlight_offset_px: lerp(
                self.from.highlight_offset_px,
                self.to.highlight_offset_px,
                eased,
            ),
            buttons,
        }
    }
}

fn tween_button(from: &ButtonView, to: &ButtonView, eased: f64) -> ButtonView {
    let width_px = lerp(from.width_px, to.width_px, eased);
    ButtonView {
        tab: to.tab,
        visible: width_px > 0,
        width_px,
        offset_px: lerp(from.offset_px, to.offset_px, eased),
    }
}

fn lerp(from: u32, to: u32, eased: f64) -> u32 {
    let value = f64::from(from) + (f64::from(to) - f64::from(from)) * eased;
    // Clamped to the u32 endpoints, so the cast cannot truncate.
    value.round().clamp(0.0, f64::from(from.max(to))) as u32
}
