// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{BarLayout, NavMode, Resolution, Tab};

pub const BUTTON_WIDTH_PX: u32 = 48;
pub const BUTTON_GAP_PX: u32 = 4;
pub const LEFT_PADDING_PX: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavBarMetrics {
    pub button_width: u32,
    pub gap: u32,
    pub left_padding: u32,
    min_widths: [u32; 4],
}

impl Default for NavBarMetrics {
    fn default() -> Self {
        Self {
            button_width: BUTTON_WIDTH_PX,
            gap: BUTTON_GAP_PX,
            left_padding: LEFT_PADDING_PX,
            min_widths: [0; 4],
        }
    }
}

impl NavBarMetrics {
    /// Forces a wider bar for `layout`; the button row is centered inside it.
    pub fn with_min_width(mut self, layout: BarLayout, width: u32) -> Self {
        self.min_widths[layout.index()] = width;
        self
    }

    pub const fn stride(&self) -> u32 {
        self.button_width + self.gap
    }

    pub fn natural_width(&self, buttons: usize) -> u32 {
        let count = u32::try_from(buttons).unwrap_or(u32::MAX);
        let gaps = count.saturating_sub(1);
        self.left_padding * 2 + count * self.button_width + gaps * self.gap
    }

    pub fn bar_width(&self, layout: BarLayout) -> u32 {
        self.natural_width(layout.buttons().len())
            .max(self.min_widths[layout.index()])
    }

    /// Offset of the first button. An odd slack pixel goes to the first
    /// button so the row stays on whole pixels.
    pub fn first_offset(&self, layout: BarLayout) -> u32 {
        let natural = self.natural_width(layout.buttons().len());
        let slack = self.bar_width(layout) - natural;
        self.left_padding + slack.div_ceil(2)
    }

    pub fn slot_offset(&self, layout: BarLayout, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(0);
        self.first_offset(layout) + index * self.stride()
    }

    /// Highlight position for `tab`; slot 0 when the tab has no button.
    pub fn highlight_offset(&self, layout: BarLayout, tab: Tab) -> u32 {
        self.slot_offset(layout, layout.position(tab).unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonView {
    pub tab: Tab,
    pub visible: bool,
    pub width_px: u32,
    pub offset_px: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBarView {
    pub layout: BarLayout,
    pub hidden: bool,
    pub active_tab: Tab,
    pub bar_width_px: u32,
    pub highlight_offset_px: u32,
    pub buttons: Vec<ButtonView>,
}

impl NavBarView {
    pub fn build(metrics: &NavBarMetrics, layout: BarLayout, active_tab: Tab, hidden: bool) -> Self {
        let mut slot = 0;
        let mut buttons = Vec::with_capacity(layout.family().len());
        for tab in layout.family() {
            let visible = layout.position(*tab).is_some();
            buttons.push(ButtonView {
                tab: *tab,
                visible,
                width_px: if visible { metrics.button_width } else { 0 },
                offset_px: metrics.slot_offset(layout, slot),
            });
            if visible {
                slot += 1;
            }
        }

        Self {
            layout,
            hidden,
            active_tab,
            bar_width_px: metrics.bar_width(layout),
            highlight_offset_px: metrics.highlight_offset(layout, active_tab),
            buttons,
        }
    }

    pub fn visible_buttons(&self) -> impl Iterator<Item = &ButtonView> {
        self.buttons.iter().filter(|button| button.visible)
    }

    pub fn button(&self, tab: Tab) -> Option<&ButtonView> {
        self.buttons.iter().find(|button| button.tab == tab)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Enter,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTransition {
    pub tab: Tab,
    pub kind: TransitionKind,
    pub from_width_px: u32,
    pub to_width_px: u32,
}

/// Buttons that appear or disappear when the bar switches layouts.
pub fn layout_transitions(
    metrics: &NavBarMetrics,
    from: BarLayout,
    to: BarLayout,
) -> Vec<ButtonTransition> {
    if from == to {
        return Vec::new();
    }

    let leaving = from
        .buttons()
        .iter()
        .filter(|tab| to.position(**tab).is_none())
        .map(|tab| ButtonTransition {
            tab: *tab,
            kind: TransitionKind::Leave,
            from_width_px: metrics.button_width,
            to_width_px: 0,
        });
    let entering = to
        .buttons()
        .iter()
        .filter(|tab| from.position(**tab).is_none())
        .map(|tab| ButtonTransition {
            tab: *tab,
            kind: TransitionKind::Enter,
            from_width_px: 0,
            to_width_px: metrics.button_width,
        });
    leaving.chain(entering).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub tab: Tab,
    pub path: String,
}

/// Target path for a button in the given mode, or `None` when the mode lacks
/// the id the path needs or the button does not belong to the mode.
pub fn target_path(tab: Tab, mode: &NavMode) -> Option<String> {
    if let Some(session_id) = mode.session_id() {
        if !session_id.is_path_segment() {
            return None;
        }
        return match tab {
            Tab::SessionHome => Some(format!("/history/{session_id}")),
            Tab::Filter => Some(format!("/history/{session_id}/filter")),
            Tab::FilterHistory => Some(format!("/history/{session_id}/filters")),
            Tab::Context => Some(format!("/history/{session_id}/context")),
            Tab::Chat => Some(format!("/history/{session_id}/chat")),
            _ => None,
        };
    }

    match tab {
        Tab::Home => Some("/".to_owned()),
        Tab::Chat => Some("/chat".to_owned()),
        Tab::History => Some("/history".to_owned()),
        Tab::Data => mode
            .greenhouse_id()
            .filter(|id| id.is_path_segment())
            .map(|id| format!("/greenhouse/{id}")),
        Tab::Plant => mode
            .greenhouse_id()
            .filter(|id| id.is_path_segment())
            .map(|id| format!("/greenhouse/{id}/crops")),
        _ => None,
    }
}

/// Owns the bottom bar: which layout is showing, the active tab, and the
/// click-to-path translation. State only changes through `sync`, apart from
/// the optimistic active tab a click sets before the route catches up.
#[derive(Debug, Clone)]
pub struct NavigationBarController {
    metrics: NavBarMetrics,
    mode: NavMode,
    active_tab: Tab,
    hidden: bool,
}

impl Default for NavigationBarController {
    fn default() -> Self {
        Self::new(NavBarMetrics::default())
    }
}

impl NavigationBarController {
    pub fn new(metrics: NavBarMetrics) -> Self {
        Self {
            metrics,
            mode: NavMode::Collapsed,
            active_tab: Tab::Home,
            hidden: false,
        }
    }

    pub fn mode(&self) -> &NavMode {
        &self.mode
    }

    pub fn layout(&self) -> BarLayout {
        self.mode.layout()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Adopts a fresh resolution. The route wins over any optimistic tab.
    pub fn sync(&mut self, resolution: &Resolution) -> Vec<ButtonTransition> {
        let from = self.layout();
        self.mode = resolution.mode.clone();
        self.active_tab = resolution.tab;
        self.hidden = resolution.hide_navbar;
        layout_transitions(&self.metrics, from, self.layout())
    }

    pub fn view(&self) -> NavBarView {
        NavBarView::build(&self.metrics, self.layout(), self.active_tab, self.hidden)
    }

    pub fn click(&mut self, tab: Tab) -> Option<NavigationIntent> {
        if self.layout().position(tab).is_none() {
            tracing::debug!(tab = tab.as_str(), layout = self.layout().label(), "button not visible");
            return None;
        }
        let Some(path) = target_path(tab, &self.mode) else {
            tracing::debug!(tab = tab.as_str(), "missing navigation context; ignoring click");
            return None;
        };
        self.active_tab = tab;
        Some(NavigationIntent { tab, path })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NavBarMetrics, NavBarView, NavigationBarController, TransitionKind, layout_transitions,
        target_path,
    };
    use crate::{BarLayout, GreenhouseId, NavMode, SessionId, Tab, classify};

    fn offsets(layout: BarLayout) -> Vec<u32> {
        let metrics = NavBarMetrics::default();
        layout
            .buttons()
            .iter()
            .map(|tab| metrics.highlight_offset(layout, *tab))
            .collect()
    }

    #[test]
    fn collapsed_offsets_step_by_button_and_gap() {
        assert_eq!(offsets(BarLayout::Collapsed), vec![12, 64, 116]);
        assert_eq!(NavBarMetrics::default().bar_width(BarLayout::Collapsed), 176);
    }

    #[test]
    fn every_layout_is_evenly_spaced() {
        for layout in BarLayout::ALL {
            let offsets = offsets(layout);
            assert_eq!(offsets.len(), layout.buttons().len());
            for pair in offsets.windows(2) {
                assert_eq!(pair[1] - pair[0], 52, "spacing in {layout:?}");
            }
        }
        assert_eq!(offsets(BarLayout::Expanded), vec![12, 64, 116, 168, 220]);
    }

    #[test]
    fn wider_bar_centers_row_and_first_button_takes_odd_pixel() {
        let metrics = NavBarMetrics::default().with_min_width(BarLayout::Collapsed, 192);
        assert_eq!(metrics.bar_width(BarLayout::Collapsed), 192);
        assert_eq!(metrics.highlight_offset(BarLayout::Collapsed, Tab::Home), 20);
        assert_eq!(metrics.highlight_offset(BarLayout::Collapsed, Tab::History), 124);

        let odd = NavBarMetrics::default().with_min_width(BarLayout::Expanded, 289);
        assert_eq!(odd.highlight_offset(BarLayout::Expanded, Tab::Home), 17);

        let narrow = NavBarMetrics::default().with_min_width(BarLayout::Expanded, 100);
        assert_eq!(narrow.bar_width(BarLayout::Expanded), 280);
    }

    #[test]
    fn invisible_active_tab_highlights_first_slot() {
        let metrics = NavBarMetrics::default();
        assert_eq!(metrics.highlight_offset(BarLayout::Collapsed, Tab::Plant), 12);
        let view = NavBarView::build(&metrics, BarLayout::SessionCollapsed, Tab::Settings, false);
        assert_eq!(view.highlight_offset_px, 12);
    }

    #[test]
    fn view_lists_family_with_hidden_buttons_at_zero_width() {
        let view = NavBarView::build(
            &NavBarMetrics::default(),
            BarLayout::Collapsed,
            Tab::Chat,
            false,
        );
        let rendered: Vec<(Tab, bool, u32, u32)> = view
            .buttons
            .iter()
            .map(|button| (button.tab, button.visible, button.width_px, button.offset_px))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (Tab::Home, true, 48, 12),
                (Tab::Data, false, 0, 64),
                (Tab::Plant, false, 0, 64),
                (Tab::Chat, true, 48, 64),
                (Tab::History, true, 48, 116),
            ]
        );
        assert_eq!(view.highlight_offset_px, 64);
        let visible: Vec<Tab> = view.visible_buttons().map(|button| button.tab).collect();
        assert_eq!(visible, BarLayout::Collapsed.buttons());
    }

    #[test]
    fn expanding_adds_data_and_plant() {
        let transitions =
            layout_transitions(&NavBarMetrics::default(), BarLayout::Collapsed, BarLayout::Expanded);
        assert_eq!(transitions.len(), 2);
        assert!(transitions.iter().all(|t| t.kind == TransitionKind::Enter));
        assert!(transitions.iter().all(|t| t.from_width_px == 0 && t.to_width_px == 48));
        let tabs: Vec<Tab> = transitions.iter().map(|t| t.tab).collect();
        assert_eq!(tabs, vec![Tab::Data, Tab::Plant]);
    }

    #[test]
    fn entering_session_swaps_everything_but_chat() {
        let transitions = layout_transitions(
            &NavBarMetrics::default(),
            BarLayout::Collapsed,
            BarLayout::SessionCollapsed,
        );
        let leaving: Vec<Tab> = transitions
            .iter()
            .filter(|t| t.kind == TransitionKind::Leave)
            .map(|t| t.tab)
            .collect();
        let entering: Vec<Tab> = transitions
            .iter()
            .filter(|t| t.kind == TransitionKind::Enter)
            .map(|t| t.tab)
            .collect();
        assert_eq!(leaving, vec![Tab::Home, Tab::History]);
        assert_eq!(entering, vec![Tab::SessionHome, Tab::Context]);
    }

    #[test]
    fn target_paths_use_route_context() {
        let greenhouse = NavMode::Expanded {
            greenhouse_id: Some(GreenhouseId::new("xyz")),
        };
        assert_eq!(target_path(Tab::Plant, &greenhouse).as_deref(), Some("/greenhouse/xyz/crops"));
        assert_eq!(target_path(Tab::Data, &greenhouse).as_deref(), Some("/greenhouse/xyz"));
        assert_eq!(target_path(Tab::Home, &greenhouse).as_deref(), Some("/"));

        let session = NavMode::Session {
            session_id: SessionId::new("abc123"),
            expanded: true,
        };
        assert_eq!(
            target_path(Tab::Filter, &session).as_deref(),
            Some("/history/abc123/filter")
        );
        assert_eq!(
            target_path(Tab::FilterHistory, &session).as_deref(),
            Some("/history/abc123/filters")
        );
        assert_eq!(
            target_path(Tab::Chat, &session).as_deref(),
            Some("/history/abc123/chat")
        );
        assert_eq!(target_path(Tab::Home, &session), None);
    }

    #[test]
    fn missing_context_makes_paths_unavailable() {
        let no_greenhouse = NavMode::Expanded {
            greenhouse_id: None,
        };
        assert_eq!(target_path(Tab::Plant, &no_greenhouse), None);
        assert_eq!(target_path(Tab::Data, &NavMode::Collapsed), None);

        let broken_session = NavMode::Session {
            session_id: SessionId::new(""),
            expanded: false,
        };
        assert_eq!(target_path(Tab::Context, &broken_session), None);
    }

    #[test]
    fn plant_click_on_greenhouse_navigates_to_crops() {
        let mut controller = NavigationBarController::default();
        let resolution = classify("/greenhouse/xyz").expect("greenhouse resolves");
        controller.sync(&resolution);
        assert_eq!(controller.active_tab(), Tab::Data);

        let intent = controller.click(Tab::Plant).expect("plant click navigates");
        assert_eq!(intent.path, "/greenhouse/xyz/crops");
        assert_eq!(controller.active_tab(), Tab::Plant);
    }

    #[test]
    fn plant_click_without_greenhouse_is_noop() {
        let mut controller = NavigationBarController::default();
        let resolution = classify("/greenhouse//crops").expect("fallback resolves");
        controller.sync(&resolution);
        assert_eq!(controller.layout(), BarLayout::Expanded);

        assert_eq!(controller.click(Tab::Plant), None);
        assert_eq!(controller.active_tab(), Tab::Data);
    }

    #[test]
    fn click_on_invisible_button_is_noop() {
        let mut controller = NavigationBarController::default();
        assert_eq!(controller.click(Tab::Plant), None);
        assert_eq!(controller.click(Tab::Context), None);
        assert_eq!(controller.active_tab(), Tab::Home);
    }

    #[test]
    fn sync_overrides_optimistic_tab() {
        let mut controller = NavigationBarController::default();
        controller.sync(&classify("/").expect("home resolves"));
        controller.click(Tab::History).expect("history click navigates");
        assert_eq!(controller.active_tab(), Tab::History);

        controller.sync(&classify("/chat").expect("chat resolves"));
        assert_eq!(controller.active_tab(), Tab::Chat);
        assert_eq!(controller.view().highlight_offset_px, 64);
    }

    #[test]
    fn session_context_route_highlights_context_slot() {
        let mut controller = NavigationBarController::default();
        let transitions = controller.sync(&classify("/history/abc123/context").expect("resolves"));
        assert!(!transitions.is_empty());

        let view = controller.view();
        assert_eq!(view.layout, BarLayout::SessionCollapsed);
        assert!(!view.hidden);
        assert_eq!(view.highlight_offset_px, 64);
        let visible: Vec<Tab> = view.visible_buttons().map(|button| button.tab).collect();
        assert_eq!(visible, vec![Tab::SessionHome, Tab::Context, Tab::Chat]);
    }

    #[test]
    fn crop_detail_hides_bar() {
        let mut controller = NavigationBarController::default();
        controller.sync(&classify("/greenhouse/xyz/crops/2").expect("resolves"));
        assert!(controller.is_hidden());
        assert!(controller.view().hidden);
    }
}
