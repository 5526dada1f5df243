// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::{FilterId, GreenhouseId, NavMode, SensorId, SessionId, Tab};

/// The page component a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Chat,
    Settings,
    History,
    FilterCrop,
    FilterDetail,
    SessionContext,
    SessionChat,
    SessionFilters,
    SessionFilter,
    SessionCrop,
    Session,
    SensorHistory,
    GreenhouseCrop,
    GreenhouseCrops,
    Greenhouse,
    Unknown,
}

impl Page {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Greenhouses",
            Self::Chat => "Farm assistant",
            Self::Settings => "Settings",
            Self::History => "Recommendation history",
            Self::FilterCrop => "Filtered crop",
            Self::FilterDetail => "Filtered recommendations",
            Self::SessionContext => "Session context",
            Self::SessionChat => "Session chat",
            Self::SessionFilters => "Filtered sessions",
            Self::SessionFilter => "Filter recommendations",
            Self::SessionCrop => "Session crop",
            Self::Session => "Session",
            Self::SensorHistory => "Sensor history",
            Self::GreenhouseCrop => "Crop detail",
            Self::GreenhouseCrops => "Crop recommendations",
            Self::Greenhouse => "Greenhouse",
            Self::Unknown => "Not found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteParams {
    pub greenhouse_id: Option<GreenhouseId>,
    pub sensor_id: Option<SensorId>,
    pub session_id: Option<SessionId>,
    pub filter_id: Option<FilterId>,
    pub crop_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: String,
    pub page: Page,
    pub tab: Tab,
    pub mode: NavMode,
    pub hide_navbar: bool,
    pub params: RouteParams,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.page != Page::Unknown
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            path: "/".to_owned(),
            page: Page::Home,
            tab: Tab::Home,
            mode: NavMode::Collapsed,
            hide_navbar: false,
            params: RouteParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeRule {
    Collapsed,
    Greenhouse,
    Sensor,
    Session { expanded: bool },
}

#[derive(Debug, Clone, Copy)]
struct RouteRule {
    page: Page,
    pattern: &'static str,
    tab: Tab,
    hide_navbar: bool,
    mode: ModeRule,
}

const fn rule(
    page: Page,
    pattern: &'static str,
    tab: Tab,
    hide_navbar: bool,
    mode: ModeRule,
) -> RouteRule {
    RouteRule {
        page,
        pattern,
        tab,
        hide_navbar,
        mode,
    }
}

// First match wins. Exact routes, then nested routes from the most specific
// suffix down, then containment fallbacks.
const ROUTE_RULES: &[RouteRule] = &[
    rule(Page::Home, r"^/$", Tab::Home, false, ModeRule::Collapsed),
    rule(Page::Chat, r"^/chat$", Tab::Chat, false, ModeRule::Collapsed),
    rule(Page::Settings, r"^/settings$", Tab::Settings, true, ModeRule::Collapsed),
    rule(Page::History, r"^/history$", Tab::History, false, ModeRule::Collapsed),
    rule(
        Page::FilterCrop,
        r"^/history/filter/(?P<filter>[^/]+)/crop/(?P<crop>\d+)$",
        Tab::FilterHistory,
        true,
        ModeRule::Collapsed,
    ),
    rule(
        Page::FilterDetail,
        r"^/history/filter/(?P<filter>[^/]+)$",
        Tab::FilterHistory,
        true,
        ModeRule::Collapsed,
    ),
    rule(
        Page::SessionContext,
        r"^/history/(?P<session>[^/]+)/context$",
        Tab::Context,
        false,
        ModeRule::Session { expanded: false },
    ),
    rule(
        Page::SessionChat,
        r"^/history/(?P<session>[^/]+)/chat$",
        Tab::Chat,
        false,
        ModeRule::Session { expanded: false },
    ),
    rule(
        Page::SessionFilters,
        r"^/history/(?P<session>[^/]+)/filters$",
        Tab::FilterHistory,
        false,
        ModeRule::Session { expanded: true },
    ),
    rule(
        Page::SessionFilter,
        r"^/history/(?P<session>[^/]+)/filter$",
        Tab::Filter,
        false,
        ModeRule::Session { expanded: true },
    ),
    rule(
        Page::SessionCrop,
        r"^/history/(?P<session>[^/]+)/crops/(?P<crop>\d+)$",
        Tab::SessionHome,
        true,
        ModeRule::Session { expanded: true },
    ),
    rule(
        Page::Session,
        r"^/history/(?P<session>[^/]+)$",
        Tab::SessionHome,
        false,
        ModeRule::Session { expanded: true },
    ),
    rule(
        Page::SensorHistory,
        r"^/sensor/(?P<sensor>[^/]+)/history$",
        Tab::Data,
        true,
        ModeRule::Sensor,
    ),
    rule(
        Page::GreenhouseCrop,
        r"^/greenhouse/(?P<greenhouse>[^/]+)/crops/(?P<crop>\d+)$",
        Tab::Plant,
        true,
        ModeRule::Greenhouse,
    ),
    rule(
        Page::GreenhouseCrops,
        r"^/greenhouse/(?P<greenhouse>[^/]+)/crops$",
        Tab::Plant,
        false,
        ModeRule::Greenhouse,
    ),
    rule(
        Page::Greenhouse,
        r"^/greenhouse/(?P<greenhouse>[^/]+)$",
        Tab::Data,
        false,
        ModeRule::Greenhouse,
    ),
    rule(
        Page::FilterDetail,
        r"^/history/filter/",
        Tab::FilterHistory,
        true,
        ModeRule::Collapsed,
    ),
    rule(Page::History, r"/history", Tab::History, false, ModeRule::Collapsed),
    rule(
        Page::Greenhouse,
        r"/greenhouse/(?P<greenhouse>[^/]*)",
        Tab::Data,
        false,
        ModeRule::Greenhouse,
    ),
];

struct CompiledRule {
    rule: RouteRule,
    regex: Regex,
}

static ROUTE_TABLE: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    ROUTE_RULES
        .iter()
        .map(|rule| CompiledRule {
            rule: *rule,
            regex: Regex::new(rule.pattern).expect("route patterns are valid regexes"),
        })
        .collect()
});

/// Strips query and fragment, and one trailing slash on non-root paths.
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let path = raw[..end].trim();
    if path.is_empty() {
        return "/".to_owned();
    }
    let path = if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    };
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Classifies a path against the route table. `None` when no rule matches.
pub fn classify(raw: &str) -> Option<Resolution> {
    let path = normalize_path(raw);
    ROUTE_TABLE.iter().find_map(|compiled| {
        let captures = compiled.regex.captures(&path)?;
        let params = params_from(&captures);
        let mode = mode_for(compiled.rule.mode, &params);
        Some(Resolution {
            path: path.clone(),
            page: compiled.rule.page,
            tab: compiled.rule.tab,
            mode,
            hide_navbar: compiled.rule.hide_navbar,
            params,
        })
    })
}

/// Full-screen routes hide the bottom bar. Unknown routes keep it.
pub fn should_hide_navbar(raw: &str) -> bool {
    classify(raw).is_some_and(|resolution| resolution.hide_navbar)
}

fn params_from(captures: &Captures<'_>) -> RouteParams {
    let text = |name: &str| {
        captures
            .name(name)
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    };
    RouteParams {
        greenhouse_id: text("greenhouse").map(GreenhouseId::from),
        sensor_id: text("sensor").map(SensorId::from),
        session_id: text("session").map(SessionId::from),
        filter_id: text("filter").map(FilterId::from),
        crop_index: text("crop").and_then(|value| value.parse().ok()),
    }
}

fn mode_for(rule: ModeRule, params: &RouteParams) -> NavMode {
    match rule {
        ModeRule::Collapsed => NavMode::Collapsed,
        ModeRule::Greenhouse => NavMode::Expanded {
            greenhouse_id: params.greenhouse_id.clone(),
        },
        // Sensor ids double as greenhouse ids in the API.
        ModeRule::Sensor => NavMode::Expanded {
            greenhouse_id: params
                .sensor_id
                .as_ref()
                .map(|sensor| GreenhouseId::new(sensor.as_str())),
        },
        ModeRule::Session { expanded } => match &params.session_id {
            Some(session_id) => NavMode::Session {
                session_id: session_id.clone(),
                expanded,
            },
            None => NavMode::Collapsed,
        },
    }
}

/// Remembers the last resolution so unknown paths keep the previous tab.
#[derive(Debug, Clone, Default)]
pub struct RouteTabResolver {
    last: Resolution,
}

impl RouteTabResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &Resolution {
        &self.last
    }

    pub fn resolve(&mut self, raw: &str) -> Resolution {
        let resolution = match classify(raw) {
            Some(resolution) => resolution,
            None => {
                let path = normalize_path(raw);
                tracing::debug!(
                    path = %path,
                    tab = self.last.tab.as_str(),
                    "unresolved route; keeping previous tab"
                );
                Resolution {
                    path,
                    page: Page::Unknown,
                    tab: self.last.tab,
                    mode: self.last.mode.clone(),
                    hide_navbar: false,
                    params: RouteParams::default(),
                }
            }
        };
        self.last = resolution.clone();
        resolution
    }
}
