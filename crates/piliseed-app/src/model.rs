// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Home,
    Chat,
    Data,
    Plant,
    History,
    Context,
    Filter,
    FilterHistory,
    SessionHome,
    Settings,
}

impl Tab {
    pub const ALL: [Self; 10] = [
        Self::Home,
        Self::Chat,
        Self::Data,
        Self::Plant,
        Self::History,
        Self::Context,
        Self::Filter,
        Self::FilterHistory,
        Self::SessionHome,
        Self::Settings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Chat => "chat",
            Self::Data => "data",
            Self::Plant => "plant",
            Self::History => "history",
            Self::Context => "context",
            Self::Filter => "filter",
            Self::FilterHistory => "filter-history",
            Self::SessionHome => "session-home",
            Self::Settings => "settings",
        }
    }

    /// Short glyph used for the bar button.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Home => "⌂",
            Self::Chat => "✉",
            Self::Data => "▤",
            Self::Plant => "✿",
            Self::History => "◷",
            Self::Context => "◎",
            Self::Filter => "▽",
            Self::FilterHistory => "≡",
            Self::SessionHome => "◆",
            Self::Settings => "⚙",
        }
    }
}

/// Which set of buttons the bar shows, with the context the buttons need
/// to build their target paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavMode {
    #[default]
    Collapsed,
    Expanded {
        greenhouse_id: Option<GreenhouseId>,
    },
    Session {
        session_id: SessionId,
        expanded: bool,
    },
}

impl NavMode {
    pub const fn layout(&self) -> BarLayout {
        match self {
            Self::Collapsed => BarLayout::Collapsed,
            Self::Expanded { .. } => BarLayout::Expanded,
            Self::Session {
                expanded: false, ..
            } => BarLayout::SessionCollapsed,
            Self::Session { expanded: true, .. } => BarLayout::SessionExpanded,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Session { session_id, .. } => Some(session_id),
            Self::Collapsed | Self::Expanded { .. } => None,
        }
    }

    pub fn greenhouse_id(&self) -> Option<&GreenhouseId> {
        match self {
            Self::Expanded { greenhouse_id } => greenhouse_id.as_ref(),
            Self::Collapsed | Self::Session { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarLayout {
    Collapsed,
    Expanded,
    SessionCollapsed,
    SessionExpanded,
}

const COLLAPSED_BUTTONS: [Tab; 3] = [Tab::Home, Tab::Chat, Tab::History];
const EXPANDED_BUTTONS: [Tab; 5] = [Tab::Home, Tab::Data, Tab::Plant, Tab::Chat, Tab::History];
const SESSION_COLLAPSED_BUTTONS: [Tab; 3] = [Tab::SessionHome, Tab::Context, Tab::Chat];
const SESSION_EXPANDED_BUTTONS: [Tab; 5] = [
    Tab::SessionHome,
    Tab::Filter,
    Tab::FilterHistory,
    Tab::Context,
    Tab::Chat,
];

impl BarLayout {
    pub const ALL: [Self; 4] = [
        Self::Collapsed,
        Self::Expanded,
        Self::SessionCollapsed,
        Self::SessionExpanded,
    ];

    /// Visible buttons, left to right.
    pub const fn buttons(self) -> &'static [Tab] {
        match self {
            Self::Collapsed => &COLLAPSED_BUTTONS,
            Self::Expanded => &EXPANDED_BUTTONS,
            Self::SessionCollapsed => &SESSION_COLLAPSED_BUTTONS,
            Self::SessionExpanded => &SESSION_EXPANDED_BUTTONS,
        }
    }

    /// Every button the bar can hold in this layout's family, in row order.
    /// Buttons outside `buttons()` sit in the row at zero width.
    pub const fn family(self) -> &'static [Tab] {
        match self {
            Self::Collapsed | Self::Expanded => &EXPANDED_BUTTONS,
            Self::SessionCollapsed | Self::SessionExpanded => &SESSION_EXPANDED_BUTTONS,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Collapsed => 0,
            Self::Expanded => 1,
            Self::SessionCollapsed => 2,
            Self::SessionExpanded => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Collapsed => "collapsed",
            Self::Expanded => "expanded",
            Self::SessionCollapsed => "session collapsed",
            Self::SessionExpanded => "session expanded",
        }
    }

    pub fn position(self, tab: Tab) -> Option<usize> {
        self.buttons().iter().position(|candidate| *candidate == tab)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// A session location as the history endpoints report it: older sessions
/// carry a bare string, newer ones an object with a short and a full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationRef {
    Text(String),
    Structured {
        name: String,
        #[serde(default)]
        full: String,
    },
}

impl LocationRef {
    pub fn label(&self) -> &str {
        match self {
            Self::Text(value) => value,
            Self::Structured { name, .. } => name,
        }
    }

    pub fn full(&self) -> &str {
        match self {
            Self::Text(value) => value,
            Self::Structured { name, full } if full.is_empty() => name,
            Self::Structured { full, .. } => full,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerInput {
    #[serde(default)]
    pub crop_category: String,
    #[serde(default)]
    pub budget_php: f64,
    #[serde(default)]
    pub waiting_tolerance_days: u32,
    #[serde(default)]
    pub land_size_ha: f64,
    #[serde(default)]
    pub manpower: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySession {
    pub id: SessionId,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub sensor_id: Option<SensorId>,
    #[serde(default)]
    pub sensor_name: String,
    #[serde(default)]
    pub location: Option<LocationRef>,
    #[serde(default)]
    pub total_crops: u32,
    #[serde(default)]
    pub planted_count: u32,
    #[serde(default)]
    pub farmer_input: Option<FarmerInput>,
}

impl HistorySession {
    pub fn location_label(&self) -> &str {
        self.location
            .as_ref()
            .map_or("Unknown Location", LocationRef::label)
    }

    /// Human timestamp; the raw value is returned when it does not parse.
    pub fn timestamp_label(&self) -> String {
        let display = format_description!("[month repr:short] [day padding:none], [year] [hour]:[minute]");
        let parsed = OffsetDateTime::parse(&self.timestamp, &Rfc3339)
            .map(|value| PrimitiveDateTime::new(value.date(), value.time()))
            .or_else(|_| {
                PrimitiveDateTime::parse(
                    &self.timestamp,
                    format_description!(
                        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
                    ),
                )
            });
        match parsed.ok().and_then(|value| value.format(display).ok()) {
            Some(label) => label,
            None => self.timestamp.clone(),
        }
    }
}
