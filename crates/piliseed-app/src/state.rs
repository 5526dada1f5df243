// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::navbar::{ButtonTransition, NavBarMetrics, NavigationBarController};
use crate::{BarLayout, Page, Resolution, RouteTabResolver, Tab, User, UserId, normalize_path};

/// Router and shell state for one running client.
#[derive(Debug, Clone)]
pub struct AppState {
    resolver: RouteTabResolver,
    navbar: NavigationBarController,
    back_stack: Vec<String>,
    pub user: Option<User>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new("/", NavBarMetrics::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Navigate(String),
    Back,
    ClickButton(Tab),
    Login(User),
    Logout,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RouteChanged { path: String, page: Page },
    TabChanged(Tab),
    LayoutChanged {
        from: BarLayout,
        to: BarLayout,
        transitions: Vec<ButtonTransition>,
    },
    NavbarVisibilityChanged { hidden: bool },
    NavigationIgnored(Tab),
    LoggedIn(UserId),
    LoggedOut,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(start_path: &str, metrics: NavBarMetrics) -> Self {
        let mut resolver = RouteTabResolver::new();
        let mut navbar = NavigationBarController::new(metrics);
        navbar.sync(&resolver.resolve(start_path));
        Self {
            resolver,
            navbar,
            back_stack: Vec::new(),
            user: None,
            status_line: None,
        }
    }

    pub fn resolution(&self) -> &Resolution {
        self.resolver.last()
    }

    pub fn current_path(&self) -> &str {
        &self.resolver.last().path
    }

    pub fn navbar(&self) -> &NavigationBarController {
        &self.navbar
    }

    pub fn back_depth(&self) -> usize {
        self.back_stack.len()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Navigate(path) => {
                let previous_tab = self.navbar.active_tab();
                self.go_to(&path, true, previous_tab)
            }
            AppCommand::Back => match self.back_stack.pop() {
                Some(path) => {
                    let previous_tab = self.navbar.active_tab();
                    self.go_to(&path, false, previous_tab)
                }
                None => Vec::new(),
            },
            AppCommand::ClickButton(tab) => {
                let previous_tab = self.navbar.active_tab();
                match self.navbar.click(tab) {
                    Some(intent) => {
                        let events = self.go_to(&intent.path, true, previous_tab);
                        if events.is_empty() {
                            // Already there; drop the optimistic tab.
                            self.navbar.sync(self.resolver.last());
                        }
                        events
                    }
                    None => vec![AppEvent::NavigationIgnored(tab)],
                }
            }
            AppCommand::Login(user) => {
                let user_id = user.user_id.clone();
                let greeting = format!("signed in as {}", user.display_name());
                self.user = Some(user);
                vec![AppEvent::LoggedIn(user_id), self.set_status(&greeting)]
            }
            AppCommand::Logout => {
                self.user = None;
                let previous_tab = self.navbar.active_tab();
                let mut events = vec![AppEvent::LoggedOut];
                events.extend(self.go_to("/", false, previous_tab));
                self.back_stack.clear();
                events.push(self.set_status("signed out"));
                events
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn go_to(&mut self, raw: &str, push: bool, previous_tab: Tab) -> Vec<AppEvent> {
        let path = normalize_path(raw);
        if path == self.current_path() {
            return Vec::new();
        }

        let previous_path = self.current_path().to_owned();
        let previous_layout = self.navbar.layout();
        let previous_hidden = self.navbar.is_hidden();

        let resolution = self.resolver.resolve(&path);
        let transitions = self.navbar.sync(&resolution);
        if push {
            self.back_stack.push(previous_path);
        }
        tracing::debug!(path = %resolution.path, tab = resolution.tab.as_str(), "route changed");

        let mut events = vec![AppEvent::RouteChanged {
            path: resolution.path.clone(),
            page: resolution.page,
        }];
        if resolution.tab != previous_tab {
            events.push(AppEvent::TabChanged(resolution.tab));
        }
        if self.navbar.layout() != previous_layout {
            events.push(AppEvent::LayoutChanged {
                from: previous_layout,
                to: self.navbar.layout(),
                transitions,
            });
        }
        if self.navbar.is_hidden() != previous_hidden {
            events.push(AppEvent::NavbarVisibilityChanged {
                hidden: self.navbar.is_hidden(),
            });
        }
        events
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
