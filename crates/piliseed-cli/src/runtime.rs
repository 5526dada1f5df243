// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use piliseed_api::Client;
use piliseed_app::{HistorySession, LoginFormInput, User, UserContext};
use piliseed_db::Store;

/// Backs the terminal client with the REST backend and the local cache.
pub struct ApiRuntime {
    users: UserContext<Store>,
    client: Client,
}

impl ApiRuntime {
    pub fn new(users: UserContext<Store>, client: Client) -> Self {
        Self { users, client }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.users.user()
    }
}

impl piliseed_tui::AppRuntime for ApiRuntime {
    fn login(&mut self, input: &LoginFormInput) -> Result<User> {
        let user = self.client.register_user(input)?;
        self.users.login(user.clone())?;
        Ok(user)
    }

    fn logout(&mut self) -> Result<()> {
        self.users.logout()
    }

    fn load_history(&mut self, user: &User) -> Result<Vec<HistorySession>> {
        self.client.list_history(&user.user_id)
    }
}
