// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};

use crate::User;

pub const USER_CACHE_KEY: &str = "piliseed.user";

/// Persistent key/value storage for the signed-in user.
pub trait UserCache {
    fn load_raw(&self, key: &str) -> Result<Option<String>>;
    fn store_raw(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// The signed-in user, shared by every screen for the lifetime of the app.
#[derive(Debug)]
pub struct UserContext<C: UserCache> {
    cache: C,
    user: Option<User>,
}

impl<C: UserCache> UserContext<C> {
    /// Restores the cached user. A record that no longer parses is dropped
    /// so the next launch starts signed out instead of failing again.
    pub fn init(mut cache: C) -> Result<Self> {
        let user = match cache.load_raw(USER_CACHE_KEY)? {
            None => None,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    tracing::warn!(%error, "discarding unreadable cached user");
                    cache.remove(USER_CACHE_KEY)?;
                    None
                }
            },
        };
        if let Some(user) = &user {
            tracing::info!(user_id = %user.user_id, "restored cached user");
        }
        Ok(Self { cache, user })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn login(&mut self, user: User) -> Result<()> {
        let raw = serde_json::to_string(&user).context("encode user for cache")?;
        self.cache.store_raw(USER_CACHE_KEY, &raw)?;
        tracing::info!(user_id = %user.user_id, "user signed in");
        self.user = Some(user);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.cache.remove(USER_CACHE_KEY)?;
        if let Some(user) = self.user.take() {
            tracing::info!(user_id = %user.user_id, "user signed out");
        }
        Ok(())
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}
