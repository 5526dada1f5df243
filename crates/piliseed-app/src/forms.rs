// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::normalize_path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFormInput {
    pub first_name: String,
    pub last_name: String,
}

impl LoginFormInput {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            bail!("first name is required -- enter your first name and retry");
        }
        if self.last_name.trim().is_empty() {
            bail!("last name is required -- enter your last name and retry");
        }
        Ok(())
    }

    /// Names as sent to the registration endpoint.
    pub fn trimmed(&self) -> (String, String) {
        (
            self.first_name.trim().to_owned(),
            self.last_name.trim().to_owned(),
        )
    }
}

/// Text typed into the `:` prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPromptInput {
    pub raw: String,
}

impl PathPromptInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn validate(&self) -> Result<String> {
        let raw = self.raw.trim();
        if raw.is_empty() {
            bail!("path is required -- type a route such as /history and retry");
        }
        if !raw.starts_with('/') {
            bail!("path must start with '/' -- got {raw:?}");
        }
        Ok(normalize_path(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginFormInput, PathPromptInput};

    #[test]
    fn login_requires_both_names() {
        assert!(LoginFormInput::new("  ", "Santos").validate().is_err());
        assert!(LoginFormInput::new("Juan", "").validate().is_err());
        assert!(LoginFormInput::new("Juan", "Santos").validate().is_ok());
    }

    #[test]
    fn login_error_explains_remediation() {
        let err = LoginFormInput::new("", "Santos")
            .validate()
            .expect_err("blank first name rejected");
        assert!(err.to_string().contains("enter your first name"));
    }

    #[test]
    fn login_trims_names() {
        let input = LoginFormInput::new(" Juan ", "\tdela Cruz ");
        assert_eq!(
            input.trimmed(),
            ("Juan".to_owned(), "dela Cruz".to_owned())
        );
    }

    #[test]
    fn path_prompt_normalizes_and_rejects_relative() {
        assert_eq!(
            PathPromptInput::new(" /history/ ").validate().ok().as_deref(),
            Some("/history")
        );
        assert!(PathPromptInput::new("history").validate().is_err());
        assert!(PathPromptInput::new("").validate().is_err());
    }
}
