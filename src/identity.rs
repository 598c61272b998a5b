//! Signed-in user identity.
//!
//! The sign-in flow lives outside this crate. Whatever performs it hands over
//! an opaque identity, which is only displayed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserIdentity {
    /// Name if known, otherwise the email.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Holder of the current identity, if signed in.
#[derive(Debug, Clone, Default)]
pub struct Account {
    identity: Option<UserIdentity>,
}

impl Account {
    pub fn sign_in(&mut self, identity: UserIdentity) {
        tracing::info!(email = %identity.email, "signed in");
        self.identity = Some(identity);
    }

    pub fn sign_out(&mut self) {
        if let Some(identity) = self.identity.take() {
            tracing::info!(email = %identity.email, "signed out");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let mut account = Account::default();
        assert!(!account.is_signed_in());
        account.sign_in(UserIdentity { email: "ada@example.com".into(), ..Default::default() });
        assert_eq!(account.identity().unwrap().display_name(), "ada@example.com");
        account.sign_out();
        assert!(account.identity().is_none());
    }
}
