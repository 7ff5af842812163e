/// Identity of the signed-in user, passed explicitly to everything that needs it.
///
/// Lifecycle: created by [`SessionContext::start`] on sign-in, consumed by
/// [`SessionContext::end`] on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionContext {
    email: String,
}

impl SessionContext {
    /// Trims the email; blank input yields no session.
    pub fn start(email: &str) -> Option<Self> {
        let email = email.trim();
        if email.is_empty() {
            return None;
        }
        Some(Self {
            email: email.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn end(self) -> String {
        self.email
    }
}
