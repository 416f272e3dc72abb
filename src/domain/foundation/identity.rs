use super::UserId;

/// Who the session acts for.
///
/// A known identity unlocks the remote tier and remote reads; anonymous
/// sessions run on demo data and device-local persistence only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    Known(UserId),
    #[default]
    Anonymous,
}

impl Identity {
    /// Identity for an authenticated user.
    pub fn known(user_id: UserId) -> Self {
        Identity::Known(user_id)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Known(id) => Some(id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Identity::Known(_))
    }

    /// The user id sent to the provider gateway; `"anonymous"` when unknown.
    pub fn gateway_user(&self) -> &str {
        match self {
            Identity::Known(id) => id.as_str(),
            Identity::Anonymous => "anonymous",
        }
    }
}

impl From<Option<UserId>> for Identity {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Identity::Anonymous, Identity::Known)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_gateway_user_is_placeholder() {
        assert_eq!(Identity::Anonymous.gateway_user(), "anonymous");
        assert!(!Identity::Anonymous.is_known());
    }

    #[test]
    fn known_identity_exposes_user() {
        let identity = Identity::from(Some(UserId::new("u-1").unwrap()));
        assert!(identity.is_known());
        assert_eq!(identity.gateway_user(), "u-1");
        assert_eq!(identity.user_id().map(UserId::as_str), Some("u-1"));
    }
}
