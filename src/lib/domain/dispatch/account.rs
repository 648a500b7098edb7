//! Email account

use super::EmailAddress;

/// The delivery identity a message is sent on behalf of.
///
/// Owned by configuration and read-only here. Provider credentials are part
/// of the dispatch client's configuration, not of the account itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAccount {
    /// Display name presented to recipients
    pub display_name: Option<String>,

    /// The account's sender address
    pub address: EmailAddress,
}

impl EmailAccount {
    /// Create a new account identity
    pub fn new(address: EmailAddress, display_name: Option<String>) -> Self {
        Self {
            display_name,
            address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_carries_identity() {
        let account = EmailAccount::new(
            EmailAddress::new_unchecked("store@example.com"),
            Some("Example Store".to_string()),
        );

        assert_eq!(account.address.as_str(), "store@example.com");
        assert_eq!(account.display_name.as_deref(), Some("Example Store"));
    }
}
