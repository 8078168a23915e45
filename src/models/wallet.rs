use scoop_core::{Address, Identity};

/// Wallet connection state
#[derive(Clone, Debug, Default, PartialEq)]
pub enum WalletState {
    #[default]
    Disconnected,
    Connecting,
    Connected { address: Address },
}

impl WalletState {
    /// Check if wallet is connected
    pub fn is_connected(&self) -> bool {
        matches!(self, WalletState::Connected { .. })
    }

    /// Identity handed to the drive session.
    pub fn identity(&self) -> Identity {
        match self {
            WalletState::Connected { address } => Identity::connected(address.clone()),
            _ => Identity::disconnected(),
        }
    }

    /// Format address for display (AbCd...WxYz)
    pub fn display_name(&self) -> String {
        match self {
            WalletState::Connected { address } => address.short(),
            WalletState::Connecting => "connecting...".to_string(),
            WalletState::Disconnected => "Connect Wallet".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn test_disconnected_state() {
        let state = WalletState::Disconnected;
        assert!(!state.is_connected());
        assert!(!state.identity().is_connected());
        assert_eq!(state.display_name(), "Connect Wallet");
    }

    #[test]
    fn test_connecting_state() {
        let state = WalletState::Connecting;
        assert!(!state.is_connected());
        assert_eq!(state.identity().active(), None);
        assert_eq!(state.display_name(), "connecting...");
    }

    #[test]
    fn test_connected_state() {
        let address = Address::new(KEY);
        let state = WalletState::Connected {
            address: address.clone(),
        };
        assert!(state.is_connected());
        assert_eq!(state.identity().active(), Some(&address));
        assert_eq!(state.display_name(), address.short());
    }

    #[test]
    fn test_default() {
        assert_eq!(WalletState::default(), WalletState::Disconnected);
    }
}
