use alloy_primitives::{keccak256, map::HashMap, Address};

use crate::{constants::MODULE_ADDRESS_PREFIX, AccountKeeper};

/// Derives the address of the module account `name`.
///
/// The address is the last 20 bytes of `keccak256("module:" ++ name)`, so no private key exists
/// for it.
pub fn module_address(name: &str) -> Address {
    Address::from_word(keccak256(format!("{MODULE_ADDRESS_PREFIX}{name}")))
}

/// The set of module accounts known to the node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleAccounts {
    accounts: HashMap<String, Address>,
}

impl ModuleAccounts {
    /// Registers the module account `name` at its derived address.
    pub fn register(&mut self, name: impl Into<String>) -> Address {
        let name = name.into();
        let address = module_address(&name);
        self.accounts.insert(name, address);
        address
    }

    /// Registers the module account `name` at its derived address.
    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.register(name);
        self
    }
}

impl AccountKeeper for ModuleAccounts {
    fn module_address(&self, name: &str) -> Option<Address> {
        self.accounts.get(name).copied()
    }
}
