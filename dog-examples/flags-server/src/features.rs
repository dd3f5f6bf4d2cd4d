//! Feature ids this host declares.

use dog_flags::StaticFeatureIdProvider;

pub const CHECKOUT_V2: &str = "checkout-v2";
pub const DARK_MODE: &str = "dark-mode";
pub const NEW_SEARCH: &str = "new-search";

pub fn provider() -> StaticFeatureIdProvider {
    StaticFeatureIdProvider::new([CHECKOUT_V2, DARK_MODE, NEW_SEARCH])
}
