//! Cross-crate exchanges between a popup bridge and an opener bridge.
