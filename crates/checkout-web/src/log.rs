//! Browser console logging
//!
//! The core crates log through `tracing`; in the page those events have no
//! subscriber, so the binding reports its own progress here.

pub fn info(message: &str) {
    web_sys::console::info_1(&message.into());
}

pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}
