//! Browser-automation implementations of the
//! [`Browser`](crate::traits::Browser) trait.

mod webdriver;

pub use webdriver::{WebDriverBrowser, WebDriverBrowserOptions};
