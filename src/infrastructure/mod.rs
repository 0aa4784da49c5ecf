pub mod browser;
pub mod manual;
pub mod services;

pub use browser::BrowserHost;
pub use manual::ManualHost;
