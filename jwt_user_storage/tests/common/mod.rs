pub mod test_setup;

pub use fixtures::*;
pub use mock_browser::MockBrowser;
pub use test_setup::*;
