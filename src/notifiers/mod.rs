pub mod console;
pub mod telegram;
pub mod traits;

pub use console::ConsoleNotifier;
pub use telegram::TelegramNotifier;
pub use traits::{NotifyError, Notifier};
