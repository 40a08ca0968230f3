mod console_subscriber;
mod notifier_subscriber;

pub use console_subscriber::*;
pub use notifier_subscriber::*;
