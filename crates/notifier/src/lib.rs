mod notifier;
mod webhooks;

pub use notifier::*;
pub use webhooks::*;
