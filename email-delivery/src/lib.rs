pub mod compose;
pub mod mock;
pub mod resend_client;

pub use compose::{build_content, newsletter_payload, slugify_tag, NewsletterContent};
pub use mock::MockEmailSender;
pub use resend_client::{ConfigError, ResendClient, ResendConfig};
