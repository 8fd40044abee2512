pub mod notification_handler;
pub mod payment_composer;

pub use notification_handler::{NotificationError, NotificationHandler};
pub use payment_composer::{CreatePayment, PaymentComposer, PaymentCreated, PaymentError};
