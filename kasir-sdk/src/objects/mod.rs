pub mod checkout;
pub mod notification;
pub mod order;
pub mod status;
pub mod ws;

pub use checkout::{
    AdditionalInfo, CheckoutCustomer, CheckoutOrder, CheckoutPayment, CheckoutRequest,
    CheckoutResponse, GatewayErrorBody, LineItem,
};
pub use notification::{NotificationAck, PaymentNotification};
pub use order::{
    CreateOrderRequest, CreatePaymentRequest, CreatePaymentResponse, Customer, OrderResponse,
    OrderStatus, PaymentFailure, Product,
};
pub use status::{PaymentStatus, StatusResponse};
