pub mod catalog;
pub mod refresh_token;
pub mod user;

pub use catalog::{
    AccountNumber, Bank, Branch, ChequeFailStatus, Color, Phone, PhoneModule, PriceType,
    ReimbursementType, UserPermission, PERMISSION_MODULES,
};
pub use refresh_token::RefreshToken;
pub use user::{Role, User};
