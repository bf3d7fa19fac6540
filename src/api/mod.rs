//! API response types, pagination and request validation

pub mod pagination;
pub mod response;
pub mod validation;

pub use pagination::{Paginated, PaginationParams};
pub use response::{DataResponse, MessageResponse};
