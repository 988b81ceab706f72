//! Domain records and the contracts of external collaborators.

pub mod model;
pub mod repository;
pub mod services;

pub use model::{
    AddressKind, BookingResponse, Location, Request, RequestId, TrafficResult, User, UserAddress,
    UserId, UserRequest,
};
pub use repository::{RequestRepository, UserRepository};
pub use services::{
    CabRequest, CabService, NotificationService, TrafficRequest, TrafficResponse, TrafficService,
};
