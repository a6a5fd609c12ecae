pub mod complaint;
pub mod user;

pub use complaint::{
    ComplaintCategory, ComplaintLocation, ComplaintStatus, Entity as Complaint,
    Model as ComplaintModel,
};
pub use user::{normalize_roll, Entity as User, Model as UserModel, Role};
