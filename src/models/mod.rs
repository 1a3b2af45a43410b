mod activation;
mod customer;
mod license;
mod organization;
mod product;
mod reseller;
mod user;

pub use activation::*;
pub use customer::*;
pub use license::*;
pub use organization::*;
pub use product::*;
pub use reseller::*;
pub use user::*;
