#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod error;
pub mod layer;
pub mod matrix;
pub mod model;
pub mod network;
pub mod trainer;
pub mod unit;

mod utils;

pub use crate::error::{Error, Result};
pub use crate::matrix::Mat;
pub use crate::network::Network;
