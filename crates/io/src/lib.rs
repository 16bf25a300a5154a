#![forbid(unsafe_code)]

pub mod pcd;
pub mod stream;

pub use pcd::{read_pcd, write_pcd, write_pcd_binary, PcdError};
pub use stream::{Frame, FrameError, FrameStream};
