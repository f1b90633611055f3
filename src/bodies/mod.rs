mod rigid_body;
mod material;
mod state;

pub use self::rigid_body::{RigidBody, RigidBodyDesc};
pub use self::material::Material;
pub use self::state::{State, MotionType};
