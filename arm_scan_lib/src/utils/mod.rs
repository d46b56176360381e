pub mod consistency;
pub mod kinematics;
pub mod path_planner;
pub mod serializer;
pub mod logging;

pub use consistency::*;
pub use kinematics::*;
pub use path_planner::*;
pub use serializer::*;
pub use logging::*;
