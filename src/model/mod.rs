pub mod course;
pub mod search;
pub mod tee_time;
pub mod tee_times;

pub use course::*;
pub use search::*;
pub use tee_time::*;
pub use tee_times::*;
