pub mod args;
pub mod error;
pub mod types;
pub mod value;

pub use args::{CommandArgs, PARAMETER_DELIMITER, pick_one, pick_one_with};
pub use error::{Result, RtpError};
pub use types::{
    Actor, ActorKind, Clock, EntityId, Permission, SYSTEM_ACTOR_ID, SystemClock, elapsed_millis,
};
pub use value::AttrValue;
