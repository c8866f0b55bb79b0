use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Result type used throughout the crate for anything that touches the outside world.
pub type FlareJoinResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Clone, Copy)]
pub struct FlareJoinError {
    pub msg: &'static str,
}

impl Display for FlareJoinError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.msg)
    }
}

impl Error for FlareJoinError {}
