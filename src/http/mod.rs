mod download;
mod health;
mod search;

pub(crate) use download::*;
pub(crate) use health::*;
pub(crate) use search::*;
