#![forbid(unsafe_code)]

pub mod draft_store;
pub mod memory;
pub mod port;
pub mod sqlite;

#[derive(Debug)]
pub enum PortError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
}

impl std::fmt::Display for PortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
        }
    }
}

impl std::error::Error for PortError {}

impl From<std::io::Error> for PortError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for PortError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
