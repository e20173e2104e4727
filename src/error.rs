use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("unable to set up HTTP clients")]
    Setup,
    #[display("catalog build failed")]
    Build,
    #[display("unable to write {}", _0.display())]
    Persist(#[error(not(source))] PathBuf),
}
