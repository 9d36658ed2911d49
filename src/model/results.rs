use crate::erx;

pub type One<T> = erx::ResultE<Option<T>>;
pub type Many<T> = erx::ResultE<Vec<T>>;
