pub(crate) mod identity;
pub(crate) mod pagination;
pub(crate) mod text;
