pub(crate) mod auth;
pub(crate) mod clients;
pub(crate) mod draws;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod router;
pub(crate) mod users;
pub(crate) mod validation;
