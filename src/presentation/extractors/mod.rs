mod current_user;

pub use current_user::{CurrentUser, USER_ID_HEADER, USER_NAME_HEADER};
