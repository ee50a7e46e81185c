mod handler;

pub use handler::{create_user, delete_user, get_user, list_users, user_stats, update_user};
