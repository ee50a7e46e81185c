mod handler;

pub use handler::{create_role, delete_role, get_role, list_roles, role_stats, update_role};
