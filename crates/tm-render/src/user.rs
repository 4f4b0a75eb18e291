//! MAAS user blocks

use terramaas_core::{Block, User};

pub fn user_block(user: &User) -> Block {
    Block::resource("maas_user", &user.resource_name)
        .attr("name", user.resource_name.as_str())
        .attr("password", user.password.as_str())
        .attr("email", user.email.as_str())
        .attr("is_admin", user.is_admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_block() {
        let user = User {
            resource_name: "ops".into(),
            password: "p\"w".into(),
            email: "ops@example.com".into(),
            is_admin: false,
        };
        assert_eq!(
            user_block(&user).to_string(),
            "resource \"maas_user\" \"ops\" {\n  name = \"ops\"\n  password = \"p\\\"w\"\n  email = \"ops@example.com\"\n  is_admin = false\n}\n"
        );
    }
}
